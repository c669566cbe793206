//! Manifest digests.
//!
//! The digest is a SHA-256 over the canonical JSON form of a manifest
//! (object keys sorted), so formatting, comments, and key order in the
//! YAML source do not change it.

use sha2::{Digest, Sha256};

use crate::error::{ManifestError, MipodError, Result};

use super::parser::RawManifest;

/// Hasher for computing manifest digests.
#[derive(Debug, Default)]
pub struct ManifestHasher;

impl ManifestHasher {
    /// Creates a new manifest hasher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Computes the hex digest of a manifest.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be converted to JSON.
    pub fn hash_manifest(&self, manifest: &RawManifest) -> Result<String> {
        let json = canonicalize(manifest.to_json()?);
        let bytes = serde_json::to_vec(&json).map_err(|e| {
            MipodError::Manifest(ManifestError::Serialize {
                message: e.to_string(),
            })
        })?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(hex::encode(hasher.finalize()))
    }

    /// Computes a short hash (first 8 characters) for display purposes.
    #[must_use]
    pub fn short_hash(&self, hash: &str) -> String {
        hash.chars().take(8).collect()
    }
}

/// Rebuilds every object with its keys in sorted order.
fn canonicalize(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut entries: Vec<_> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            serde_json::Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, canonicalize(v)))
                    .collect(),
            )
        }
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.into_iter().map(canonicalize).collect())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parser::ManifestLoader;

    fn digest(yaml: &str) -> String {
        let manifest = ManifestLoader::new().parse_yaml(yaml, None).unwrap();
        ManifestHasher::new().hash_manifest(&manifest).unwrap()
    }

    #[test]
    fn test_digest_deterministic() {
        let yaml = "api:\n  address: localhost\n  port: 8000\n";
        assert_eq!(digest(yaml), digest(yaml));
        assert_eq!(digest(yaml).len(), 64);
    }

    #[test]
    fn test_digest_ignores_key_order_and_comments() {
        let a = digest("api:\n  address: localhost\n  port: 8000\n");
        let b = digest("# endpoint\napi:\n  port: 8000\n  address: localhost\n");
        assert_eq!(a, b);
    }

    #[test]
    fn test_digest_changes_with_content() {
        let a = digest("api:\n  address: localhost\n  port: 8000\n");
        let b = digest("api:\n  address: localhost\n  port: 8001\n");
        assert_ne!(a, b);
    }

    #[test]
    fn test_short_hash() {
        let hasher = ManifestHasher::new();
        let short = hasher.short_hash("abcdef1234567890abcdef1234567890");

        assert_eq!(short, "abcdef12");
        assert_eq!(short.len(), 8);
    }
}
