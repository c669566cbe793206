//! Manifest loading.
//!
//! This module turns a YAML file into a [`RawManifest`]: a top-level mapping
//! that the validators read but never modify.

use crate::error::{ManifestError, MipodError, Result};
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::accessor::type_name;

/// The parsed, unvalidated manifest document.
#[derive(Debug, Clone, PartialEq)]
pub struct RawManifest {
    /// Top-level mapping.
    root: Mapping,
    /// File the manifest was read from, if any.
    source: Option<PathBuf>,
}

impl RawManifest {
    /// Returns the value stored under a top-level key.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&Value> {
        self.root.get(name)
    }

    /// Returns true if the top-level key is present (even when null).
    #[must_use]
    pub fn has_section(&self, name: &str) -> bool {
        self.root.contains_key(name)
    }

    /// Returns the top-level mapping.
    #[must_use]
    pub const fn as_mapping(&self) -> &Mapping {
        &self.root
    }

    /// Returns the file the manifest was loaded from.
    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Converts the whole document to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the document holds keys JSON cannot represent.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        serde_json::to_value(&self.root).map_err(|e| {
            MipodError::Manifest(ManifestError::Serialize {
                message: e.to_string(),
            })
        })
    }
}

/// Loader for manifest files.
#[derive(Debug, Default)]
pub struct ManifestLoader;

impl ManifestLoader {
    /// Creates a new manifest loader.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Loads a manifest from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the file is missing or unreadable (a directory
    /// included), and otherwise an error if the content is not valid
    /// YAML, is empty, or is not a mapping at the top level.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<RawManifest> {
        let path = path.as_ref();
        info!("Loading manifest from: {}", path.display());

        let content = std::fs::read_to_string(path).map_err(|e| {
            warn!("Cannot read {}: {e}", path.display());
            MipodError::Manifest(ManifestError::NotFound {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
        })?;

        self.parse_yaml(&content, Some(path))
    }

    /// Parses a manifest from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid, empty, or not a mapping.
    pub fn parse_yaml(&self, content: &str, source: Option<&Path>) -> Result<RawManifest> {
        debug!("Parsing YAML manifest");

        let label = source.map_or_else(|| String::from("<inline>"), |p| p.display().to_string());

        if is_blank_document(content) {
            return Err(MipodError::Manifest(ManifestError::EmptyDocument { path: label }));
        }

        let value: Value = serde_yaml::from_str(content).map_err(|e| {
            MipodError::Manifest(ManifestError::Parse {
                message: e.to_string(),
                location: e
                    .location()
                    .map(|loc| format!("{label}:{}:{}", loc.line(), loc.column())),
            })
        })?;

        match value {
            Value::Null => Err(MipodError::Manifest(ManifestError::EmptyDocument { path: label })),
            Value::Mapping(root) if root.is_empty() => {
                Err(MipodError::Manifest(ManifestError::EmptyDocument { path: label }))
            }
            Value::Mapping(root) => {
                debug!("Parsed manifest with {} top-level keys", root.len());
                Ok(RawManifest {
                    root,
                    source: source.map(Path::to_path_buf),
                })
            }
            other => Err(MipodError::Manifest(ManifestError::Shape {
                found: type_name(&other).to_string(),
            })),
        }
    }
}

/// Returns true when the text holds nothing but whitespace, comments and
/// document markers.
fn is_blank_document(content: &str) -> bool {
    content.lines().map(str::trim).all(|line| {
        line.is_empty() || line.starts_with('#') || line == "---" || line == "..."
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn kind_of(result: Result<RawManifest>) -> &'static str {
        result.err().map_or("ok", |e| e.kind())
    }

    #[test]
    fn test_parse_mapping() {
        let yaml = r"
api:
  address: 10.0.0.1
  port: 8080
model:
  model_name: Qwen/Qwen2.5-7B-Instruct
";
        let manifest = ManifestLoader::new().parse_yaml(yaml, None).unwrap();
        assert!(manifest.has_section("api"));
        assert!(manifest.has_section("model"));
        assert!(!manifest.has_section("service"));
        assert_eq!(manifest.as_mapping().len(), 2);
    }

    #[test]
    fn test_empty_documents() {
        let loader = ManifestLoader::new();
        assert_eq!(kind_of(loader.parse_yaml("", None)), "empty_document");
        assert_eq!(kind_of(loader.parse_yaml("# only a comment\n---\n", None)), "empty_document");
        assert_eq!(kind_of(loader.parse_yaml("~", None)), "empty_document");
        assert_eq!(kind_of(loader.parse_yaml("{}", None)), "empty_document");
    }

    #[test]
    fn test_non_mapping_top_level() {
        let loader = ManifestLoader::new();
        assert_eq!(kind_of(loader.parse_yaml("- api\n- model\n", None)), "shape");
        assert_eq!(kind_of(loader.parse_yaml("just a string", None)), "shape");
    }

    #[test]
    fn test_invalid_yaml() {
        let loader = ManifestLoader::new();
        assert_eq!(kind_of(loader.parse_yaml("api: [unclosed", None)), "parse");
    }

    #[test]
    fn test_missing_file() {
        let loader = ManifestLoader::new();
        let result = loader.load_file("/definitely/not/here/deploy.yaml");
        assert_eq!(kind_of(result), "not_found");
    }

    #[test]
    fn test_unreadable_path_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = ManifestLoader::new().load_file(dir.path());
        assert_eq!(kind_of(result), "not_found");
    }

    #[test]
    fn test_load_file_records_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api:\n  address: localhost").unwrap();

        let manifest = ManifestLoader::new().load_file(file.path()).unwrap();
        assert_eq!(manifest.source(), Some(file.path()));
    }

    #[test]
    fn test_to_json_keeps_structure() {
        let yaml = "resources:\n  cpus: 4\n  accelerators: \"MI300:8\"\n";
        let manifest = ManifestLoader::new().parse_yaml(yaml, None).unwrap();
        let json = manifest.to_json().unwrap();
        assert_eq!(json["resources"]["cpus"], 4);
        assert_eq!(json["resources"]["accelerators"], "MI300:8");
    }
}
