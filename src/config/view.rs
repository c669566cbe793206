//! Typed-view projection of a validated manifest.
//!
//! A [`ValidatedManifest`] can only be produced by the validator. Each
//! accessor re-reads the raw document and builds a fresh typed value, so
//! calls are independent, repeatable, and free of side effects.

use serde::de::DeserializeOwned;
use serde_yaml::Value;

use crate::error::{ManifestError, MipodError, Result};

use super::envs::EnvConfig;
use super::parser::RawManifest;
use super::settings::EnvsPolicy;
use super::spec::{ApiConfig, ModelConfig, ResourceConfig, ServiceConfig};

/// Section names.
pub mod sections {
    /// API endpoint section.
    pub const API: &str = "api";
    /// Environment flags section.
    pub const ENVS: &str = "envs";
    /// Model section.
    pub const MODEL: &str = "model";
    /// Resources section.
    pub const RESOURCES: &str = "resources";
    /// Service section.
    pub const SERVICE: &str = "service";
}

/// A manifest that passed every validator.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedManifest {
    manifest: RawManifest,
    envs: EnvsPolicy,
}

impl ValidatedManifest {
    pub(crate) const fn new(manifest: RawManifest, envs: EnvsPolicy) -> Self {
        Self { manifest, envs }
    }

    /// Returns the underlying document.
    #[must_use]
    pub const fn raw(&self) -> &RawManifest {
        &self.manifest
    }

    /// Returns the `envs` policy the manifest was validated under.
    #[must_use]
    pub const fn envs_policy(&self) -> EnvsPolicy {
        self.envs
    }

    /// Returns the API view.
    ///
    /// # Errors
    ///
    /// Returns a projection error if the section cannot be read.
    pub fn api(&self) -> Result<ApiConfig> {
        self.project(sections::API)
    }

    /// Returns the resolved environment flags, or `None` when the section
    /// was not validated (absent under the optional policy, or ignored).
    ///
    /// # Errors
    ///
    /// Returns a projection error if the section cannot be read.
    pub fn envs(&self) -> Result<Option<EnvConfig>> {
        if self.envs == EnvsPolicy::Ignored {
            return Ok(None);
        }

        match self.manifest.section(sections::ENVS) {
            None => Ok(None),
            Some(Value::Mapping(map)) => EnvConfig::resolve(map).map(Some).map_err(|flag| {
                projection_error(sections::ENVS, format!("unusable value for {flag}"))
            }),
            Some(_) => Err(projection_error(sections::ENVS, "not a mapping")),
        }
    }

    /// Returns the model view.
    ///
    /// # Errors
    ///
    /// Returns a projection error if the section cannot be read.
    pub fn model(&self) -> Result<ModelConfig> {
        self.project(sections::MODEL)
    }

    /// Returns the resources view.
    ///
    /// # Errors
    ///
    /// Returns a projection error if the section cannot be read.
    pub fn resources(&self) -> Result<ResourceConfig> {
        self.project(sections::RESOURCES)
    }

    /// Returns the service view.
    ///
    /// # Errors
    ///
    /// Returns a projection error if the section cannot be read.
    pub fn service(&self) -> Result<ServiceConfig> {
        self.project(sections::SERVICE)
    }

    /// Converts the whole document to JSON for submission.
    ///
    /// # Errors
    ///
    /// Returns an error if the document holds keys JSON cannot represent.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        self.manifest.to_json()
    }

    fn project<T: DeserializeOwned>(&self, section: &'static str) -> Result<T> {
        let value = self
            .manifest
            .section(section)
            .cloned()
            .ok_or_else(|| projection_error(section, "section is absent"))?;

        serde_yaml::from_value(value).map_err(|e| projection_error(section, e.to_string()))
    }
}

fn projection_error(section: &str, message: impl Into<String>) -> MipodError {
    MipodError::Manifest(ManifestError::Projection {
        section: section.to_string(),
        message: message.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parser::ManifestLoader;

    const MANIFEST: &str = r#"
api:
  address: 10.1.2.3
  port: 8080
envs:
  VLLM_USE_TRITON_FLASH_ATTN: false
  VLLM_ROCM_USE_AITER: true
  VLLM_IMAGE_FETCH_TIMEOUT: 0
model:
  model_name: Qwen/Qwen2.5-7B-Instruct
  args: "--max-model-len 8192"
resources:
  cpus: 8
  memory: 64
  ports: 8000
  accelerators: "MI300:8"
  image_id: "docker:rocm/vllm:latest"
service:
  ports: 8000
  readiness_probe: /health
"#;

    fn validated(yaml: &str, envs: EnvsPolicy) -> ValidatedManifest {
        let raw = ManifestLoader::new().parse_yaml(yaml, None).unwrap();
        ValidatedManifest::new(raw, envs)
    }

    #[test]
    fn test_projection_reads_every_section() {
        let m = validated(MANIFEST, EnvsPolicy::Required);

        let api = m.api().unwrap();
        assert_eq!(api.address, "10.1.2.3");
        assert_eq!(api.port, Some(8080));

        let model = m.model().unwrap();
        assert_eq!(model.model_name, "Qwen/Qwen2.5-7B-Instruct");
        assert_eq!(model.hf_token, None);
        assert_eq!(model.args.as_deref(), Some("--max-model-len 8192"));

        let res = m.resources().unwrap();
        assert_eq!(res.cpus, 8);
        assert_eq!(res.accelerator().unwrap().count, 8);

        let svc = m.service().unwrap();
        assert_eq!(svc.ports, res.ports);
        assert_eq!(svc.readiness_probe, "/health");
    }

    #[test]
    fn test_projection_is_idempotent() {
        let m = validated(MANIFEST, EnvsPolicy::Required);

        assert_eq!(m.api().unwrap(), m.api().unwrap());
        assert_eq!(m.envs().unwrap(), m.envs().unwrap());
        assert_eq!(m.resources().unwrap(), m.resources().unwrap());
    }

    #[test]
    fn test_defaults_only_for_absent_fields() {
        let m = validated(MANIFEST, EnvsPolicy::Required);
        let envs = m.envs().unwrap().unwrap();

        assert_eq!(envs.integer("VLLM_IMAGE_FETCH_TIMEOUT"), Some(0));
        assert_eq!(envs.integer("VLLM_VIDEO_FETCH_TIMEOUT"), Some(30));
        assert_eq!(envs.bool("VLLM_USE_TRITON_FLASH_ATTN"), Some(false));
    }

    #[test]
    fn test_absent_port_stays_absent() {
        let yaml = MANIFEST.replace("  port: 8080\n", "");
        let m = validated(&yaml, EnvsPolicy::Required);
        assert_eq!(m.api().unwrap().port, None);
    }

    #[test]
    fn test_ignored_envs_not_projected() {
        let m = validated(MANIFEST, EnvsPolicy::Ignored);
        assert_eq!(m.envs().unwrap(), None);
    }
}
