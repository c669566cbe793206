//! Pipeline settings.
//!
//! Settings come from command-line flags with `MIPOD_*` environment
//! fallbacks, and a `.env` file may supply those variables.

use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{MipodError, Result};

/// Default model registry base URL.
pub const DEFAULT_MODEL_REGISTRY_URL: &str = "https://huggingface.co";

/// Default Docker registry base URL.
pub const DEFAULT_DOCKER_REGISTRY_URL: &str = "https://hub.docker.com";

/// Default HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// How the `envs` section is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum EnvsPolicy {
    /// The section must be present and valid.
    #[default]
    Required,
    /// The section is validated when present and skipped when absent.
    Optional,
    /// The section is never read.
    Ignored,
}

/// Settings for one validation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Treatment of the `envs` section.
    pub envs: EnvsPolicy,
    /// Base URL of the model registry.
    pub model_registry_url: String,
    /// Whether to look the image up in the Docker registry.
    pub check_image: bool,
    /// Base URL of the Docker registry.
    pub docker_registry_url: String,
    /// Timeout applied to every HTTP request.
    pub timeout: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            envs: EnvsPolicy::default(),
            model_registry_url: String::from(DEFAULT_MODEL_REGISTRY_URL),
            check_image: false,
            docker_registry_url: String::from(DEFAULT_DOCKER_REGISTRY_URL),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl PipelineSettings {
    /// Creates settings with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the `envs` policy.
    #[must_use]
    pub const fn with_envs(mut self, envs: EnvsPolicy) -> Self {
        self.envs = envs;
        self
    }

    /// Sets the model registry base URL.
    #[must_use]
    pub fn with_model_registry(mut self, url: impl Into<String>) -> Self {
        self.model_registry_url = url.into();
        self
    }

    /// Enables the Docker image lookup against the given registry.
    #[must_use]
    pub fn with_image_check(mut self, registry_url: impl Into<String>) -> Self {
        self.check_image = true;
        self.docker_registry_url = registry_url.into();
        self
    }

    /// Sets the HTTP timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Loads a `.env` file from `dir` if one exists.
///
/// Returns the path that was loaded.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be parsed.
pub fn load_dotenv(dir: impl AsRef<Path>) -> Result<Option<PathBuf>> {
    let env_path = dir.as_ref().join(".env");

    if !env_path.exists() {
        debug!(".env file not found at: {}", env_path.display());
        return Ok(None);
    }

    info!("Loading environment from: {}", env_path.display());
    dotenvy::from_path(&env_path).map_err(|e| MipodError::EnvFile {
        path: env_path.clone(),
        message: e.to_string(),
    })?;

    Ok(Some(env_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = PipelineSettings::new();
        assert_eq!(settings.envs, EnvsPolicy::Required);
        assert_eq!(settings.model_registry_url, DEFAULT_MODEL_REGISTRY_URL);
        assert!(!settings.check_image);
        assert_eq!(settings.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_builder() {
        let settings = PipelineSettings::new()
            .with_envs(EnvsPolicy::Ignored)
            .with_model_registry("http://127.0.0.1:9000")
            .with_image_check("http://127.0.0.1:9001")
            .with_timeout(Duration::from_secs(3));

        assert_eq!(settings.envs, EnvsPolicy::Ignored);
        assert_eq!(settings.model_registry_url, "http://127.0.0.1:9000");
        assert!(settings.check_image);
        assert_eq!(settings.docker_registry_url, "http://127.0.0.1:9001");
        assert_eq!(settings.timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_dotenv_absent() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_dotenv(dir.path()).unwrap(), None);
    }

    #[test]
    fn test_dotenv_loaded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".env"), "MIPOD_TEST_DOTENV_VALUE=loaded\n").unwrap();

        let loaded = load_dotenv(dir.path()).unwrap();
        assert_eq!(loaded, Some(dir.path().join(".env")));
        assert_eq!(std::env::var("MIPOD_TEST_DOTENV_VALUE").unwrap(), "loaded");
    }

    #[test]
    fn test_dotenv_malformed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".env"), "MIPOD_TEST_BROKEN=\"unterminated\n").unwrap();

        let err = load_dotenv(dir.path()).unwrap_err();
        assert_eq!(err.kind(), "env_file");
        assert!(err.to_string().contains(".env"));
        assert!(!err.to_string().contains("YAML"));
    }
}
