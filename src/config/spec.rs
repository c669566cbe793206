//! Typed views of manifest sections.
//!
//! These structs are read out of a manifest after validation. Optional
//! fields that are absent take their documented defaults through serde.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Prefix every `image_id` must carry.
pub const DOCKER_PREFIX: &str = "docker:";

/// API endpoint that serves health checks and accepts deployments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiConfig {
    /// Host name or IP address.
    pub address: String,
    /// Optional port; omitted from URLs when absent.
    #[serde(default)]
    pub port: Option<u16>,
}

impl ApiConfig {
    /// Returns `http://{address}[:{port}]`.
    #[must_use]
    pub fn base_url(&self) -> String {
        api_base_url(&self.address, self.port)
    }

    /// Returns the health probe URL.
    #[must_use]
    pub fn health_url(&self) -> String {
        format!("{}/health", self.base_url())
    }

    /// Returns the deployment submission URL.
    #[must_use]
    pub fn deploy_url(&self) -> String {
        format!("{}/deploy", self.base_url())
    }
}

/// Builds the API base URL from an address and optional port.
#[must_use]
pub fn api_base_url(address: &str, port: Option<u16>) -> String {
    port.map_or_else(
        || format!("http://{address}"),
        |port| format!("http://{address}:{port}"),
    )
}

/// Model to serve.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelConfig {
    /// Model identifier in the registry (e.g. `Qwen/Qwen2.5-7B-Instruct`).
    pub model_name: String,
    /// Token for gated models.
    #[serde(default)]
    pub hf_token: Option<String>,
    /// Extra engine arguments.
    #[serde(default)]
    pub args: Option<String>,
}

/// Compute resources requested for the workload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceConfig {
    /// CPU count.
    pub cpus: u32,
    /// Memory amount.
    pub memory: u64,
    /// Port the container listens on.
    pub ports: u16,
    /// Accelerator spec, `<NAME>:<COUNT>`.
    pub accelerators: String,
    /// Container image, `docker:<repository>[:<tag>]`.
    pub image_id: String,
}

impl ResourceConfig {
    /// Parses the accelerator spec.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAcceleratorFormat` if the spec is malformed.
    pub fn accelerator(&self) -> Result<AcceleratorSpec, ValidationError> {
        self.accelerators.parse()
    }

    /// Parses the image reference.
    ///
    /// # Errors
    ///
    /// Returns `InvalidImageFormat` if the reference is malformed.
    pub fn image(&self) -> Result<ImageRef, ValidationError> {
        self.image_id.parse()
    }
}

/// Service exposed by the workload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Service port; always equal to [`ResourceConfig::ports`].
    pub ports: u16,
    /// Readiness probe path.
    pub readiness_probe: String,
}

/// Accelerator type and quantity, parsed from `<NAME>:<COUNT>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcceleratorSpec {
    /// Accelerator type, e.g. `MI300`.
    pub name: String,
    /// Number of accelerators, exactly as written.
    pub count: i64,
}

impl std::str::FromStr for AcceleratorSpec {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidAcceleratorFormat {
            value: s.to_string(),
        };

        let (name, count) = s.split_once(':').ok_or_else(invalid)?;

        Ok(Self {
            name: name.trim().to_string(),
            count: count.trim().parse().map_err(|_| invalid())?,
        })
    }
}

impl std::fmt::Display for AcceleratorSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.name, self.count)
    }
}

/// Container image reference, parsed from `docker:<repository>[:<tag>]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRef {
    /// Repository path, e.g. `rocm/vllm`.
    pub repository: String,
    /// Optional tag.
    pub tag: Option<String>,
}

impl std::str::FromStr for ImageRef {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ValidationError::InvalidImageFormat {
            image_id: s.to_string(),
            reason: reason.to_string(),
        };

        let path = s
            .strip_prefix(DOCKER_PREFIX)
            .ok_or_else(|| invalid("Expected 'docker:repository/image:tag'"))?;

        // A colon followed by a slash belongs to a registry host, not a tag.
        let (repository, tag) = match path.rsplit_once(':') {
            Some((repo, tag)) if !tag.contains('/') => (repo, Some(tag)),
            _ => (path, None),
        };

        if repository.trim().is_empty() {
            return Err(invalid("Missing repository"));
        }
        if tag.is_some_and(|t| t.trim().is_empty()) {
            return Err(invalid("Empty tag"));
        }

        Ok(Self {
            repository: repository.to_string(),
            tag: tag.map(str::to_string),
        })
    }
}

impl std::fmt::Display for ImageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{DOCKER_PREFIX}{}", self.repository)?;
        if let Some(tag) = &self.tag {
            write!(f, ":{tag}")?;
        }
        Ok(())
    }
}
