//! Manifest validation.
//!
//! Sections are validated in a fixed order: API, environment flags, model,
//! resources, service. The first violation aborts the run; errors are never
//! accumulated. The API health probe and the model lookup are the only
//! network calls, plus the image lookup when it is enabled.

use std::path::Path;
use tracing::{debug, info};

use crate::error::{Result, ValidationError};
use crate::remote::{HttpTransport, lookup_image, lookup_model, probe_health};

use super::accessor::{Section, render, type_name};
use super::envs::ENV_FLAGS;
use super::parser::{ManifestLoader, RawManifest};
use super::settings::{EnvsPolicy, PipelineSettings};
use super::spec::{AcceleratorSpec, ApiConfig, ImageRef};
use super::view::{ValidatedManifest, sections};

/// Largest valid TCP port.
const MAX_PORT: i128 = 65_535;

/// Validator for deployment manifests.
#[derive(Debug)]
pub struct ManifestValidator<T> {
    /// Transport for the reachability checks.
    transport: T,
    /// Pipeline settings.
    settings: PipelineSettings,
}

impl<T: HttpTransport> ManifestValidator<T> {
    /// Creates a validator.
    #[must_use]
    pub const fn new(transport: T, settings: PipelineSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    /// Returns the settings.
    #[must_use]
    pub const fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Loads and validates a manifest file.
    ///
    /// # Errors
    ///
    /// Returns the first loading or validation error encountered.
    pub async fn validate_file(&self, path: impl AsRef<Path>) -> Result<ValidatedManifest> {
        let manifest = ManifestLoader::new().load_file(path)?;
        self.validate(manifest).await
    }

    /// Validates a manifest.
    ///
    /// # Errors
    ///
    /// Returns the first validation error encountered.
    pub async fn validate(&self, manifest: RawManifest) -> Result<ValidatedManifest> {
        let api = check_api(&manifest)?;
        probe_health(&self.transport, &api.health_url()).await?;

        if self.envs_apply(&manifest) {
            check_envs(&manifest)?;
        } else {
            debug!("Skipping envs section ({:?})", self.settings.envs);
        }

        let model_name = check_model(&manifest)?;
        lookup_model(&self.transport, &self.settings.model_registry_url, model_name).await?;

        let image = check_resources(&manifest)?;
        if self.settings.check_image {
            lookup_image(&self.transport, &self.settings.docker_registry_url, &image).await?;
        }

        check_service(&manifest)?;

        info!("Manifest is valid");
        Ok(ValidatedManifest::new(manifest, self.settings.envs))
    }

    fn envs_apply(&self, manifest: &RawManifest) -> bool {
        match self.settings.envs {
            EnvsPolicy::Required => true,
            EnvsPolicy::Optional => manifest.has_section(sections::ENVS),
            EnvsPolicy::Ignored => false,
        }
    }
}

/// Checks the `api` section and returns its endpoint.
///
/// # Errors
///
/// Returns the first structural violation.
pub fn check_api(manifest: &RawManifest) -> std::result::Result<ApiConfig, ValidationError> {
    let api = Section::of(manifest, sections::API)?;

    let address = api.require_str("address")?;
    let port = api
        .optional_int("port", 1, MAX_PORT)?
        .map(|p| u16::try_from(p).map_err(|_| out_of_range(&api, "port", p)))
        .transpose()?;

    Ok(ApiConfig {
        address: address.to_string(),
        port,
    })
}

/// Checks the `envs` section against the flag schema.
///
/// Mandatory flags must be present and non-empty, whatever their value type.
/// Every other flag that is present must have its declared type. Unknown keys
/// are ignored.
///
/// # Errors
///
/// Returns the first structural or type violation.
pub fn check_envs(manifest: &RawManifest) -> std::result::Result<(), ValidationError> {
    let envs = Section::of(manifest, sections::ENVS)?;

    for flag in ENV_FLAGS.iter().filter(|f| f.is_required()) {
        envs.require(flag.name)?;
    }

    for flag in ENV_FLAGS.iter().filter(|f| !f.is_required()) {
        if let Some(value) = envs.raw(flag.name)
            && flag.kind.extract(value).is_none()
        {
            debug!("{} has type {}, expected {}", flag.name, type_name(value), flag.kind.name());
            return Err(ValidationError::type_mismatch(
                envs.name(),
                flag.name,
                flag.kind.name(),
            ));
        }
    }

    Ok(())
}

/// Checks the `model` section and returns the model name.
///
/// # Errors
///
/// Returns the first structural violation.
pub fn check_model(manifest: &RawManifest) -> std::result::Result<&str, ValidationError> {
    let model = Section::of(manifest, sections::MODEL)?;

    let model_name = model.require_str("model_name")?;
    model.optional_str("hf_token")?;
    model.optional_str("args")?;

    Ok(model_name)
}

/// Checks the `resources` section and returns the parsed image reference.
///
/// # Errors
///
/// Returns the first structural violation.
pub fn check_resources(manifest: &RawManifest) -> std::result::Result<ImageRef, ValidationError> {
    let resources = Section::of(manifest, sections::RESOURCES)?;

    for field in ["cpus", "memory", "ports", "accelerators", "image_id"] {
        resources.require(field)?;
    }

    let image_value = resources.require("image_id")?;
    let image: ImageRef = image_value
        .as_str()
        .ok_or_else(|| ValidationError::InvalidImageFormat {
            image_id: render(image_value),
            reason: String::from("Expected 'docker:repository/image:tag'"),
        })?
        .parse()?;

    let accelerators = resources.require("accelerators")?;
    let _: AcceleratorSpec = accelerators
        .as_str()
        .ok_or_else(|| ValidationError::InvalidAcceleratorFormat {
            value: render(accelerators),
        })?
        .parse()?;

    resources.require_int("cpus", 1, i128::from(u32::MAX))?;
    resources.require_int("memory", 1, i128::from(i64::MAX))?;
    resources.require_int("ports", 1, MAX_PORT)?;

    Ok(image)
}

/// Checks the `service` section and its port agreement with `resources`.
///
/// # Errors
///
/// Returns the first structural violation, or `PortMismatch`.
pub fn check_service(manifest: &RawManifest) -> std::result::Result<(), ValidationError> {
    let service = Section::of(manifest, sections::SERVICE)?;

    let service_ports = service.require("ports")?;
    service.require_str("readiness_probe")?;

    let resources = Section::of(manifest, sections::RESOURCES)?;
    let resource_ports = resources.require("ports")?;

    if service_ports != resource_ports {
        return Err(ValidationError::PortMismatch {
            service: render(service_ports),
            resources: render(resource_ports),
        });
    }

    Ok(())
}

fn out_of_range(section: &Section<'_>, field: &str, value: i128) -> ValidationError {
    ValidationError::out_of_range(section.name(), field, value.to_string())
}
