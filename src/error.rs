//! Error types for the mipod deployment tool.
//!
//! This module provides the error hierarchy for every stage of a run:
//! loading the manifest, validating its sections, talking to remote
//! services, and submitting the deployment.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the mipod deployment tool.
#[derive(Debug, Error)]
pub enum MipodError {
    /// Manifest loading and projection errors.
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// Structural or semantic validation errors.
    #[error("Configuration error: {0}")]
    Validation(#[from] ValidationError),

    /// Errors from health, registry, or deploy endpoints.
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    /// A `.env` file exists but could not be loaded.
    #[error("Failed to load environment file {path}: {message}")]
    EnvFile {
        /// Path to the `.env` file.
        path: PathBuf,
        /// Description of the failure.
        message: String,
    },

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors raised while reading the manifest document.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest file does not exist or cannot be read.
    #[error("Config file not found or unreadable: {path} ({reason})")]
    NotFound {
        /// Path to the missing file.
        path: PathBuf,
        /// Underlying IO error.
        reason: String,
    },

    /// The content is not valid YAML.
    #[error("Error parsing YAML file: {message}")]
    Parse {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// The document parsed to nothing.
    #[error("Configuration file is empty: {path}")]
    EmptyDocument {
        /// Path (or source label) of the empty document.
        path: String,
    },

    /// The top-level value is not a mapping.
    #[error("Invalid YAML format: expected a mapping at the top level, found {found}")]
    Shape {
        /// Kind of value found instead.
        found: String,
    },

    /// The manifest could not be converted to JSON.
    #[error("Failed to serialize manifest: {message}")]
    Serialize {
        /// Description of the serialization error.
        message: String,
    },

    /// A typed view could not be built from a section.
    #[error("Failed to read {section} section: {message}")]
    Projection {
        /// Section name.
        section: String,
        /// Description of the failure.
        message: String,
    },
}

/// Validation errors. Each run reports the first one encountered.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A top-level section is absent.
    #[error("Missing required section: {section}")]
    MissingSection {
        /// Section name.
        section: String,
    },

    /// A top-level section is present but not a mapping.
    #[error("{section} section must be a mapping")]
    InvalidSection {
        /// Section name.
        section: String,
    },

    /// A required field is absent or null.
    #[error("Missing required field '{field}' in {section} section")]
    MissingField {
        /// Section name.
        section: String,
        /// Field name.
        field: String,
    },

    /// A required string field is blank.
    #[error("Empty value for required field '{field}' in {section} section")]
    EmptyValue {
        /// Section name.
        section: String,
        /// Field name.
        field: String,
    },

    /// A field holds a value of the wrong type.
    #[error("Invalid type for {field} in {section} section. Expected {expected}")]
    TypeMismatch {
        /// Section name.
        section: String,
        /// Field name.
        field: String,
        /// Expected type name.
        expected: String,
    },

    /// A numeric field is outside its allowed range.
    #[error("Value {value} for {field} in {section} section is out of range")]
    OutOfRange {
        /// Section name.
        section: String,
        /// Field name.
        field: String,
        /// Offending value.
        value: String,
    },

    /// `image_id` is not a `docker:` reference.
    #[error("Invalid Docker image format. {reason}, got: {image_id}")]
    InvalidImageFormat {
        /// Offending image id.
        image_id: String,
        /// What is wrong with it.
        reason: String,
    },

    /// `accelerators` is not `<NAME>:<COUNT>`.
    #[error(
        "Number of accelerators must be an integer & Accelerator field should be in the format of e.g. MI200:2, got: {value}"
    )]
    InvalidAcceleratorFormat {
        /// Offending accelerator spec.
        value: String,
    },

    /// `service.ports` and `resources.ports` disagree.
    #[error("Service port does not match Resources port value: {service}:{resources}")]
    PortMismatch {
        /// Port declared by the service section.
        service: String,
        /// Port declared by the resources section.
        resources: String,
    },
}

/// Errors from outbound HTTP calls.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The API health probe failed.
    #[error("API Health Check failed for {url}: {reason}")]
    HealthCheck {
        /// Probe URL.
        url: String,
        /// Status or transport failure.
        reason: String,
    },

    /// The model registry does not know the model.
    #[error("Model Check failed: can't find the model '{model}': {reason}")]
    ModelNotFound {
        /// Model identifier.
        model: String,
        /// Status or transport failure.
        reason: String,
    },

    /// The Docker registry does not know the image.
    #[error("Docker image not found: {image_id}")]
    ImageNotFound {
        /// Image reference.
        image_id: String,
    },

    /// The Docker registry lookup did not complete.
    #[error("Failed to check Docker image {image_id}: {reason}")]
    ImageCheckFailed {
        /// Image reference.
        image_id: String,
        /// Status or transport failure.
        reason: String,
    },

    /// A request could not be completed at all.
    #[error("Request to {url} failed: {message}")]
    Transport {
        /// Target URL.
        url: String,
        /// Description of the network error.
        message: String,
    },

    /// The HTTP client could not be built.
    #[error("Failed to create HTTP client: {message}")]
    Client {
        /// Description of the builder error.
        message: String,
    },
}

/// Result type alias for mipod operations.
pub type Result<T> = std::result::Result<T, MipodError>;

impl MipodError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns a stable short name for the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Manifest(e) => match e {
                ManifestError::NotFound { .. } => "not_found",
                ManifestError::Parse { .. } => "parse",
                ManifestError::EmptyDocument { .. } => "empty_document",
                ManifestError::Shape { .. } => "shape",
                ManifestError::Serialize { .. } => "serialize",
                ManifestError::Projection { .. } => "projection",
            },
            Self::Validation(e) => match e {
                ValidationError::MissingSection { .. } => "missing_section",
                ValidationError::InvalidSection { .. } => "invalid_section",
                ValidationError::MissingField { .. } => "missing_field",
                ValidationError::EmptyValue { .. } => "empty_value",
                ValidationError::TypeMismatch { .. } => "type_mismatch",
                ValidationError::OutOfRange { .. } => "out_of_range",
                ValidationError::InvalidImageFormat { .. } => "invalid_image_format",
                ValidationError::InvalidAcceleratorFormat { .. } => "invalid_accelerator_format",
                ValidationError::PortMismatch { .. } => "port_mismatch",
            },
            Self::Remote(e) => match e {
                RemoteError::HealthCheck { .. } => "health_check",
                RemoteError::ModelNotFound { .. } => "model_not_found",
                RemoteError::ImageNotFound { .. } => "image_not_found",
                RemoteError::ImageCheckFailed { .. } => "image_check_failed",
                RemoteError::Transport { .. } => "transport",
                RemoteError::Client { .. } => "client",
            },
            Self::EnvFile { .. } => "env_file",
            Self::Io(_) => "io",
            Self::Internal(_) => "internal",
        }
    }

    /// Returns true if the failure depends on network state rather than
    /// on the manifest itself. Nothing retries these; the flag only informs
    /// the caller.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Remote(
                RemoteError::HealthCheck { .. }
                    | RemoteError::ModelNotFound { .. }
                    | RemoteError::ImageCheckFailed { .. }
                    | RemoteError::Transport { .. }
            )
        )
    }

    /// Returns the validation error, if this is one.
    #[must_use]
    pub const fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(e) => Some(e),
            _ => None,
        }
    }
}

impl ValidationError {
    /// Creates a missing-section error.
    #[must_use]
    pub fn missing_section(section: impl Into<String>) -> Self {
        Self::MissingSection {
            section: section.into(),
        }
    }

    /// Creates a type-mismatch error.
    #[must_use]
    pub fn type_mismatch(
        section: impl Into<String>,
        field: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            section: section.into(),
            field: field.into(),
            expected: expected.into(),
        }
    }

    /// Creates an out-of-range error.
    #[must_use]
    pub fn out_of_range(
        section: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::OutOfRange {
            section: section.into(),
            field: field.into(),
            value: value.into(),
        }
    }
}

impl RemoteError {
    /// Creates a transport error.
    #[must_use]
    pub fn transport(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            url: url.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        let err = MipodError::from(ValidationError::PortMismatch {
            service: String::from("8000"),
            resources: String::from("8001"),
        });
        assert_eq!(err.kind(), "port_mismatch");

        let err = MipodError::from(ManifestError::EmptyDocument {
            path: String::from("deploy.yaml"),
        });
        assert_eq!(err.kind(), "empty_document");
    }

    #[test]
    fn test_transient_errors() {
        let err = MipodError::from(RemoteError::transport("http://x/deploy", "refused"));
        assert!(err.is_transient());

        let err = MipodError::from(ValidationError::missing_section("api"));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_port_mismatch_message_carries_both_values() {
        let err = ValidationError::PortMismatch {
            service: String::from("8000"),
            resources: String::from("9000"),
        };
        let message = err.to_string();
        assert!(message.contains("8000"));
        assert!(message.contains("9000"));
    }
}
