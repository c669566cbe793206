//! Manifest handling.
//!
//! This module covers everything that happens to a deployment manifest
//! before it leaves the machine:
//! - Loading YAML into a [`RawManifest`]
//! - Validating sections in order with [`ManifestValidator`]
//! - Projecting typed views from a [`ValidatedManifest`]
//! - Digesting the document with [`ManifestHasher`]

mod accessor;
mod envs;
mod hash;
mod parser;
mod settings;
mod spec;
mod validator;
mod view;

pub use accessor::{Section, as_integer, render, type_name};
pub use envs::{ENV_FLAGS, EnvConfig, EnvFlag, FlagDefault, FlagKind, FlagValue, find_flag};
pub use hash::ManifestHasher;
pub use parser::{ManifestLoader, RawManifest};
pub use settings::{
    DEFAULT_DOCKER_REGISTRY_URL, DEFAULT_MODEL_REGISTRY_URL, DEFAULT_TIMEOUT_SECS, EnvsPolicy,
    PipelineSettings, load_dotenv,
};
pub use spec::{
    AcceleratorSpec, ApiConfig, DOCKER_PREFIX, ImageRef, ModelConfig, ResourceConfig,
    ServiceConfig, api_base_url,
};
pub use validator::{
    ManifestValidator, check_api, check_envs, check_model, check_resources, check_service,
};
pub use view::{ValidatedManifest, sections};
