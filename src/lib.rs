// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # Mipod Deploy
//!
//! Validation and submission of model deployment manifests.
//!
//! ## Overview
//!
//! A manifest is a YAML document describing an inference workload. This crate:
//!
//! - Loads the manifest and checks its top-level shape
//! - Validates each section in a fixed order, stopping at the first error
//! - Probes the target API and looks the model up in its registry
//! - Submits the validated manifest as JSON to the API's deploy endpoint
//!
//! ## Pipeline
//!
//! 1. **API**: `address` and optional `port`, then `GET /health`
//! 2. **Environment**: engine flags, depending on the [`config::EnvsPolicy`]
//! 3. **Model**: `model_name`, then a registry lookup
//! 4. **Resources**: image, accelerators, and sizes; optionally an image lookup
//! 5. **Service**: readiness probe and port agreement with resources
//!
//! ## Modules
//!
//! - [`config`]: Manifest loading, validation and typed views
//! - [`remote`]: HTTP transport, reachability checks and submission
//! - [`cli`]: Command-line interface
//! - [`error`]: Error types
//!
//! ## Example
//!
//! ```yaml
//! api:
//!   address: 10.0.0.7
//!   port: 8080
//! envs:
//!   VLLM_USE_TRITON_FLASH_ATTN: false
//!   VLLM_ROCM_USE_AITER: true
//! model:
//!   model_name: Qwen/Qwen2.5-7B-Instruct
//! resources:
//!   cpus: 8
//!   memory: 64
//!   ports: 8000
//!   accelerators: "MI300:8"
//!   image_id: "docker:rocm/vllm:latest"
//! service:
//!   ports: 8000
//!   readiness_probe: /health
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod cli;
pub mod config;
pub mod error;
pub mod remote;

// ============================================================================
// Re-exports
// ============================================================================

pub use cli::{Cli, Commands, OutputFormatter};
pub use config::{
    EnvsPolicy, ManifestHasher, ManifestLoader, ManifestValidator, PipelineSettings, RawManifest,
    ValidatedManifest,
};
pub use error::{MipodError, Result};
pub use remote::{DeployResult, DeploySubmitter, HttpTransport, ReqwestTransport};
