//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{
    DEFAULT_DOCKER_REGISTRY_URL, DEFAULT_MODEL_REGISTRY_URL, DEFAULT_TIMEOUT_SECS, EnvsPolicy,
    PipelineSettings,
};

/// Mipod - validate and submit model deployment manifests.
#[derive(Parser, Debug)]
#[command(name = "mipod")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Output format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Validation pipeline settings.
    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a deployment manifest.
    Validate {
        /// Path to the manifest file.
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Validate a deployment manifest and submit it to its API.
    Deploy {
        /// Path to the manifest file.
        #[arg(short, long)]
        file: PathBuf,
    },
}

impl Commands {
    /// Returns the manifest path of the command.
    #[must_use]
    pub const fn file(&self) -> &PathBuf {
        match self {
            Self::Validate { file } | Self::Deploy { file } => file,
        }
    }
}

/// Flags controlling the validation pipeline.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct PipelineArgs {
    /// Base URL of the model registry.
    #[arg(
        long,
        global = true,
        env = "MIPOD_MODEL_REGISTRY_URL",
        default_value = DEFAULT_MODEL_REGISTRY_URL
    )]
    pub model_registry_url: String,

    /// Treatment of the `envs` section.
    #[arg(long, global = true, env = "MIPOD_ENVS", value_enum, default_value = "required")]
    pub envs: EnvsPolicy,

    /// Check that the container image exists in the Docker registry.
    #[arg(long, global = true, env = "MIPOD_CHECK_IMAGE")]
    pub check_image: bool,

    /// Base URL of the Docker registry.
    #[arg(
        long,
        global = true,
        env = "MIPOD_DOCKER_REGISTRY_URL",
        default_value = DEFAULT_DOCKER_REGISTRY_URL
    )]
    pub docker_registry_url: String,

    /// HTTP timeout in seconds.
    #[arg(
        long,
        global = true,
        env = "MIPOD_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    pub timeout_secs: u64,
}

impl PipelineArgs {
    /// Builds pipeline settings from the flags.
    #[must_use]
    pub fn to_settings(&self) -> PipelineSettings {
        let settings = PipelineSettings::new()
            .with_envs(self.envs)
            .with_model_registry(self.model_registry_url.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs));

        if self.check_image {
            settings.with_image_check(self.docker_registry_url.clone())
        } else {
            settings
        }
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_validate_requires_file() {
        assert!(Cli::try_parse_from(["mipod", "validate"]).is_err());

        let cli = Cli::try_parse_from(["mipod", "validate", "-f", "m.yaml"]).unwrap();
        assert_eq!(cli.command.file(), &PathBuf::from("m.yaml"));
        assert_eq!(cli.output, OutputFormat::Text);
    }

    #[test]
    fn test_pipeline_flags() {
        let cli = Cli::try_parse_from([
            "mipod",
            "deploy",
            "--file",
            "m.yaml",
            "--envs",
            "ignored",
            "--check-image",
            "--docker-registry-url",
            "http://registry.local",
            "--timeout-secs",
            "5",
        ])
        .unwrap();

        assert!(matches!(cli.command, Commands::Deploy { .. }));

        let settings = cli.pipeline.to_settings();
        assert_eq!(settings.envs, EnvsPolicy::Ignored);
        assert!(settings.check_image);
        assert_eq!(settings.docker_registry_url, "http://registry.local");
        assert_eq!(settings.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_image_check_off_by_default() {
        let cli = Cli::try_parse_from(["mipod", "validate", "-f", "m.yaml"]).unwrap();
        let settings = cli.pipeline.to_settings();
        assert!(!settings.check_image);
        assert_eq!(settings.envs, EnvsPolicy::Required);
    }
}
