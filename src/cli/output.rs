//! Output formatting for CLI commands.
//!
//! This module provides formatting utilities for displaying
//! information to the user in various formats.

use colored::Colorize;
use serde_json::json;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::config::{EnvConfig, ValidatedManifest};
use crate::error::{MipodError, Result};
use crate::remote::DeployResult;

use super::commands::OutputFormat;

/// Characters of a secret left visible when masking.
const VISIBLE_SECRET_CHARS: usize = 4;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Field/value row for table display.
#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    value: String,
}

impl FieldRow {
    fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the resolved values of a validated manifest.
    ///
    /// # Errors
    ///
    /// Returns an error if a section cannot be projected.
    pub fn format_validation(&self, manifest: &ValidatedManifest, digest: &str) -> Result<String> {
        match self.format {
            OutputFormat::Json => Self::format_validation_json(manifest, digest),
            OutputFormat::Text => Self::format_validation_text(manifest, digest),
        }
    }

    /// Formats validation as JSON.
    fn format_validation_json(manifest: &ValidatedManifest, digest: &str) -> Result<String> {
        let api = manifest.api()?;
        let model = manifest.model()?;
        let resources = manifest.resources()?;
        let service = manifest.service()?;
        let envs = manifest.envs()?.map(|envs| {
            envs.iter()
                .map(|(name, value)| (name.to_string(), json!(value)))
                .collect::<serde_json::Map<_, _>>()
        });

        let document = json!({
            "valid": true,
            "digest": digest,
            "api": {
                "address": api.address,
                "port": api.port,
                "health_url": api.health_url(),
                "deploy_url": api.deploy_url(),
            },
            "envs": envs,
            "model": {
                "model_name": model.model_name,
                "hf_token": model.hf_token.as_deref().map(mask_secret),
                "args": model.args,
            },
            "resources": {
                "cpus": resources.cpus,
                "memory": resources.memory,
                "ports": resources.ports,
                "accelerator": resources.accelerator()?,
                "image": resources.image()?,
            },
            "service": service,
        });

        serde_json::to_string_pretty(&document).map_err(|e| MipodError::internal(e.to_string()))
    }

    /// Formats validation as text.
    fn format_validation_text(manifest: &ValidatedManifest, digest: &str) -> Result<String> {
        let api = manifest.api()?;
        let model = manifest.model()?;
        let resources = manifest.resources()?;
        let service = manifest.service()?;
        let accelerator = resources.accelerator()?;

        let mut output = String::new();
        let _ = writeln!(output, "\n{} Manifest digest: {digest}", "#".dimmed());

        Self::push_section(
            &mut output,
            "API",
            vec![
                FieldRow::new("address", api.address.clone()),
                FieldRow::new("port", api.port.map_or_else(|| String::from("-"), |p| p.to_string())),
                FieldRow::new("health", api.health_url()),
            ],
        );

        match manifest.envs()? {
            Some(envs) => Self::push_section(&mut output, "Environment", Self::env_rows(&envs)),
            None => {
                let _ = writeln!(output, "\n{} Environment: not validated", "-".dimmed());
            }
        }

        Self::push_section(
            &mut output,
            "Model",
            vec![
                FieldRow::new("model_name", model.model_name.clone()),
                FieldRow::new(
                    "hf_token",
                    model.hf_token.as_deref().map_or_else(|| String::from("-"), mask_secret),
                ),
                FieldRow::new("args", model.args.clone().unwrap_or_else(|| String::from("-"))),
            ],
        );

        Self::push_section(
            &mut output,
            "Resources",
            vec![
                FieldRow::new("cpus", resources.cpus.to_string()),
                FieldRow::new("memory", resources.memory.to_string()),
                FieldRow::new("ports", resources.ports.to_string()),
                FieldRow::new("accelerator", accelerator.name),
                FieldRow::new("count", accelerator.count.to_string()),
                FieldRow::new("image", resources.image()?.to_string()),
            ],
        );

        Self::push_section(
            &mut output,
            "Service",
            vec![
                FieldRow::new("ports", service.ports.to_string()),
                FieldRow::new("readiness_probe", service.readiness_probe),
            ],
        );

        let _ = write!(output, "\n{} Configuration is valid!", "✓".green());
        Ok(output)
    }

    /// Builds one row per resolved flag, spelled as the container sees it.
    fn env_rows(envs: &EnvConfig) -> Vec<FieldRow> {
        envs.to_env_pairs()
            .into_iter()
            .map(|(name, value)| FieldRow::new(name, value))
            .collect()
    }

    /// Appends a titled table.
    fn push_section(output: &mut String, title: &str, rows: Vec<FieldRow>) {
        let _ = writeln!(output, "\n{} {}", "▸".cyan(), title.bold());
        output.push_str(&Table::new(rows).to_string());
        output.push('\n');
    }

    /// Formats the outcome of a deployment submission.
    #[must_use]
    pub fn format_deploy(&self, result: &DeployResult) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(result).unwrap_or_default(),
            OutputFormat::Text => {
                if result.success {
                    format!("{} Deployment accepted\n{}\n", "✓".green(), result.body)
                } else {
                    format!(
                        "{} Deployment failed with status {}: {}\n",
                        "✗".red(),
                        result.status,
                        result.body
                    )
                }
            }
        }
    }

    /// Formats an error.
    #[must_use]
    pub fn format_error(&self, error: &MipodError) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&json!({
                "valid": false,
                "error": {
                    "kind": error.kind(),
                    "message": error.to_string(),
                    "transient": error.is_transient(),
                },
            }))
            .unwrap_or_default(),
            OutputFormat::Text => format!("{} {error}", "Error:".red().bold()),
        }
    }
}

/// Masks all but the first few characters of a secret.
fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= VISIBLE_SECRET_CHARS * 2 {
        return "*".repeat(count);
    }

    let visible: String = secret.chars().take(VISIBLE_SECRET_CHARS).collect();
    format!("{visible}{}", "*".repeat(count - VISIBLE_SECRET_CHARS))
}
