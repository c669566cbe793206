//! CLI module for the mipod tool.
//!
//! This module provides the command-line interface for validating and
//! submitting deployment manifests.

mod commands;
mod output;

pub use commands::{Cli, Commands, OutputFormat, PipelineArgs};
pub use output::OutputFormatter;
