//! Mipod CLI entrypoint.
//!
//! This is the main entrypoint for the mipod command-line tool.

use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use mipod_deploy::cli::{Cli, Commands, OutputFormatter};
use mipod_deploy::config::{ManifestHasher, ManifestValidator, PipelineSettings, load_dotenv};
use mipod_deploy::error::Result;
use mipod_deploy::remote::{DeploySubmitter, ReqwestTransport};

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    // A malformed .env is reported once logging is up.
    let dotenv = load_dotenv(".");

    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose, cli.log_json);

    match dotenv {
        Ok(Some(path)) => debug!("Loaded {}", path.display()),
        Ok(None) => {}
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    }

    let formatter = OutputFormatter::new(cli.output);

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli, &formatter)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", formatter.format_error(&e));
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
///
/// `RUST_LOG` wins when set; otherwise `--verbose` picks `debug` over `info`.
fn init_logging(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref(), default_level);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Builds the log filter from a `RUST_LOG` value, falling back to `default_level`.
fn log_filter(rust_log: Option<&str>, default_level: &str) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default_level))
}

/// Main async entry point.
async fn run(cli: Cli, formatter: &OutputFormatter) -> Result<()> {
    let settings = cli.pipeline.to_settings();
    debug!("Pipeline settings: {settings:?}");

    match cli.command {
        Commands::Validate { file } => cmd_validate(&file, settings, formatter).await,
        Commands::Deploy { file } => cmd_deploy(&file, settings, formatter).await,
    }
}

/// Builds a validator on the production transport.
fn create_validator(settings: PipelineSettings) -> Result<ManifestValidator<ReqwestTransport>> {
    let transport = ReqwestTransport::new(settings.timeout)?;
    Ok(ManifestValidator::new(transport, settings))
}

/// Validate a manifest.
async fn cmd_validate(
    file: &Path,
    settings: PipelineSettings,
    formatter: &OutputFormatter,
) -> Result<()> {
    info!("Validating manifest: {}", file.display());

    let validator = create_validator(settings)?;
    let manifest = validator.validate_file(file).await?;
    let digest = ManifestHasher::new().hash_manifest(manifest.raw())?;

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", formatter.format_validation(&manifest, &digest)?)?;
    Ok(())
}

/// Validate a manifest and submit it.
async fn cmd_deploy(
    file: &Path,
    settings: PipelineSettings,
    formatter: &OutputFormatter,
) -> Result<()> {
    info!("Deploying manifest: {}", file.display());

    let timeout = settings.timeout;
    let validator = create_validator(settings)?;
    let manifest = validator.validate_file(file).await?;

    let submitter = DeploySubmitter::new(ReqwestTransport::new(timeout)?);
    let result = submitter.submit(&manifest).await?;

    let mut stdout = std::io::stdout().lock();
    write!(stdout, "{}", formatter.format_deploy(&result))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_rust_log_overrides_verbose() {
        assert_eq!(log_filter(Some("warn"), "debug").max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(
            log_filter(Some("mipod_deploy=trace"), "info").max_level_hint(),
            Some(LevelFilter::TRACE)
        );
    }

    #[test]
    fn test_level_fallback() {
        assert_eq!(log_filter(None, "debug").max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(log_filter(Some("  "), "info").max_level_hint(), Some(LevelFilter::INFO));
    }
}
