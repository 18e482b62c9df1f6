//! Command-line interface for lexdown.
//!
//! # Available Commands
//!
//! - `render` - process one document and write the result
//! - `report` - print the field report of one document (quality gate)
//! - `batch` - process every document under a directory
//!
//! # Global Options
//!
//! All commands support these global options:
//! - `--verbose` - Enable debug output
//! - `--quiet` - Suppress all output except errors
//! - `--config` - Path to a TOML processing configuration
//!
//! # Example
//!
//! ```bash
//! # Render a contract, merging two metadata imports
//! lexdown render contract.md --import parties.yml --import terms.md -o out.md
//!
//! # Fail CI when a field is left empty
//! lexdown report contract.md --fail-on-missing
//!
//! # Render a whole folder, four documents at a time
//! lexdown batch contracts/ --out rendered/ --max-parallel 4
//! ```

mod batch;
pub mod common;
mod render;
mod report;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::ProcessingConfig;

pub use report::{ReportFormat, format_field_report};

/// Runtime configuration for CLI execution.
///
/// Built from the global flags so tests can construct one directly.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Filter directive used when `RUST_LOG` is not set.
    pub log_level: Option<String>,

    /// Processing configuration file.
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the global tracing subscriber.
    ///
    /// `RUST_LOG` wins when set. Logs go to stderr so rendered output on
    /// stdout stays clean.
    pub fn init_logging(&self) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(self.log_level.as_deref().unwrap_or("warn"))
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }

    /// Load the processing configuration, or the defaults when no file was given.
    pub fn processing_config(&self) -> Result<ProcessingConfig> {
        match &self.config_path {
            Some(path) => ProcessingConfig::load(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display())),
            None => Ok(ProcessingConfig::default()),
        }
    }
}

#[derive(Parser)]
#[command(
    name = "lexdown",
    about = "Structure and fill legal Markdown documents",
    version,
    long_about = "lexdown numbers headers, resolves cross references, merges imported metadata \
                  and fills template placeholders in legal Markdown documents."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output (equivalent to `RUST_LOG=debug`).
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only print errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to a TOML processing configuration.
    ///
    /// Keys use the same kebab-case names as document metadata, for example
    /// `level-one = "Article %n."` or `no-reset = true`.
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Process one document.
    Render(render::RenderCommand),

    /// Print the field report of one document.
    Report(report::ReportCommand),

    /// Process every document in a directory.
    Batch(batch::BatchCommand),
}

impl Cli {
    /// Execute the parsed command.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        };

        CliConfig {
            log_level: Some(log_level.to_string()),
            config_path: self.config.clone(),
        }
    }

    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();
        let processing = config.processing_config()?;

        match self.command {
            Commands::Render(cmd) => cmd.execute(processing, self.quiet).await,
            Commands::Report(cmd) => cmd.execute(processing).await,
            Commands::Batch(cmd) => cmd.execute(processing, self.quiet).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_config_log_levels() {
        let cli = Cli::parse_from(["lexdown", "--verbose", "report", "a.md"]);
        assert_eq!(cli.build_config().log_level.as_deref(), Some("debug"));

        let cli = Cli::parse_from(["lexdown", "-q", "report", "a.md"]);
        assert_eq!(cli.build_config().log_level.as_deref(), Some("error"));

        let cli = Cli::parse_from(["lexdown", "report", "a.md", "--config", "x.toml"]);
        let config = cli.build_config();
        assert_eq!(config.log_level.as_deref(), Some("warn"));
        assert_eq!(config.config_path, Some(PathBuf::from("x.toml")));
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["lexdown", "-v", "-q", "report", "a.md"]).is_err());
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let config = CliConfig {
            log_level: None,
            config_path: Some(PathBuf::from("/nonexistent/lexdown.toml")),
        };
        assert!(config.processing_config().is_err());
        assert!(CliConfig::new().processing_config().is_ok());
    }
}
