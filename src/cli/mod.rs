//! Command-line interface of the `explorer` preview binary.
//!
//! The binary drives the engine against a JSON fixture so metadata, renderer
//! resolution and filter tokens can be inspected without a running backend.
//!
//! # Available Commands
//!
//! - `filter` - Encode and decode filter tokens
//! - `resolve` - Show the renderer picked for every column and action
//! - `list` - Render one page of a list view
//! - `show` - Render the detail view of one row
//! - `config` - Show, locate or initialize the engine configuration
//!
//! # Global Options
//!
//! - `--verbose` - Debug logging
//! - `--quiet` - Errors only
//! - `--config` - Path to a custom config file
//!
//! `RUST_LOG` takes precedence when neither `--verbose` nor `--quiet` is given.
//!
//! # Example
//!
//! ```bash
//! explorer --verbose list --fixture fixture.json TaskEntity --filter '::done:false'
//! ```

mod common;
mod config;
mod filter;
mod list;
mod resolve;
mod show;

pub use common::{EngineContext, FixtureArgs};

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Logging setup derived from the global flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Filter directive handed to [`EnvFilter`]
    pub log_level: String,
    /// Whether `RUST_LOG` may override [`Self::log_level`]
    pub respect_env: bool,
}

impl CliConfig {
    fn env_filter(&self) -> EnvFilter {
        if self.respect_env
            && let Ok(filter) = EnvFilter::try_from_default_env()
        {
            return filter;
        }
        EnvFilter::new(&self.log_level)
    }
}

/// Preview the explorer engine against a JSON fixture.
#[derive(Parser)]
#[command(name = "explorer", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the engine config file (defaults to ~/.explorer/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode and decode filter tokens
    Filter(filter::FilterCommand),

    /// Show the renderer resolved for each column and action of a target
    Resolve(resolve::ResolveCommand),

    /// Render one page of a target's list view
    List(list::ListCommand),

    /// Render the detail view of one row
    Show(show::ShowCommand),

    /// Show or initialize the engine configuration
    Config(config::ConfigCommand),
}

impl Cli {
    /// Logging configuration for the parsed flags.
    ///
    /// ```rust
    /// use clap::Parser;
    /// use explorer_engine::cli::Cli;
    ///
    /// let cli = Cli::parse_from(["explorer", "--verbose", "config", "path"]);
    /// assert_eq!(cli.build_config().log_level, "debug");
    /// ```
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let (log_level, respect_env) = if self.verbose {
            ("debug", false)
        } else if self.quiet {
            ("error", false)
        } else {
            ("warn", true)
        };
        CliConfig {
            log_level: log_level.to_string(),
            respect_env,
        }
    }

    /// Install the stderr tracing subscriber. Later calls are no-ops.
    pub fn init_logging(&self) {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(self.build_config().env_filter())
            .with_writer(std::io::stderr)
            .with_target(true)
            .try_init();
    }

    /// Run the selected command.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Filter(cmd) => cmd.execute(),
            Commands::Resolve(cmd) => cmd.execute(self.config).await,
            Commands::List(cmd) => cmd.execute(self.config).await,
            Commands::Show(cmd) => cmd.execute(self.config).await,
            Commands::Config(cmd) => cmd.execute(self.config),
        }
    }
}
