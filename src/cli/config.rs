//! `explorer config` - inspect the engine configuration.
//!
//! ```bash
//! explorer config          # show the effective configuration
//! explorer config path     # print the config file location
//! explorer config init     # write a file with all defaults
//! ```

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use crate::config::EngineConfig;

/// Show, locate or initialize the engine configuration.
///
/// Without a subcommand the effective configuration is shown.
#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: Option<ConfigSubcommands>,
}

#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Write a config file containing every default
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration as TOML
    Show,
    /// Print the config file location
    Path,
}

const HEADER: &str = "# Explorer engine configuration\n# Every section and key is optional.\n\n";

impl ConfigCommand {
    pub fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        match self.command {
            Some(ConfigSubcommands::Init {
                force,
            }) => Self::init(force, config_path),
            Some(ConfigSubcommands::Show) | None => Self::show(config_path),
            Some(ConfigSubcommands::Path) => Self::show_path(config_path),
        }
    }

    fn resolve_path(config_path: Option<PathBuf>) -> Result<PathBuf> {
        match config_path {
            Some(path) => Ok(path),
            None => EngineConfig::default_path(),
        }
    }

    fn init(force: bool, config_path: Option<PathBuf>) -> Result<()> {
        let path = Self::resolve_path(config_path)?;
        if path.exists() && !force {
            println!("Config already exists at: {}", path.display());
            println!("   Use --force to overwrite");
            return Ok(());
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }
        let content = format!("{HEADER}{}", EngineConfig::default().to_toml()?);
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        println!("{} {}", "Created".green(), path.display());
        Ok(())
    }

    fn show(config_path: Option<PathBuf>) -> Result<()> {
        let path = Self::resolve_path(config_path.clone()).ok();
        let config = EngineConfig::load_with_optional(config_path)?;

        println!("{}", "Engine Configuration".bold());
        match &path {
            Some(path) if path.exists() => println!("Location: {}\n", path.display()),
            Some(path) => println!("Location: {} (not found, using defaults)\n", path.display()),
            None => println!("Location: unknown (using defaults)\n"),
        }
        print!("{}", config.to_toml()?);
        Ok(())
    }

    fn show_path(config_path: Option<PathBuf>) -> Result<()> {
        println!("{}", Self::resolve_path(config_path)?.display());
        Ok(())
    }
}
