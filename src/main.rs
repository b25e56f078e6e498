//! Explorer preview entry point
//!
//! Drives the engine against a JSON fixture from the command line:
//! - `filter` - Encode and decode filter tokens
//! - `resolve` - Show which renderer each column and action resolves to
//! - `list` - Render a list view
//! - `show` - Render a detail view
//! - `config` - Show or initialize the engine configuration

use anyhow::Result;
use clap::Parser;
use explorer_engine::cli;
use explorer_engine::core::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    cli.init_logging();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
