//! Generic TOML parsing with file path context.
//!
//! Error output looks like:
//! ```text
//! Failed to parse config file: /path/to/config.toml
//! Caused by:
//!     invalid type: string "x", expected usize
//! ```

use anyhow::{Context, Result};
use std::path::Path;

/// Parse a TOML file into any [`serde::de::DeserializeOwned`] type.
///
/// # Errors
///
/// Returns an error if the file cannot be read or its content does not match `T`.
/// Both cases name the file in the error context.
pub fn parse_config<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: T = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}
