//! Engine configuration (`~/.explorer/config.toml`).
//!
//! # File Format
//!
//! ```toml
//! [entities]
//! media = "MediaEntity"
//! localized_string = "LocalizedStringEntity"
//! localized_media = "LocalizedMediaEntity"
//!
//! [section]
//! default_limit = 20
//!
//! [display]
//! date_format = "%Y-%m-%d %H:%M"
//! boolean_true = "yes"
//! boolean_false = "no"
//! locale = "en"
//!
//! # Extra codes resolving to an existing renderer
//! [renderers]
//! money-section-renderer = "string-section-renderer"
//! ```
//!
//! Every section and key is optional. The location can be overridden with the
//! `EXPLORER_CONFIG_PATH` environment variable; a missing file means defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::parse_config;

use crate::constants::{
    CONFIG_PATH_ENV, DEFAULT_LOCALIZED_MEDIA_ENTITY, DEFAULT_LOCALIZED_STRING_ENTITY,
    DEFAULT_MEDIA_ENTITY, DEFAULT_PAGE_LIMIT,
};

/// Targets that get dedicated reference renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityNames {
    /// Media target
    pub media: String,
    /// Localized string target
    pub localized_string: String,
    /// Localized media target
    pub localized_media: String,
}

impl Default for EntityNames {
    fn default() -> Self {
        Self {
            media: DEFAULT_MEDIA_ENTITY.to_string(),
            localized_string: DEFAULT_LOCALIZED_STRING_ENTITY.to_string(),
            localized_media: DEFAULT_LOCALIZED_MEDIA_ENTITY.to_string(),
        }
    }
}

/// List-view defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionConfig {
    /// Page size when a request carries no limit
    pub default_limit: usize,
}

impl Default for SectionConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

/// Defaults handed to the built-in renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// `chrono` format string for dates
    pub date_format: String,
    /// Label for `true`
    pub boolean_true: String,
    /// Label for `false`
    pub boolean_false: String,
    /// Locale picked by localized renderers
    pub locale: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            date_format: "%Y-%m-%d %H:%M".to_string(),
            boolean_true: "yes".to_string(),
            boolean_false: "no".to_string(),
            locale: "en".to_string(),
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Special entity names for reference disambiguation
    pub entities: EntityNames,
    /// List-view defaults
    pub section: SectionConfig,
    /// Built-in renderer defaults
    pub display: DisplayConfig,
    /// Alias code -> existing renderer code
    pub renderers: BTreeMap<String, String>,
}

impl EngineConfig {
    /// Load from the default location, or defaults when no file exists.
    pub fn load() -> Result<Self> {
        Self::load_with_optional(None)
    }

    /// Load from `path` when given, else from the default location.
    pub fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => match Self::default_path() {
                Ok(path) => path,
                Err(error) => {
                    tracing::debug!(target: "config", "no default config path: {error}");
                    return Ok(Self::default());
                }
            },
        };

        if path.exists() {
            Self::load_from(&path)
        } else {
            tracing::debug!(target: "config", "config file {} not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config: Self = parse_config(path)?;
        config.validate().with_context(|| format!("Invalid config in {}", path.display()))?;
        Ok(config)
    }

    /// Default location: `EXPLORER_CONFIG_PATH`, else `~/.explorer/config.toml`.
    pub fn default_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("explorer")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(".explorer")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Check values that deserialize fine but make no sense.
    pub fn validate(&self) -> Result<()> {
        if self.section.default_limit == 0 {
            anyhow::bail!("section.default_limit must be greater than zero");
        }
        if let Some((alias, _)) = self.renderers.iter().find(|(alias, code)| alias == code) {
            anyhow::bail!("renderer alias '{alias}' points at itself");
        }
        Ok(())
    }

    /// Pretty TOML form, e.g. for `explorer config`.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}
