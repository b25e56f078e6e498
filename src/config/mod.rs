//! Configuration management for the explorer engine
//!
//! A single user-level file (`~/.explorer/config.toml`, or the path in
//! `EXPLORER_CONFIG_PATH`) tunes the parts of the engine that differ between
//! deployments:
//!
//! - which target names get the media and localized reference renderers
//! - the default page size of list views
//! - labels and formats used by the built-in renderers
//! - extra renderer codes aliasing registered ones
//!
//! All keys are optional and a missing file is not an error.
//!
//! # Modules
//!
//! - `engine` - [`EngineConfig`] and its sections
//! - `parser` - generic TOML parsing with file path context

mod engine;
mod parser;

pub use engine::{DisplayConfig, EngineConfig, EntityNames, SectionConfig};
pub use parser::parse_config;
