//! Metadata model for explorer targets
//!
//! Plain value objects describing what the backend knows about each entity
//! kind: its columns, tabs and actions. The engine never mutates them; they
//! are deserialized from the data service (JSON-shaped, camelCase keys) and
//! shared behind [`std::sync::Arc`] once resolved.
//!
//! # Types
//!
//! - [`ExplorerTarget`] - one entity kind with its columns, tabs and actions
//! - [`ExplorerColumn`] - one field, with separate [`Variant::Section`] and
//!   [`Variant::Object`] rendering configuration
//! - [`ExplorerTab`] - named grouping of columns in the detail view
//! - [`RendererDescriptor`] - a registry code plus parameters, used both as
//!   [`ExplorerColumnRenderer`] and [`ExplorerAction`]
//! - [`TargetData`] - the resolved bundle of target, primary column and
//!   display ("named") column
//!
//! # Example
//!
//! ```rust
//! use explorer_engine::metadata::{ExplorerTarget, TargetData, Variant};
//! use serde_json::json;
//!
//! let target: ExplorerTarget = serde_json::from_value(json!({
//!     "target": "UserEntity",
//!     "tableName": "users",
//!     "columns": [
//!         { "id": "id", "property": "id", "type": "number", "primary": true },
//!         { "id": "login", "property": "login", "type": "string", "unique": true }
//!     ]
//! }))
//! .unwrap();
//!
//! let data = TargetData::from_entity(target).unwrap();
//! assert_eq!(data.primary_column.property, "id");
//! assert_eq!(data.named_column().property, "login");
//! assert_eq!(data.entity.enabled_columns(Variant::Section).len(), 2);
//! ```

mod column;
mod target;
mod target_data;

pub use column::{ColumnContext, ColumnType, ExplorerColumn};
pub use target::{DefaultActions, ExplorerTab, ExplorerTarget, TabSize};
pub use target_data::TargetData;
pub(crate) use target_data::scalar_to_string;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::core::ExplorerError;

/// Rendering context of a target: list view or detail view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// List view: one row per entity
    Section,
    /// Detail view: one entity, all editable fields
    Object,
}

impl Variant {
    /// Wire name of the variant.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Section => "section",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "section" | "list" => Ok(Self::Section),
            "object" | "detail" => Ok(Self::Object),
            _ => Err(ExplorerError::Other {
                message: format!("Unknown variant '{s}', expected 'section' or 'object'"),
            }),
        }
    }
}

/// A registry code with metadata and parameters.
///
/// Used for explicit column renderers and for actions; both are resolved
/// against a renderer registry by `code`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RendererDescriptor {
    /// Registry lookup key
    pub code: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Longer description
    #[serde(default)]
    pub description: String,

    /// Context the descriptor belongs to
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub renderer_type: Option<Variant>,

    /// Default parameters of the renderer
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub params: Map<String, Value>,
}

impl RendererDescriptor {
    /// Descriptor with only a code.
    pub fn new(code: impl Into<String>) -> Self {
        let code = code.into();
        Self {
            name: code.clone(),
            code,
            description: String::new(),
            renderer_type: None,
            params: Map::new(),
        }
    }

    /// Set the context the descriptor belongs to.
    #[must_use]
    pub const fn with_type(mut self, variant: Variant) -> Self {
        self.renderer_type = Some(variant);
        self
    }

    /// Add a default parameter.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    /// True when the descriptor applies to `variant` (untyped descriptors apply everywhere).
    #[must_use]
    pub fn applies_to(&self, variant: Variant) -> bool {
        self.renderer_type.is_none_or(|t| t == variant)
    }
}

/// Explicit renderer selection of a column.
pub type ExplorerColumnRenderer = RendererDescriptor;

/// Operation attached to a target, rendered through the action registry.
pub type ExplorerAction = RendererDescriptor;
