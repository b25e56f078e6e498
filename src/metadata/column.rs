//! Column descriptors and their per-variant rendering configuration.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use super::{RendererDescriptor, Variant};

/// Data type of a column as reported by the backend.
///
/// The set is closed; any other wire value is kept verbatim in
/// [`ColumnType::Other`] so resolution diagnostics can name it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColumnType {
    /// Free text
    String,
    /// Integer or decimal number
    Number,
    /// True/false flag
    Boolean,
    /// Timestamp, transported as epoch milliseconds
    Date,
    /// Pointer to a row of another target
    Reference,
    /// Backend could not determine the type
    #[default]
    Unknown,
    /// Unrecognized type name
    Other(String),
}

impl ColumnType {
    /// Wire name of the type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Reference => "reference",
            Self::Unknown => "unknown",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for ColumnType {
    fn from(value: String) -> Self {
        match value.to_lowercase().as_str() {
            "string" => Self::String,
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            "date" => Self::Date,
            "reference" => Self::Reference,
            "unknown" | "" => Self::Unknown,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for ColumnType {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<ColumnType> for String {
    fn from(value: ColumnType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const fn default_true() -> bool {
    true
}

/// Rendering configuration of a column in one variant (list or detail view).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnContext {
    /// Whether the column takes part in this variant at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Whether the column is shown by default (hidden columns can be toggled on)
    #[serde(default = "default_true")]
    pub visibility: bool,

    /// Ordering weight; lower values come first
    #[serde(default)]
    pub priority: i32,

    /// Explicit renderer selection; `None` means type-based resolution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renderer: Option<RendererDescriptor>,

    /// Column-level overrides merged over the renderer defaults
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub renderer_params: Map<String, Value>,
}

impl Default for ColumnContext {
    fn default() -> Self {
        Self {
            enabled: true,
            visibility: true,
            priority: 0,
            renderer: None,
            renderer_params: Map::new(),
        }
    }
}

impl ColumnContext {
    /// Explicit renderer code, ignoring blank codes.
    #[must_use]
    pub fn renderer_code(&self) -> Option<&str> {
        self.renderer.as_ref().map(|r| r.code.as_str()).filter(|code| !code.trim().is_empty())
    }
}

/// One field of a target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerColumn {
    /// Stable column identifier
    pub id: String,

    /// Key into row data
    pub property: String,

    /// Display name (translation key or literal)
    #[serde(default)]
    pub name: String,

    /// Longer description
    #[serde(default)]
    pub description: String,

    /// Column data type
    #[serde(default, rename = "type")]
    pub column_type: ColumnType,

    /// Identity column of the target
    #[serde(default)]
    pub primary: bool,

    /// Values are unique across rows
    #[serde(default)]
    pub unique: bool,

    /// Holds a list of values
    #[serde(default)]
    pub multiple: bool,

    /// Computed column without backing storage
    #[serde(default, rename = "virtual")]
    pub is_virtual: bool,

    /// Referenced target for `reference` columns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referenced_entity_name: Option<String>,

    /// Referenced table for `reference` columns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referenced_table_name: Option<String>,

    /// List-view configuration
    #[serde(default)]
    pub section: ColumnContext,

    /// Detail-view configuration
    #[serde(default)]
    pub object: ColumnContext,

    /// Tab grouping in the detail view
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab: Option<String>,
}

impl ExplorerColumn {
    /// Create a column with default configuration for both variants.
    pub fn new(property: impl Into<String>, column_type: ColumnType) -> Self {
        let property = property.into();
        Self {
            id: property.clone(),
            name: property.clone(),
            property,
            description: String::new(),
            column_type,
            primary: false,
            unique: false,
            multiple: false,
            is_virtual: false,
            referenced_entity_name: None,
            referenced_table_name: None,
            section: ColumnContext::default(),
            object: ColumnContext::default(),
            tab: None,
        }
    }

    /// Mark the column as the target's primary column.
    #[must_use]
    pub fn as_primary(mut self) -> Self {
        self.primary = true;
        self.unique = true;
        self
    }

    /// Turn the column into a reference to `entity`.
    #[must_use]
    pub fn referencing(mut self, entity: impl Into<String>) -> Self {
        self.column_type = ColumnType::Reference;
        self.referenced_entity_name = Some(entity.into());
        self
    }

    /// Configuration for the given variant.
    #[must_use]
    pub const fn context(&self, variant: Variant) -> &ColumnContext {
        match variant {
            Variant::Section => &self.section,
            Variant::Object => &self.object,
        }
    }

    /// Mutable configuration for the given variant.
    pub fn context_mut(&mut self, variant: Variant) -> &mut ColumnContext {
        match variant {
            Variant::Section => &mut self.section,
            Variant::Object => &mut self.object,
        }
    }

    /// True when the column is a reference pointing at `entity`.
    #[must_use]
    pub fn references(&self, entity: &str) -> bool {
        self.column_type == ColumnType::Reference
            && self.referenced_entity_name.as_deref() == Some(entity)
    }
}
