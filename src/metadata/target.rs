//! Target (entity kind) descriptors.

use serde::{Deserialize, Serialize};

use super::{ExplorerAction, ExplorerColumn, RendererDescriptor, Variant};
use crate::constants::{ACTION_CREATE, ACTION_DELETE, ACTION_DUPLICATE, ACTION_SAVE};

const fn default_true() -> bool {
    true
}

/// Flags enabling the built-in create/save/delete/duplicate actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultActions {
    /// "Create" in the list view
    #[serde(default = "default_true")]
    pub create: bool,
    /// "Save" in the detail view
    #[serde(default = "default_true")]
    pub save: bool,
    /// "Delete" in the detail view
    #[serde(default = "default_true")]
    pub delete: bool,
    /// "Duplicate" in the detail view
    #[serde(default = "default_true")]
    pub duplicate: bool,
}

impl Default for DefaultActions {
    fn default() -> Self {
        Self {
            create: true,
            save: true,
            delete: true,
            duplicate: true,
        }
    }
}

/// Responsive width of a tab, in grid columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabSize {
    /// Width on tablet layouts
    pub tablet: u8,
    /// Width on desktop layouts
    pub desktop: u8,
}

/// Named grouping of columns in the detail view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerTab {
    /// Tab identifier referenced by [`ExplorerColumn::tab`]
    pub id: String,
    /// Ordering weight; lower values come first
    #[serde(default)]
    pub priority: i32,
    /// Optional responsive size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<TabSize>,
    /// Name of the owning target
    #[serde(default)]
    pub target: String,
}

/// One entity kind exposed to the explorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerTarget {
    /// Unique logical name
    pub target: String,

    /// Alternative name used in navigation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    /// Backing table
    #[serde(default)]
    pub table_name: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Longer description
    #[serde(default)]
    pub description: String,

    /// Fields of the target
    #[serde(default)]
    pub columns: Vec<ExplorerColumn>,

    /// Caller-defined actions
    #[serde(default)]
    pub actions: Vec<ExplorerAction>,

    /// Detail-view tabs
    #[serde(default)]
    pub tabs: Vec<ExplorerTab>,

    /// Built-in action flags
    #[serde(default)]
    pub default_actions: DefaultActions,

    /// Roles allowed to read; empty means everybody
    #[serde(default)]
    pub read_roles: Vec<String>,

    /// Roles allowed to write; empty means everybody
    #[serde(default)]
    pub write_roles: Vec<String>,
}

impl ExplorerTarget {
    /// Target with no columns, actions or tabs.
    pub fn new(target: impl Into<String>) -> Self {
        let target = target.into();
        Self {
            table_name: target.to_lowercase(),
            name: target.clone(),
            target,
            alias: None,
            description: String::new(),
            columns: Vec::new(),
            actions: Vec::new(),
            tabs: Vec::new(),
            default_actions: DefaultActions::default(),
            read_roles: Vec::new(),
            write_roles: Vec::new(),
        }
    }

    /// Append a column.
    #[must_use]
    pub fn with_column(mut self, column: ExplorerColumn) -> Self {
        self.columns.push(column);
        self
    }

    /// Append an action.
    #[must_use]
    pub fn with_action(mut self, action: ExplorerAction) -> Self {
        self.actions.push(action);
        self
    }

    /// Look up a column by its row property.
    #[must_use]
    pub fn column(&self, property: &str) -> Option<&ExplorerColumn> {
        self.columns.iter().find(|c| c.property == property)
    }

    /// True when `name` is the logical name or the alias of this target.
    #[must_use]
    pub fn is_named(&self, name: &str) -> bool {
        self.target == name || self.alias.as_deref() == Some(name)
    }

    /// Columns enabled for `variant`, ordered by priority (stable for ties).
    #[must_use]
    pub fn enabled_columns(&self, variant: Variant) -> Vec<&ExplorerColumn> {
        let mut columns: Vec<_> =
            self.columns.iter().filter(|c| c.context(variant).enabled).collect();
        columns.sort_by_key(|c| c.context(variant).priority);
        columns
    }

    /// Tabs ordered by priority.
    #[must_use]
    pub fn tabs_by_priority(&self) -> Vec<&ExplorerTab> {
        let mut tabs: Vec<_> = self.tabs.iter().collect();
        tabs.sort_by_key(|t| t.priority);
        tabs
    }

    /// Actions applicable to `variant`: enabled default actions first, then the
    /// target's own actions.
    #[must_use]
    pub fn effective_actions(&self, variant: Variant) -> Vec<ExplorerAction> {
        let flags = self.default_actions;
        let defaults = [
            (flags.create, ACTION_CREATE, Variant::Section),
            (flags.save, ACTION_SAVE, Variant::Object),
            (flags.duplicate, ACTION_DUPLICATE, Variant::Object),
            (flags.delete, ACTION_DELETE, Variant::Object),
        ];

        defaults
            .into_iter()
            .filter(|(enabled, _, for_variant)| *enabled && *for_variant == variant)
            .map(|(_, code, for_variant)| RendererDescriptor::new(code).with_type(for_variant))
            .chain(self.actions.iter().filter(|a| a.applies_to(variant)).cloned())
            .collect()
    }

    /// True when any of `roles` may read this target.
    #[must_use]
    pub fn can_read(&self, roles: &[String]) -> bool {
        Self::allowed(&self.read_roles, roles)
    }

    /// True when any of `roles` may write this target.
    #[must_use]
    pub fn can_write(&self, roles: &[String]) -> bool {
        Self::allowed(&self.write_roles, roles)
    }

    fn allowed(required: &[String], roles: &[String]) -> bool {
        required.is_empty() || required.iter().any(|r| roles.contains(r))
    }
}
