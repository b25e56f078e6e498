//! The resolved target bundle cached per `(target, variant)`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ColumnType, ExplorerColumn, ExplorerTarget, Variant};
use crate::core::{ExplorerError, Result};

/// Target metadata plus its identity and display columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetData {
    /// Full target description
    pub entity: ExplorerTarget,
    /// Column whose property identifies a row
    pub primary_column: ExplorerColumn,
    /// Column used as human-readable label of a row
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub named_column: Option<ExplorerColumn>,
}

impl TargetData {
    /// Build the bundle from a bare target.
    ///
    /// Requires exactly one primary column. The named column is the first
    /// non-primary unique string column, if any.
    pub fn from_entity(entity: ExplorerTarget) -> Result<Self> {
        let mut primaries = entity.columns.iter().filter(|c| c.primary);
        let primary_column = primaries.next().cloned().ok_or_else(|| ExplorerError::InvalidTarget {
            target: entity.target.clone(),
            reason: "no primary column".to_string(),
        })?;
        if let Some(extra) = primaries.next() {
            return Err(ExplorerError::InvalidTarget {
                target: entity.target.clone(),
                reason: format!(
                    "more than one primary column ('{}' and '{}')",
                    primary_column.property, extra.property
                ),
            });
        }

        let named_column = entity
            .columns
            .iter()
            .find(|c| !c.primary && c.unique && c.column_type == ColumnType::String)
            .cloned();

        Ok(Self {
            entity,
            primary_column,
            named_column,
        })
    }

    /// Check the primary-column invariant of an already assembled bundle.
    pub fn validate(&self) -> Result<()> {
        let primaries: Vec<_> = self.entity.columns.iter().filter(|c| c.primary).collect();
        let invalid = |reason: String| ExplorerError::InvalidTarget {
            target: self.entity.target.clone(),
            reason,
        };

        match primaries.as_slice() {
            [] => Ok(()),
            [only] if only.property == self.primary_column.property => Ok(()),
            [only] => Err(invalid(format!(
                "primary column '{}' does not match column flagged primary '{}'",
                self.primary_column.property, only.property
            ))),
            many => Err(invalid(format!("{} columns flagged primary", many.len()))),
        }
    }

    /// Logical name of the target.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.entity.target
    }

    /// Display column, falling back to the primary column.
    #[must_use]
    pub fn named_column(&self) -> &ExplorerColumn {
        self.named_column.as_ref().unwrap_or(&self.primary_column)
    }

    /// Stable identity of a row: its primary property rendered as a string.
    #[must_use]
    pub fn identity_of(&self, row: &Value) -> Option<String> {
        row.get(&self.primary_column.property).and_then(scalar_to_string)
    }

    /// Human-readable label of a row.
    #[must_use]
    pub fn display_of(&self, row: &Value) -> String {
        row.get(&self.named_column().property)
            .and_then(scalar_to_string)
            .or_else(|| self.identity_of(row))
            .unwrap_or_default()
    }

    /// Copy of the bundle keeping only the columns enabled for `variant`.
    ///
    /// The primary and named columns are always kept so identity and display
    /// keep working.
    #[must_use]
    pub fn shaped(&self, variant: Variant) -> Self {
        let named = self.named_column().property.clone();
        let mut shaped = self.clone();
        shaped.entity.columns.retain(|c| {
            c.context(variant).enabled || c.property == self.primary_column.property || c.property == named
        });
        shaped
    }
}

/// String form of scalar JSON values; `None` for null, arrays and objects.
pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
