//! Row matching against a decoded filter mapping.
//!
//! Used by services that filter rows in process. Remote services receive the
//! raw token instead and apply their own semantics.

use chrono::DateTime;
use serde_json::Value;
use tracing::debug;

use super::{FilterKind, FilterMap, FilterValue};
use crate::metadata::{TargetData, scalar_to_string};

/// True when `row` satisfies every clause of `filters`.
///
/// - Exact clauses compare the string form of the field
/// - Contains clauses are case-insensitive substring matches
/// - Date ranges accept epoch-millisecond numbers and RFC 3339 strings
/// - A reference pointer selects `pointer.property` from an embedded
///   referenced row; scalar foreign keys are compared directly
/// - Array fields match when any element matches
///
/// Malformed clause values degrade to exact matches on their raw text.
#[must_use]
pub fn matches(row: &Value, filters: &FilterMap, target: &TargetData) -> bool {
    filters.iter().all(|(key, raw)| {
        let (value, diagnostic) = FilterValue::decode_lenient(raw);
        if let Some(diagnostic) = diagnostic {
            debug!(target: "filter", "filter on '{}.{}': {}", target.name(), key, diagnostic);
        }

        let property = target.entity.column(key).map_or(key, |c| c.property.as_str());
        match row.get(property) {
            Some(Value::Array(items)) => items.iter().any(|item| field_matches(item, &value)),
            Some(field) => field_matches(field, &value),
            None => false,
        }
    })
}

fn field_matches(field: &Value, filter: &FilterValue) -> bool {
    let field = match (&filter.reference, field) {
        (Some(pointer), Value::Object(referenced)) => match referenced.get(&pointer.property) {
            Some(inner) => inner,
            None => return false,
        },
        _ => field,
    };

    match &filter.kind {
        FilterKind::Exact(text) => scalar_to_string(field).is_some_and(|s| s == *text),
        FilterKind::Contains(text) => scalar_to_string(field)
            .is_some_and(|s| s.to_lowercase().contains(&text.to_lowercase())),
        FilterKind::DateRange { from, to } => {
            epoch_millis(field).is_some_and(|ms| (*from..=*to).contains(&ms))
        }
    }
}

fn epoch_millis(field: &Value) -> Option<i64> {
    match field {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => DateTime::parse_from_rfc3339(s).ok().map(|d| d.timestamp_millis()),
        _ => None,
    }
}
