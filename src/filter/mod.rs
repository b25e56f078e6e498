//! Filter DSL for list-view search criteria
//!
//! A filter token is a single URL-safe string that carries zero or more field
//! filters, e.g. `::status:true::owner:%ann%{UserEntity.login}`.
//!
//! # Grammar
//!
//! - A filter-bearing token starts with the separator `::`
//! - Each clause is `name:value`; clauses are joined by `::`
//! - Parsing splits on `::`, drops the leading empty segment, and splits each
//!   segment on its **first** `:`; later duplicates overwrite earlier ones
//! - An empty mapping serializes to the empty string; callers omit the filter
//!   parameter entirely in that case
//!
//! # Value conventions
//!
//! | Form | Meaning |
//! |------|---------|
//! | `text` | exact match |
//! | `%text%` | substring match |
//! | `FROM<ms>TO<ms>` | inclusive epoch-millisecond date range |
//! | `…{Entity.property}` | compare against `property` of the referenced `Entity` |
//!
//! See [`FilterValue`] for typed access.
//!
//! # Known limitation
//!
//! Values containing `::`, or starting or ending with `:`, cannot be represented:
//! the grammar has no escaping. [`serialize`] rejects them with
//! [`FilterError::AmbiguousValue`] instead of producing a token that would decode
//! differently. So is an empty value anywhere but in the last clause. A single
//! inner `:` is fine.
//!
//! # Example
//!
//! ```rust
//! use explorer_engine::filter::{self, FilterMap, FilterValue};
//!
//! let mut map = FilterMap::new();
//! map.insert("status", "true");
//! map.set_value("owner", &FilterValue::contains("ann").with_reference("UserEntity", "login"));
//!
//! let token = filter::serialize(&map).unwrap();
//! assert_eq!(token, "::status:true::owner:%ann%{UserEntity.login}");
//!
//! let parsed = filter::parse(&token);
//! assert!(parsed.diagnostics.is_empty());
//! assert_eq!(parsed.entries, map);
//! ```

mod codec;
mod matcher;
mod value;

pub use codec::{FilterMap, ParsedFilter, SEPARATOR, parse, parse_strict, serialize};
pub use matcher::matches;
pub use value::{FilterKind, FilterValue, ReferencePointer, clear_value, reference_pointer};

use thiserror::Error;

/// Filter token encoding and decoding failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// Key is empty or contains `:`.
    #[error("Invalid filter key '{key}': {reason}")]
    InvalidKey {
        /// Offending key
        key: String,
        /// Why it is invalid
        reason: String,
    },

    /// Value cannot be represented unambiguously in the grammar.
    #[error("Filter value for '{key}' cannot be encoded unambiguously: '{value}'")]
    AmbiguousValue {
        /// Clause key
        key: String,
        /// Offending value
        value: String,
    },

    /// A clause of the token does not follow `name:value`.
    #[error("Malformed filter clause '{segment}': {reason}")]
    Malformed {
        /// Offending clause text
        segment: String,
        /// Why it was rejected
        reason: String,
    },

    /// `FROM…TO…` value with a missing or non-numeric bound.
    #[error("Invalid date range '{value}': expected FROM<epoch-ms>TO<epoch-ms>")]
    InvalidDateRange {
        /// Offending value
        value: String,
    },

    /// `{…}` pointer that is not `Entity.property`.
    #[error("Invalid reference pointer '{pointer}': expected {{Entity.property}}")]
    InvalidReferencePointer {
        /// Content between the braces
        pointer: String,
    },
}
