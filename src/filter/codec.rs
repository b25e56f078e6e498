//! Token-level parsing and serialization.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{FilterError, FilterValue};

/// Clause separator, also the mandatory token prefix.
pub const SEPARATOR: &str = "::";

/// Ordered `name -> raw value` mapping.
///
/// Keeps first-insertion order so serialization is stable; inserting an
/// existing key overwrites its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterMap {
    entries: Vec<(String, String)>,
}

impl FilterMap {
    /// Empty mapping.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert or overwrite a raw value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Insert or overwrite a typed value.
    pub fn set_value(&mut self, key: impl Into<String>, value: &FilterValue) {
        self.insert(key, value.encode());
    }

    /// Raw value of `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Typed value of `key`.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<Result<FilterValue, FilterError>> {
        self.get(key).map(FilterValue::decode)
    }

    /// Remove `key`, returning its raw value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Number of clauses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when there are no clauses.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(key, raw value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FilterMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// Result of lenient parsing: whatever could be decoded plus what could not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFilter {
    /// Successfully decoded clauses
    pub entries: FilterMap,
    /// One entry per rejected clause
    pub diagnostics: Vec<FilterError>,
}

impl ParsedFilter {
    /// True when every clause was decoded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Parse a filter token.
///
/// Never fails: clauses without a `:` or with an empty key are skipped and
/// reported in [`ParsedFilter::diagnostics`]. Empty segments (e.g. from a bare
/// `::` or a trailing separator) are ignored silently.
#[must_use]
pub fn parse(token: &str) -> ParsedFilter {
    let mut parsed = ParsedFilter::default();
    let mut segments = token.split(SEPARATOR);

    if token.starts_with(SEPARATOR) {
        segments.next();
    } else if !token.is_empty() {
        debug!(target: "filter", "filter token without leading separator: {token}");
    }

    for segment in segments.filter(|s| !s.is_empty()) {
        match segment.split_once(':') {
            Some(("", _)) => parsed.diagnostics.push(FilterError::Malformed {
                segment: segment.to_string(),
                reason: "empty key".to_string(),
            }),
            Some((key, value)) => parsed.entries.insert(key, value),
            None => parsed.diagnostics.push(FilterError::Malformed {
                segment: segment.to_string(),
                reason: "missing ':' between name and value".to_string(),
            }),
        }
    }

    if !parsed.diagnostics.is_empty() {
        debug!(
            target: "filter",
            "filter token '{}' had {} malformed clause(s)",
            token,
            parsed.diagnostics.len()
        );
    }

    parsed
}

/// Parse a filter token, failing on the first malformed clause.
pub fn parse_strict(token: &str) -> Result<FilterMap, FilterError> {
    let parsed = parse(token);
    match parsed.diagnostics.into_iter().next() {
        Some(error) => Err(error),
        None => Ok(parsed.entries),
    }
}

/// Serialize a mapping to its canonical token.
///
/// An empty mapping yields the empty string.
///
/// # Errors
///
/// [`FilterError::InvalidKey`] for empty keys or keys containing `:`, and
/// [`FilterError::AmbiguousValue`] for values that would not decode back to
/// themselves.
pub fn serialize(map: &FilterMap) -> Result<String, FilterError> {
    let mut token = String::new();

    let last = map.len().saturating_sub(1);
    for (index, (key, value)) in map.iter().enumerate() {
        if key.is_empty() {
            return Err(FilterError::InvalidKey {
                key: key.to_string(),
                reason: "key is empty".to_string(),
            });
        }
        if key.contains(':') {
            return Err(FilterError::InvalidKey {
                key: key.to_string(),
                reason: "key contains ':'".to_string(),
            });
        }
        // an empty value runs into the next separator: `k:` + `::` reads as `k` + `:...`
        let runs_on = value.is_empty() && index < last;
        if runs_on || value.contains(SEPARATOR) || value.starts_with(':') || value.ends_with(':') {
            return Err(FilterError::AmbiguousValue {
                key: key.to_string(),
                value: value.to_string(),
            });
        }

        token.push_str(SEPARATOR);
        token.push_str(key);
        token.push(':');
        token.push_str(value);
    }

    Ok(token)
}
