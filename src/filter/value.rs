//! Typed clause values: exact, substring, date range and reference pointers.

use chrono::{DateTime, Utc};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

use super::FilterError;

static POINTER_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\{([^{}]*)\}$").ok());

static DATE_RANGE_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^FROM(-?\d*)TO(-?\d*)$").ok());

/// `{Entity.property}` suffix naming the field of a referenced target that the
/// clause compares against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReferencePointer {
    /// Referenced target name
    pub entity: String,
    /// Property on the referenced target
    pub property: String,
}

impl ReferencePointer {
    /// Parse the text between the braces.
    pub fn parse(pointer: &str) -> Result<Self, FilterError> {
        match pointer.split_once('.') {
            Some((entity, property)) if !entity.is_empty() && !property.is_empty() => Ok(Self {
                entity: entity.to_string(),
                property: property.to_string(),
            }),
            _ => Err(FilterError::InvalidReferencePointer {
                pointer: pointer.to_string(),
            }),
        }
    }
}

impl fmt::Display for ReferencePointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.entity, self.property)
    }
}

/// Match semantics of a clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterKind {
    /// Value equals the text
    Exact(String),
    /// Value contains the text, wire form `%text%`
    Contains(String),
    /// Value lies within `[from, to]` epoch milliseconds
    DateRange {
        /// Lower bound, epoch ms
        from: i64,
        /// Upper bound, epoch ms
        to: i64,
    },
}

/// Decoded clause value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterValue {
    /// Match semantics
    pub kind: FilterKind,
    /// Reference target field, for reference columns
    pub reference: Option<ReferencePointer>,
}

impl FilterValue {
    /// Exact match on `text`.
    pub fn exact(text: impl Into<String>) -> Self {
        Self {
            kind: FilterKind::Exact(text.into()),
            reference: None,
        }
    }

    /// Substring match on `text`.
    pub fn contains(text: impl Into<String>) -> Self {
        Self {
            kind: FilterKind::Contains(text.into()),
            reference: None,
        }
    }

    /// Inclusive epoch-millisecond range.
    #[must_use]
    pub const fn date_range(from: i64, to: i64) -> Self {
        Self {
            kind: FilterKind::DateRange { from, to },
            reference: None,
        }
    }

    /// Inclusive range between two timestamps.
    #[must_use]
    pub fn between(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self::date_range(from.timestamp_millis(), to.timestamp_millis())
    }

    /// Compare against `entity.property` of the referenced row.
    #[must_use]
    pub fn with_reference(mut self, entity: impl Into<String>, property: impl Into<String>) -> Self {
        self.reference = Some(ReferencePointer {
            entity: entity.into(),
            property: property.into(),
        });
        self
    }

    /// The text to show when re-editing the clause; date ranges have none.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            FilterKind::Exact(text) | FilterKind::Contains(text) => Some(text.as_str()),
            FilterKind::DateRange { .. } => None,
        }
    }

    /// Date range bounds as timestamps, when both are representable.
    #[must_use]
    pub fn bounds(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match self.kind {
            FilterKind::DateRange { from, to } => {
                Some((DateTime::from_timestamp_millis(from)?, DateTime::from_timestamp_millis(to)?))
            }
            _ => None,
        }
    }

    /// Wire form of the value.
    #[must_use]
    pub fn encode(&self) -> String {
        let mut encoded = match &self.kind {
            FilterKind::Exact(text) => text.clone(),
            FilterKind::Contains(text) => format!("%{text}%"),
            FilterKind::DateRange { from, to } => format!("FROM{from}TO{to}"),
        };
        if let Some(pointer) = &self.reference {
            encoded.push('{');
            encoded.push_str(&pointer.to_string());
            encoded.push('}');
        }
        encoded
    }

    /// Decode a raw clause value.
    ///
    /// # Errors
    ///
    /// [`FilterError::InvalidDateRange`] when the value has the `FROM…TO…`
    /// shape with a missing bound, [`FilterError::InvalidReferencePointer`] when
    /// the braces do not hold `Entity.property`.
    pub fn decode(raw: &str) -> Result<Self, FilterError> {
        let reference = reference_pointer(raw).map(ReferencePointer::parse).transpose()?;
        let clear = clear_value(raw);

        let kind = if let Some(caps) = DATE_RANGE_RE.as_ref().and_then(|re| re.captures(clear)) {
            let bound = |i: usize| caps.get(i).map(|m| m.as_str()).unwrap_or_default().parse::<i64>();
            match (bound(1), bound(2)) {
                (Ok(from), Ok(to)) => FilterKind::DateRange { from, to },
                _ => {
                    return Err(FilterError::InvalidDateRange {
                        value: clear.to_string(),
                    });
                }
            }
        } else if clear.len() >= 2 && clear.starts_with('%') && clear.ends_with('%') {
            FilterKind::Contains(clear[1..clear.len() - 1].to_string())
        } else {
            FilterKind::Exact(clear.to_string())
        };

        Ok(Self { kind, reference })
    }

    /// Decode, degrading malformed values to an exact match on the raw text.
    ///
    /// Returns the diagnostic alongside so callers can surface it.
    #[must_use]
    pub fn decode_lenient(raw: &str) -> (Self, Option<FilterError>) {
        match Self::decode(raw) {
            Ok(value) => (value, None),
            Err(error) => (Self::exact(clear_value(raw)), Some(error)),
        }
    }
}

/// Value with any trailing `{…}` pointer removed.
#[must_use]
pub fn clear_value(raw: &str) -> &str {
    match POINTER_RE.as_ref().and_then(|re| re.find(raw)) {
        Some(m) => &raw[..m.start()],
        None => raw,
    }
}

/// Content of the trailing `{…}` pointer, if any.
#[must_use]
pub fn reference_pointer(raw: &str) -> Option<&str> {
    POINTER_RE.as_ref()?.captures(raw).and_then(|caps| caps.get(1)).map(|m| m.as_str())
}
