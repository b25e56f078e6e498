//! Data service capability consumed by the engine
//!
//! [`ExplorerService`] is the seam to whatever backend holds the metadata and
//! rows. The engine never talks to a transport itself; it calls these methods
//! and caches `get_target` results through [`crate::resolver::CachedTargetResolver`].
//!
//! [`InMemoryExplorerService`] implements the trait over a JSON fixture and
//! backs the preview binary and the test suites.

mod memory;

pub use memory::{Fixture, FixtureTarget, InMemoryExplorerService};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use crate::core::{ExplorerError, Result};
use crate::metadata::{TargetData, Variant};

/// Sort direction of a list request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    /// Ascending
    #[default]
    Asc,
    /// Descending
    Desc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        })
    }
}

impl FromStr for SortOrder {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "ASC" => Ok(Self::Asc),
            "DESC" => Ok(Self::Desc),
            _ => Err(ExplorerError::Other {
                message: format!("Unknown sort order '{s}', expected ASC or DESC"),
            }),
        }
    }
}

/// Paging, sorting and filtering of a list request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageableParams {
    /// Page size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// Zero-based page index
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    /// Property to sort by
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    /// Sort direction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<SortOrder>,
    /// Filter token in the `::key:value` grammar
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

/// One page of rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageableData<Row = Value> {
    /// Rows of the page
    pub content: Vec<Row>,
    /// Rows matching the request across all pages
    pub total: usize,
    /// Zero-based page index
    pub page: usize,
    /// Page size
    pub limit: usize,
}

/// Backend capability the engine consumes.
///
/// Implementations must be shareable across tasks; the cached resolver runs
/// `get_target` in a spawned task.
pub trait ExplorerService: Send + Sync + 'static {
    /// Metadata of `target`, shaped for `variant` when given.
    fn get_target(&self, target: &str, variant: Option<Variant>) -> impl Future<Output = Result<TargetData>> + Send;

    /// One page of rows of `target`.
    fn get_section_list(
        &self,
        target: &str,
        params: &PageableParams,
    ) -> impl Future<Output = Result<PageableData>> + Send;

    /// The row of `target` with primary key `id`.
    fn get_entity(&self, target: &str, id: &str) -> impl Future<Output = Result<Value>> + Send;

    /// Create (`id` absent) or replace a row; returns the stored row.
    fn save_entity(&self, entity: Value, target: &str, id: Option<&str>) -> impl Future<Output = Result<Value>> + Send;

    /// Delete the row of `target` with primary key `id`.
    fn remove_entity(&self, target: &str, id: &str) -> impl Future<Output = Result<()>> + Send;
}

impl<S: ExplorerService> ExplorerService for Arc<S> {
    fn get_target(&self, target: &str, variant: Option<Variant>) -> impl Future<Output = Result<TargetData>> + Send {
        (**self).get_target(target, variant)
    }

    fn get_section_list(
        &self,
        target: &str,
        params: &PageableParams,
    ) -> impl Future<Output = Result<PageableData>> + Send {
        (**self).get_section_list(target, params)
    }

    fn get_entity(&self, target: &str, id: &str) -> impl Future<Output = Result<Value>> + Send {
        (**self).get_entity(target, id)
    }

    fn save_entity(&self, entity: Value, target: &str, id: Option<&str>) -> impl Future<Output = Result<Value>> + Send {
        (**self).save_entity(entity, target, id)
    }

    fn remove_entity(&self, target: &str, id: &str) -> impl Future<Output = Result<()>> + Send {
        (**self).remove_entity(target, id)
    }
}
