//! In-process data service over a JSON fixture.
//!
//! Fixture layout:
//!
//! ```json
//! {
//!   "targets": [
//!     { "target": "UserEntity", "columns": [ { "id": "id", "property": "id", "type": "number", "primary": true } ] }
//!   ],
//!   "rows": {
//!     "UserEntity": [ { "id": 1 } ]
//!   }
//! }
//! ```
//!
//! Targets may be bare `ExplorerTarget`s or complete `TargetData` bundles.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::Path;
use tokio::sync::RwLock;
use tracing::debug;

use super::{ExplorerService, PageableData, PageableParams, SortOrder};
use crate::constants::DEFAULT_PAGE_LIMIT;
use crate::core::{ExplorerError, Result};
use crate::filter;
use crate::metadata::{ColumnType, ExplorerTarget, TargetData, Variant};

/// A fixture target entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FixtureTarget {
    /// Complete bundle with explicit primary and named columns
    Data(TargetData),
    /// Bare target; primary and named columns are derived
    Entity(ExplorerTarget),
}

impl FixtureTarget {
    fn into_data(self) -> Result<TargetData> {
        match self {
            Self::Data(data) => {
                data.validate()?;
                Ok(data)
            }
            Self::Entity(entity) => TargetData::from_entity(entity),
        }
    }
}

/// Deserialized fixture file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixture {
    /// Target metadata
    #[serde(default)]
    pub targets: Vec<FixtureTarget>,
    /// Rows per target name
    #[serde(default)]
    pub rows: BTreeMap<String, Vec<Value>>,
}

/// [`ExplorerService`] keeping metadata and rows in memory.
#[derive(Debug)]
pub struct InMemoryExplorerService {
    targets: BTreeMap<String, TargetData>,
    rows: RwLock<BTreeMap<String, Vec<Value>>>,
    default_limit: usize,
}

impl InMemoryExplorerService {
    /// Service over a parsed fixture.
    pub fn from_fixture(fixture: Fixture) -> Result<Self> {
        let mut targets = BTreeMap::new();
        for target in fixture.targets {
            let data = target.into_data()?;
            targets.insert(data.name().to_string(), data);
        }

        if let Some(name) = fixture.rows.keys().find(|name| !targets.contains_key(*name)) {
            return Err(ExplorerError::InvalidTarget {
                target: name.clone(),
                reason: "rows given for a target without metadata".to_string(),
            });
        }

        Ok(Self {
            targets,
            rows: RwLock::new(fixture.rows),
            default_limit: DEFAULT_PAGE_LIMIT,
        })
    }

    /// Service over fixture JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_fixture(serde_json::from_str(json)?)
    }

    /// Service over a fixture file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let fixture_error = |reason: String| ExplorerError::FixtureError {
            path: path.display().to_string(),
            reason,
        };
        let content = std::fs::read_to_string(path).map_err(|e| fixture_error(e.to_string()))?;
        let fixture: Fixture = serde_json::from_str(&content).map_err(|e| fixture_error(e.to_string()))?;
        Self::from_fixture(fixture).map_err(|e| fixture_error(e.to_string()))
    }

    /// Page size used when a request carries no limit.
    #[must_use]
    pub const fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit;
        self
    }

    /// Names of all known targets.
    #[must_use]
    pub fn target_names(&self) -> Vec<&str> {
        self.targets.keys().map(String::as_str).collect()
    }

    fn lookup(&self, target: &str) -> Result<&TargetData> {
        self.targets
            .get(target)
            .or_else(|| {
                self.targets
                    .values()
                    .find(|data| data.entity.alias.as_deref() == Some(target))
            })
            .ok_or_else(|| ExplorerError::TargetNotFound {
                target: target.to_string(),
            })
    }
}

impl ExplorerService for InMemoryExplorerService {
    async fn get_target(&self, target: &str, variant: Option<Variant>) -> Result<TargetData> {
        let data = self.lookup(target)?;
        debug!(target: "service", "get_target {target} {variant:?}");
        Ok(match variant {
            Some(variant) => data.shaped(variant),
            None => data.clone(),
        })
    }

    async fn get_section_list(&self, target: &str, params: &PageableParams) -> Result<PageableData> {
        let data = self.lookup(target)?;
        let filters = match params.filter.as_deref() {
            Some(token) => {
                let parsed = filter::parse(token);
                for diagnostic in &parsed.diagnostics {
                    debug!(target: "service", "filter on {target}: {diagnostic}");
                }
                parsed.entries
            }
            None => filter::FilterMap::new(),
        };

        let rows = self.rows.read().await;
        let mut matching: Vec<Value> = rows
            .get(data.name())
            .map(|rows| rows.iter().filter(|row| filter::matches(row, &filters, data)).cloned().collect())
            .unwrap_or_default();
        drop(rows);

        if let Some(sort) = &params.sort {
            matching.sort_by(|a, b| compare_fields(a.get(sort), b.get(sort)));
            if params.order == Some(SortOrder::Desc) {
                matching.reverse();
            }
        }

        let limit = params.limit.filter(|limit| *limit > 0).unwrap_or(self.default_limit);
        let page = params.page.unwrap_or(0);
        let total = matching.len();
        let content = matching.into_iter().skip(page.saturating_mul(limit)).take(limit).collect();

        Ok(PageableData {
            content,
            total,
            page,
            limit,
        })
    }

    async fn get_entity(&self, target: &str, id: &str) -> Result<Value> {
        let data = self.lookup(target)?;
        let rows = self.rows.read().await;
        rows.get(data.name())
            .and_then(|rows| rows.iter().find(|row| data.identity_of(row).as_deref() == Some(id)))
            .cloned()
            .ok_or_else(|| ExplorerError::EntityNotFound {
                target: data.name().to_string(),
                id: id.to_string(),
            })
    }

    async fn save_entity(&self, entity: Value, target: &str, id: Option<&str>) -> Result<Value> {
        let data = self.lookup(target)?;
        let Value::Object(mut fields) = entity else {
            return Err(ExplorerError::Other {
                message: format!("Entity for '{target}' must be a JSON object"),
            });
        };
        let primary = &data.primary_column;

        let mut rows = self.rows.write().await;
        let table = rows.entry(data.name().to_string()).or_default();

        if let Some(id) = id {
            let position = table
                .iter()
                .position(|row| data.identity_of(row).as_deref() == Some(id))
                .ok_or_else(|| ExplorerError::EntityNotFound {
                    target: data.name().to_string(),
                    id: id.to_string(),
                })?;
            if let Some(existing) = table[position].get(&primary.property) {
                fields.insert(primary.property.clone(), existing.clone());
            }
            let saved = Value::Object(fields);
            table[position] = saved.clone();
            debug!(target: "service", "replaced {target}/{id}");
            return Ok(saved);
        }

        let supplied = fields.get(&primary.property).filter(|v| !v.is_null()).cloned();
        let key = match supplied {
            Some(key) => key,
            None if primary.column_type == ColumnType::Number => {
                let next = table
                    .iter()
                    .filter_map(|row| row.get(&primary.property).and_then(Value::as_i64))
                    .max()
                    .unwrap_or(0)
                    + 1;
                Value::from(next)
            }
            None => {
                return Err(ExplorerError::InvalidTarget {
                    target: data.name().to_string(),
                    reason: format!("new entities need a value for '{}'", primary.property),
                });
            }
        };

        if table.iter().any(|row| row.get(&primary.property) == Some(&key)) {
            return Err(ExplorerError::Other {
                message: format!("Entity {key} already exists in '{}'", data.name()),
            });
        }

        fields.insert(primary.property.clone(), key);
        let saved = Value::Object(fields);
        table.push(saved.clone());
        debug!(target: "service", "created {target} row {:?}", data.identity_of(&saved));
        Ok(saved)
    }

    async fn remove_entity(&self, target: &str, id: &str) -> Result<()> {
        let data = self.lookup(target)?;
        let mut rows = self.rows.write().await;
        let table = rows.get_mut(data.name());
        let removed = table.is_some_and(|table| {
            let before = table.len();
            table.retain(|row| data.identity_of(row).as_deref() != Some(id));
            table.len() < before
        });
        if removed {
            Ok(())
        } else {
            Err(ExplorerError::EntityNotFound {
                target: data.name().to_string(),
                id: id.to_string(),
            })
        }
    }
}

/// Numbers compare numerically, everything else by string form; missing last.
fn compare_fields(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => {
            a.as_f64().partial_cmp(&b.as_f64()).unwrap_or(Ordering::Equal)
        }
        (Some(a), Some(b)) => sort_key(a).cmp(&sort_key(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn sort_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.to_lowercase(),
        other => other.to_string(),
    }
}
