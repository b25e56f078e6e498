//! Shared editable values of one entity.

use serde_json::{Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;

/// Raw field values of the entity being edited.
///
/// Values live in a watch channel: replacing them notifies every subscriber
/// and subscribers stay attached across replacements. Writes that leave the
/// values unchanged notify nobody and keep the revision.
#[derive(Debug)]
pub struct EntityForm {
    values: watch::Sender<Map<String, Value>>,
    revision: AtomicU64,
}

impl EntityForm {
    /// Empty form.
    #[must_use]
    pub fn new() -> Self {
        let (values, _) = watch::channel(Map::new());
        Self {
            values,
            revision: AtomicU64::new(0),
        }
    }

    /// Form prefilled from a row; non-object rows give an empty form.
    #[must_use]
    pub fn from_row(row: &Value) -> Self {
        let form = Self::new();
        if let Value::Object(values) = row {
            form.set_raw_values(values.clone());
        }
        form
    }

    /// Snapshot of all values.
    #[must_use]
    pub fn raw_values(&self) -> Map<String, Value> {
        self.values.borrow().clone()
    }

    /// Replace all values.
    pub fn set_raw_values(&self, values: Map<String, Value>) {
        let changed = self.values.send_if_modified(|current| {
            if *current == values {
                return false;
            }
            *current = values;
            true
        });
        self.bump(changed);
    }

    /// Set a single value.
    pub fn patch_value(&self, key: impl Into<String>, value: Value) {
        let key = key.into();
        let changed = self.values.send_if_modified(|values| {
            if values.get(&key) == Some(&value) {
                return false;
            }
            values.insert(key, value);
            true
        });
        self.bump(changed);
    }

    /// Counter advanced by every write that changed a value.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    fn bump(&self, changed: bool) {
        if changed {
            self.revision.fetch_add(1, Ordering::AcqRel);
        }
    }

    /// One value.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<Value> {
        self.values.borrow().get(key).cloned()
    }

    /// Receiver notified on every change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Map<String, Value>> {
        self.values.subscribe()
    }

    /// Number of attached subscribers.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.values.receiver_count()
    }
}

impl Default for EntityForm {
    fn default() -> Self {
        Self::new()
    }
}
