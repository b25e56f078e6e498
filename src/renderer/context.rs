//! Inputs pushed into a renderer on mount and patch.

use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

use super::EntityForm;
use crate::metadata::{ExplorerAction, ExplorerColumn, TargetData, Variant};

/// Parameter names that collide with live inputs and are never taken from params.
pub const RESERVED_PARAM_KEYS: [&str; 5] = ["target", "column", "action", "data", "entityForm"];

/// Merge `overrides` over `defaults`; keys present in both take the override.
#[must_use]
pub fn merge_params(defaults: &Map<String, Value>, overrides: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = defaults.clone();
    for (key, value) in overrides {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// The descriptor a renderer is rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderSubject {
    /// A data field
    Column(ExplorerColumn),
    /// An operation
    Action(ExplorerAction),
}

/// Everything a renderer sees.
///
/// `target`, the subject, `data` and `entity_form` are live inputs owned by
/// the host; `params` holds the merged renderer parameters.
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// Target the rendered row belongs to
    pub target: Arc<TargetData>,
    /// Column or action being rendered
    pub subject: RenderSubject,
    /// View the renderer lives in
    pub variant: Variant,
    /// Row data
    pub data: Value,
    /// Shared editable values of the row, detail views only
    pub entity_form: Option<Arc<EntityForm>>,
    /// Revision of `entity_form` when the context was built
    pub form_revision: Option<u64>,
    /// Target metadata of a reference column's referenced entity
    pub referenced: Option<Arc<TargetData>>,
    /// Merged renderer parameters
    pub params: Map<String, Value>,
}

impl RenderContext {
    /// Context without form, referenced target or parameters.
    pub fn new(target: Arc<TargetData>, subject: RenderSubject, variant: Variant, data: Value) -> Self {
        Self {
            target,
            subject,
            variant,
            data,
            entity_form: None,
            form_revision: None,
            referenced: None,
            params: Map::new(),
        }
    }

    /// Attach the entity form.
    #[must_use]
    pub fn with_entity_form(mut self, form: Option<Arc<EntityForm>>) -> Self {
        self.form_revision = form.as_ref().map(|form| form.revision());
        self.entity_form = form;
        self
    }

    /// Re-read the form revision after the renderer wrote to the form itself.
    pub fn sync_form_revision(&mut self) {
        self.form_revision = self.entity_form.as_ref().map(|form| form.revision());
    }

    /// Attach the referenced target.
    #[must_use]
    pub fn with_referenced(mut self, referenced: Option<Arc<TargetData>>) -> Self {
        self.referenced = referenced;
        self
    }

    /// Set parameters, dropping names reserved for live inputs.
    #[must_use]
    pub fn with_params(mut self, mut params: Map<String, Value>) -> Self {
        for key in RESERVED_PARAM_KEYS {
            if params.remove(key).is_some() {
                debug!(
                    target: "renderer_host",
                    "ignoring parameter '{key}' on {}: it names a live input",
                    self.subject_code()
                );
            }
        }
        self.params = params;
        self
    }

    /// The column, when rendering one.
    #[must_use]
    pub const fn column(&self) -> Option<&ExplorerColumn> {
        match &self.subject {
            RenderSubject::Column(column) => Some(column),
            RenderSubject::Action(_) => None,
        }
    }

    /// The action, when rendering one.
    #[must_use]
    pub const fn action(&self) -> Option<&ExplorerAction> {
        match &self.subject {
            RenderSubject::Action(action) => Some(action),
            RenderSubject::Column(_) => None,
        }
    }

    /// Current value of the rendered column.
    ///
    /// Reads the entity form first so detail views show edits in progress.
    #[must_use]
    pub fn value(&self) -> Value {
        let Some(column) = self.column() else {
            return Value::Null;
        };
        if let Some(value) = self.entity_form.as_ref().and_then(|form| form.value(&column.property)) {
            return value;
        }
        self.data.get(&column.property).cloned().unwrap_or(Value::Null)
    }

    /// String parameter.
    #[must_use]
    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(Value::as_str)
    }

    /// Unsigned integer parameter.
    #[must_use]
    pub fn param_usize(&self, key: &str) -> Option<usize> {
        self.params.get(key).and_then(Value::as_u64).and_then(|n| usize::try_from(n).ok())
    }

    /// Whether both contexts would render the same.
    ///
    /// Shared inputs compare by identity first and by value second. Forms
    /// compare by identity and revision, so edits count as a change.
    #[must_use]
    pub fn same_inputs(&self, other: &Self) -> bool {
        let same_form = match (&self.entity_form, &other.entity_form) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        let same_referenced = match (&self.referenced, &other.referenced) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b) || a == b,
            (None, None) => true,
            _ => false,
        };

        same_form
            && self.form_revision == other.form_revision
            && same_referenced
            && self.variant == other.variant
            && (Arc::ptr_eq(&self.target, &other.target) || self.target == other.target)
            && self.subject == other.subject
            && self.data == other.data
            && self.params == other.params
    }

    fn subject_code(&self) -> &str {
        match &self.subject {
            RenderSubject::Column(column) => &column.property,
            RenderSubject::Action(action) => &action.code,
        }
    }
}
