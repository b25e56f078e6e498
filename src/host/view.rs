//! List and detail views assembled from hosts.

use futures::future::join_all;
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

use super::{ActionInput, ActionRendererHost, ColumnRendererHost, HostInput, HostStats};
use crate::core::Result;
use crate::metadata::{ColumnType, ExplorerColumn, ExplorerTab, TargetData, Variant};
use crate::renderer::{EntityForm, RenderOutput, RendererResolver};
use crate::resolver::CachedTargetResolver;
use crate::service::ExplorerService;

/// Resolve the referenced target of every reference column, concurrently.
///
/// Failures are logged and leave the slot empty; renderers then fall back to
/// the embedded row.
async fn resolve_references<S: ExplorerService>(
    cache: &CachedTargetResolver<S>,
    columns: &[ExplorerColumn],
) -> Vec<Option<Arc<TargetData>>> {
    join_all(columns.iter().map(|column| async move {
        let name = column
            .referenced_entity_name
            .as_deref()
            .filter(|_| column.column_type == ColumnType::Reference)?;
        match cache.resolve(name, Some(Variant::Section)).await {
            Ok(data) => Some(data),
            Err(error) => {
                warn!(target: "renderer_host", "column '{}': {error}", column.property);
                None
            }
        }
    }))
    .await
}

fn label(column: &ExplorerColumn) -> &str {
    if column.name.is_empty() { &column.property } else { &column.name }
}

fn add_stats(total: &mut HostStats, stats: HostStats) {
    total.mounts += stats.mounts;
    total.patches += stats.patches;
    total.teardowns += stats.teardowns;
}

/// List view of one target: a host per cell plus the list actions.
#[derive(Debug)]
pub struct SectionView {
    resolver: Arc<RendererResolver>,
    target: Arc<TargetData>,
    columns: Vec<ExplorerColumn>,
    referenced: Vec<Option<Arc<TargetData>>>,
    rows: Vec<Vec<ColumnRendererHost>>,
    actions: ActionRendererHost,
}

impl SectionView {
    /// Resolve `target` and its referenced targets through `cache`.
    ///
    /// # Errors
    ///
    /// Fails when the target itself cannot be resolved.
    pub async fn open<S: ExplorerService>(
        cache: &CachedTargetResolver<S>,
        resolver: Arc<RendererResolver>,
        target: &str,
    ) -> Result<Self> {
        let target = cache.resolve(target, Some(Variant::Section)).await?;
        let columns: Vec<ExplorerColumn> =
            target.entity.enabled_columns(Variant::Section).into_iter().cloned().collect();
        let referenced = resolve_references(cache, &columns).await;

        let mut actions = ActionRendererHost::new(Arc::clone(&resolver), Arc::new(EntityForm::new()));
        actions.update(ActionInput::for_target(Arc::clone(&target), Variant::Section, Value::Null));

        Ok(Self {
            resolver,
            target,
            columns,
            referenced,
            rows: Vec::new(),
            actions,
        })
    }

    /// Resolved target.
    #[must_use]
    pub const fn target(&self) -> &Arc<TargetData> {
        &self.target
    }

    /// Rendered columns in priority order.
    #[must_use]
    pub fn columns(&self) -> &[ExplorerColumn] {
        &self.columns
    }

    /// Column labels in priority order.
    #[must_use]
    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().map(label).collect()
    }

    /// Render `rows`, reusing the hosts of rows rendered before.
    pub fn render(&mut self, rows: &[Value]) -> Vec<Vec<RenderOutput>> {
        self.rows.truncate(rows.len());
        for (index, row) in rows.iter().enumerate() {
            if index == self.rows.len() {
                let hosts = self
                    .columns
                    .iter()
                    .map(|_| ColumnRendererHost::new(Arc::clone(&self.resolver)))
                    .collect();
                self.rows.push(hosts);
            }
            for (at, column) in self.columns.iter().enumerate() {
                let input = HostInput::new(Arc::clone(&self.target), column.clone(), Variant::Section, row.clone())
                    .with_referenced(self.referenced[at].clone());
                self.rows[index][at].update(input);
            }
        }

        self.rows
            .iter()
            .map(|hosts| hosts.iter().map(|host| host.output().unwrap_or_default()).collect())
            .collect()
    }

    /// Outputs of the list actions.
    #[must_use]
    pub fn actions(&self) -> Vec<(&str, RenderOutput)> {
        self.actions.outputs()
    }

    /// Summed counters of all hosts.
    #[must_use]
    pub fn stats(&self) -> HostStats {
        let mut total = self.actions.stats();
        for host in self.rows.iter().flatten() {
            add_stats(&mut total, host.stats());
        }
        total
    }
}

/// One tab of a rendered detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTab {
    /// Tab id; `None` for columns outside any tab
    pub id: Option<String>,
    /// `(label, output)` per field
    pub fields: Vec<(String, RenderOutput)>,
}

/// A rendered detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedObject {
    /// Field groups, untabbed fields first
    pub tabs: Vec<RenderedTab>,
    /// `(code, output)` per action
    pub actions: Vec<(String, RenderOutput)>,
}

#[derive(Debug)]
struct Field {
    column: ExplorerColumn,
    referenced: Option<Arc<TargetData>>,
    host: ColumnRendererHost,
}

#[derive(Debug)]
struct TabGroup {
    id: Option<String>,
    fields: Vec<Field>,
}

/// Detail view of one row: field hosts grouped by tab, actions sharing the
/// row's entity form.
#[derive(Debug)]
pub struct ObjectView {
    target: Arc<TargetData>,
    row: Value,
    form: Arc<EntityForm>,
    groups: Vec<TabGroup>,
    actions: ActionRendererHost,
}

impl ObjectView {
    /// Resolve `target` for `row` through `cache`.
    ///
    /// # Errors
    ///
    /// Fails when the target itself cannot be resolved.
    pub async fn open<S: ExplorerService>(
        cache: &CachedTargetResolver<S>,
        resolver: Arc<RendererResolver>,
        target: &str,
        row: Value,
    ) -> Result<Self> {
        let target = cache.resolve(target, Some(Variant::Object)).await?;
        let columns: Vec<ExplorerColumn> =
            target.entity.enabled_columns(Variant::Object).into_iter().cloned().collect();
        let referenced = resolve_references(cache, &columns).await;

        let tabs: Vec<&ExplorerTab> = target.entity.tabs_by_priority();
        let mut groups: Vec<TabGroup> = std::iter::once(None)
            .chain(tabs.iter().map(|tab| Some(tab.id.clone())))
            .map(|id| TabGroup { id, fields: Vec::new() })
            .collect();

        for (column, referenced) in columns.into_iter().zip(referenced) {
            let slot = column
                .tab
                .as_deref()
                .and_then(|tab| groups.iter().position(|group| group.id.as_deref() == Some(tab)))
                .unwrap_or(0);
            groups[slot].fields.push(Field {
                column,
                referenced,
                host: ColumnRendererHost::new(Arc::clone(&resolver)),
            });
        }
        groups.retain(|group| !group.fields.is_empty());

        let form = Arc::new(EntityForm::from_row(&row));
        let actions = ActionRendererHost::new(resolver, Arc::clone(&form));

        Ok(Self {
            target,
            row,
            form,
            groups,
            actions,
        })
    }

    /// Resolved target.
    #[must_use]
    pub const fn target(&self) -> &Arc<TargetData> {
        &self.target
    }

    /// Entity form shared by all fields and actions.
    #[must_use]
    pub const fn form(&self) -> &Arc<EntityForm> {
        &self.form
    }

    /// Replace the row; the form is reset to its values.
    pub fn set_row(&mut self, row: Value) {
        if let Value::Object(values) = &row {
            self.form.set_raw_values(values.clone());
        }
        self.row = row;
    }

    /// Push the current row into every host and collect outputs.
    pub fn render(&mut self) -> RenderedObject {
        let mut tabs = Vec::with_capacity(self.groups.len());
        for group in &mut self.groups {
            let mut fields = Vec::with_capacity(group.fields.len());
            for field in &mut group.fields {
                let input = HostInput::new(Arc::clone(&self.target), field.column.clone(), Variant::Object, self.row.clone())
                    .with_entity_form(Arc::clone(&self.form))
                    .with_referenced(field.referenced.clone());
                field.host.update(input);
                fields.push((label(&field.column).to_string(), field.host.output().unwrap_or_default()));
            }
            tabs.push(RenderedTab {
                id: group.id.clone(),
                fields,
            });
        }

        self.actions
            .update(ActionInput::for_target(Arc::clone(&self.target), Variant::Object, self.row.clone()));
        let actions = self
            .actions
            .outputs()
            .into_iter()
            .map(|(code, output)| (code.to_string(), output))
            .collect();

        RenderedObject { tabs, actions }
    }

    /// Summed counters of all hosts.
    #[must_use]
    pub fn stats(&self) -> HostStats {
        let mut total = self.actions.stats();
        for field in self.groups.iter().flat_map(|group| &group.fields) {
            add_stats(&mut total, field.host.stats());
        }
        total
    }
}
