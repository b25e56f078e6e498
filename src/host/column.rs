//! Host of a single column renderer.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::metadata::{ExplorerColumn, TargetData, Variant};
use crate::renderer::{
    EntityForm, RenderContext, RenderOutput, RenderSubject, Renderer, RendererResolver, Resolution,
    merge_params,
};

/// Lifecycle state of a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostState {
    /// Nothing delivered yet, or torn down
    Idle,
    /// Picking and loading a renderer
    Resolving,
    /// Child instantiated and holding the latest context
    Mounted,
    /// Pushing a changed context into the child
    Patching,
}

impl fmt::Display for HostState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Resolving => "resolving",
            Self::Mounted => "mounted",
            Self::Patching => "patching",
        })
    }
}

/// What an [`ColumnRendererHost::update`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// First delivery: resolved and mounted, no patch
    Mounted,
    /// Same target, changed inputs: child patched
    Patched,
    /// Same inputs: nothing pushed
    Unchanged,
    /// Target identity changed: old child destroyed, new one mounted
    Remounted,
}

/// Inputs delivered to a column host.
#[derive(Debug, Clone)]
pub struct HostInput {
    /// Target the row belongs to
    pub target: Arc<TargetData>,
    /// Column to render
    pub column: ExplorerColumn,
    /// View variant
    pub variant: Variant,
    /// Row data
    pub data: Value,
    /// Entity form of the row, detail views only
    pub entity_form: Option<Arc<EntityForm>>,
    /// Referenced target of a reference column
    pub referenced: Option<Arc<TargetData>>,
}

impl HostInput {
    /// Input without form or referenced target.
    pub fn new(target: Arc<TargetData>, column: ExplorerColumn, variant: Variant, data: Value) -> Self {
        Self {
            target,
            column,
            variant,
            data,
            entity_form: None,
            referenced: None,
        }
    }

    /// Attach the entity form.
    #[must_use]
    pub fn with_entity_form(mut self, form: Arc<EntityForm>) -> Self {
        self.entity_form = Some(form);
        self
    }

    /// Attach the referenced target.
    #[must_use]
    pub fn with_referenced(mut self, referenced: Option<Arc<TargetData>>) -> Self {
        self.referenced = referenced;
        self
    }
}

/// Mount, patch and destroy counts of a host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostStats {
    /// Children mounted
    pub mounts: usize,
    /// Patches pushed
    pub patches: usize,
    /// Children destroyed
    pub teardowns: usize,
}

struct MountedChild {
    target: String,
    resolution: Resolution,
    renderer: Box<dyn Renderer>,
    context: RenderContext,
}

/// Turns column inputs into one live renderer child.
///
/// The first delivery resolves and mounts. Later deliveries for the same target
/// patch the existing child when the context changed strictly. A delivery for
/// a different target destroys the child and resolves anew.
pub struct ColumnRendererHost {
    resolver: Arc<RendererResolver>,
    state: HostState,
    child: Option<MountedChild>,
    stats: HostStats,
}

impl ColumnRendererHost {
    /// Idle host resolving through `resolver`.
    #[must_use]
    pub const fn new(resolver: Arc<RendererResolver>) -> Self {
        Self {
            resolver,
            state: HostState::Idle,
            child: None,
            stats: HostStats {
                mounts: 0,
                patches: 0,
                teardowns: 0,
            },
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> HostState {
        self.state
    }

    /// Deliver new inputs.
    pub fn update(&mut self, input: HostInput) -> UpdateOutcome {
        let Some(child) = self.child.as_mut() else {
            self.mount(input);
            return UpdateOutcome::Mounted;
        };

        if child.target != input.target.name() {
            debug!(
                target: "renderer_host",
                "target changed from '{}' to '{}', remounting column '{}'",
                child.target,
                input.target.name(),
                input.column.property
            );
            self.teardown();
            self.mount(input);
            return UpdateOutcome::Remounted;
        }

        let kind = child.resolution.loader.load();
        let context = build_context(&input, &kind.default_params());
        if context.same_inputs(&child.context) {
            return UpdateOutcome::Unchanged;
        }

        self.state = HostState::Patching;
        child.renderer.patch(&context);
        child.context = context;
        self.stats.patches += 1;
        self.state = HostState::Mounted;
        UpdateOutcome::Patched
    }

    /// Destroy the child and go back to idle.
    pub fn teardown(&mut self) {
        if let Some(mut child) = self.child.take() {
            child.renderer.destroy();
            self.stats.teardowns += 1;
        }
        self.state = HostState::Idle;
    }

    /// Output of the mounted child.
    #[must_use]
    pub fn output(&self) -> Option<RenderOutput> {
        self.child.as_ref().map(|child| child.renderer.output())
    }

    /// How the mounted child's renderer was chosen.
    #[must_use]
    pub fn resolution(&self) -> Option<&Resolution> {
        self.child.as_ref().map(|child| &child.resolution)
    }

    /// Context last pushed to the child.
    #[must_use]
    pub fn context(&self) -> Option<&RenderContext> {
        self.child.as_ref().map(|child| &child.context)
    }

    /// Lifetime counters.
    #[must_use]
    pub const fn stats(&self) -> HostStats {
        self.stats
    }

    fn mount(&mut self, input: HostInput) {
        self.state = HostState::Resolving;
        let resolution = self.resolver.resolve_column(&input.column, input.variant);
        let kind = resolution.loader.load();
        let context = build_context(&input, &kind.default_params());

        let mut renderer = kind.instantiate();
        renderer.mount(&context);
        debug!(
            target: "renderer_host",
            "mounted '{}' for column '{}' of {}",
            resolution.code,
            input.column.property,
            input.target.name()
        );

        self.child = Some(MountedChild {
            target: input.target.name().to_string(),
            resolution,
            renderer,
            context,
        });
        self.stats.mounts += 1;
        self.state = HostState::Mounted;
    }
}

impl Drop for ColumnRendererHost {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            child.renderer.destroy();
        }
    }
}

impl fmt::Debug for ColumnRendererHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnRendererHost")
            .field("state", &self.state)
            .field("code", &self.resolution().map(|r| r.code.as_str()))
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

/// Kind defaults, then descriptor params, then column params; live inputs on top.
fn build_context(input: &HostInput, defaults: &serde_json::Map<String, Value>) -> RenderContext {
    let column_context = input.column.context(input.variant);
    let mut params = defaults.clone();
    if let Some(descriptor) = &column_context.renderer {
        params = merge_params(&params, &descriptor.params);
    }
    params = merge_params(&params, &column_context.renderer_params);

    RenderContext::new(
        Arc::clone(&input.target),
        RenderSubject::Column(input.column.clone()),
        input.variant,
        input.data.clone(),
    )
    .with_entity_form(input.entity_form.clone())
    .with_referenced(input.referenced.clone())
    .with_params(params)
}
