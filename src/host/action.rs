//! Host of the action renderers of one view.

use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use super::{HostState, HostStats};
use crate::metadata::{ExplorerAction, TargetData, Variant};
use crate::renderer::{
    EntityForm, RenderContext, RenderOutput, RenderSubject, Renderer, RendererKind,
    RendererResolver, merge_params,
};

/// Inputs delivered to an action host.
#[derive(Debug, Clone)]
pub struct ActionInput {
    /// Target the actions operate on
    pub target: Arc<TargetData>,
    /// Actions to render, in display order
    pub actions: Vec<ExplorerAction>,
    /// View variant
    pub variant: Variant,
    /// Row the actions apply to; `Null` in list views
    pub data: Value,
}

impl ActionInput {
    /// Input with the target's effective actions for `variant`.
    #[must_use]
    pub fn for_target(target: Arc<TargetData>, variant: Variant, data: Value) -> Self {
        let actions = target.entity.effective_actions(variant);
        Self {
            target,
            actions,
            variant,
            data,
        }
    }
}

struct ActionChild {
    action: ExplorerAction,
    kind: Arc<dyn RendererKind>,
    renderer: Box<dyn Renderer>,
    context: RenderContext,
    /// Host values last copied into the child's own form
    synced: Option<Map<String, Value>>,
}

/// Renders many actions, each resolved and mounted on its own.
///
/// Actions without a registered renderer are skipped. Every child works
/// through an entity form: a child without one is handed the host's form, a
/// child owning a form gets the host form's raw values copied into it so its
/// own listeners stay attached. A copy happens only when the host values
/// differ from the ones last copied into that child.
pub struct ActionRendererHost {
    resolver: Arc<RendererResolver>,
    form: Arc<EntityForm>,
    state: HostState,
    target: Option<String>,
    children: Vec<ActionChild>,
    stats: HostStats,
}

impl ActionRendererHost {
    /// Idle host sharing `form` with its children.
    #[must_use]
    pub fn new(resolver: Arc<RendererResolver>, form: Arc<EntityForm>) -> Self {
        Self {
            resolver,
            form,
            state: HostState::Idle,
            target: None,
            children: Vec::new(),
            stats: HostStats::default(),
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> HostState {
        self.state
    }

    /// The host's own form.
    #[must_use]
    pub fn form(&self) -> &Arc<EntityForm> {
        &self.form
    }

    /// Deliver new inputs.
    ///
    /// A changed target tears every child down and resolves the list anew.
    /// Otherwise children are matched by code: kept ones are patched on
    /// change, new ones mounted, vanished ones destroyed.
    pub fn update(&mut self, input: ActionInput) {
        if self.target.as_deref().is_some_and(|target| target != input.target.name()) {
            debug!(
                target: "renderer_host",
                "target changed to '{}', remounting {} actions",
                input.target.name(),
                self.children.len()
            );
            self.teardown();
        }
        self.target = Some(input.target.name().to_string());

        let mut previous = std::mem::take(&mut self.children);
        for action in &input.actions {
            let existing = previous.iter().position(|child| child.action.code == action.code);
            match existing {
                Some(index) => {
                    let mut child = previous.remove(index);
                    self.patch(&mut child, action, &input);
                    self.children.push(child);
                }
                None => {
                    self.state = HostState::Resolving;
                    if let Some(child) = self.mount(action, &input) {
                        self.children.push(child);
                    }
                }
            }
        }
        for mut stale in previous {
            stale.renderer.destroy();
            self.stats.teardowns += 1;
        }

        self.state = if self.children.is_empty() { HostState::Idle } else { HostState::Mounted };
    }

    /// Destroy every child.
    pub fn teardown(&mut self) {
        for mut child in self.children.drain(..) {
            child.renderer.destroy();
            self.stats.teardowns += 1;
        }
        self.target = None;
        self.state = HostState::Idle;
    }

    /// Codes of the mounted children in display order.
    #[must_use]
    pub fn codes(&self) -> Vec<&str> {
        self.children.iter().map(|child| child.action.code.as_str()).collect()
    }

    /// `(code, output)` of every mounted child.
    #[must_use]
    pub fn outputs(&self) -> Vec<(&str, RenderOutput)> {
        self.children
            .iter()
            .map(|child| (child.action.code.as_str(), child.renderer.output()))
            .collect()
    }

    /// Form the child rendering `code` works through.
    #[must_use]
    pub fn child_form(&self, code: &str) -> Option<Arc<EntityForm>> {
        self.children
            .iter()
            .find(|child| child.action.code == code)
            .and_then(|child| child.renderer.entity_form())
    }

    /// Lifetime counters.
    #[must_use]
    pub const fn stats(&self) -> HostStats {
        self.stats
    }

    fn mount(&mut self, action: &ExplorerAction, input: &ActionInput) -> Option<ActionChild> {
        let loader = self.resolver.resolve_action(action)?;
        let kind = loader.load();
        let mut renderer = kind.instantiate();
        let mut synced = None;
        let (form, _) = self.attach_form(renderer.as_mut(), &mut synced);

        let mut context = build_context(&kind, action, input, form);
        renderer.mount(&context);
        context.sync_form_revision();
        self.stats.mounts += 1;
        debug!(target: "renderer_host", "mounted action '{}' of {}", action.code, input.target.name());

        Some(ActionChild {
            action: action.clone(),
            kind,
            renderer,
            context,
            synced,
        })
    }

    fn patch(&mut self, child: &mut ActionChild, action: &ExplorerAction, input: &ActionInput) {
        let (form, copied) = self.attach_form(child.renderer.as_mut(), &mut child.synced);
        let mut context = build_context(&child.kind, action, input, form);
        if !copied && context.same_inputs(&child.context) {
            return;
        }

        self.state = HostState::Patching;
        child.renderer.patch(&context);
        context.sync_form_revision();
        child.action = action.clone();
        child.context = context;
        self.stats.patches += 1;
    }

    /// Give `renderer` the host form, or copy the host form's values into its own.
    ///
    /// Returns the form the child works through and whether values were copied.
    /// `synced` holds the values last copied into the child's own form.
    fn attach_form(
        &self,
        renderer: &mut dyn Renderer,
        synced: &mut Option<Map<String, Value>>,
    ) -> (Arc<EntityForm>, bool) {
        match renderer.entity_form() {
            None => {
                renderer.assign_entity_form(Arc::clone(&self.form));
                (Arc::clone(&self.form), false)
            }
            Some(own) if Arc::ptr_eq(&own, &self.form) => (own, false),
            Some(own) => {
                let values = self.form.raw_values();
                if synced.as_ref() == Some(&values) {
                    return (own, false);
                }
                own.set_raw_values(values.clone());
                *synced = Some(values);
                (own, true)
            }
        }
    }
}

impl Drop for ActionRendererHost {
    fn drop(&mut self) {
        for mut child in self.children.drain(..) {
            child.renderer.destroy();
        }
    }
}

impl fmt::Debug for ActionRendererHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRendererHost")
            .field("state", &self.state)
            .field("target", &self.target)
            .field("codes", &self.codes())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

fn build_context(
    kind: &Arc<dyn RendererKind>,
    action: &ExplorerAction,
    input: &ActionInput,
    form: Arc<EntityForm>,
) -> RenderContext {
    RenderContext::new(
        Arc::clone(&input.target),
        RenderSubject::Action(action.clone()),
        input.variant,
        input.data.clone(),
    )
    .with_entity_form(Some(form))
    .with_params(merge_params(&kind.default_params(), &action.params))
}
