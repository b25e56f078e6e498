//! Pluggable renderers: registration, resolution and the traits renderers implement
//!
//! A renderer is selected by a string `code` within one of three families
//! ([`RendererFamily`]). Callers register [`RendererLoader`]s, each a lazy,
//! memoized factory for a [`RendererKind`]. A kind instantiates live
//! [`Renderer`] children, which the host module mounts and patches.
//!
//! # Modules
//!
//! - `registry` - [`RendererRegistry`], the per-family loader lists
//! - `resolver` - [`RendererResolver`], column/action descriptor to loader
//! - `context` - [`RenderContext`], the inputs pushed to a renderer
//! - `form` - [`EntityForm`], shared editable values of one entity
//! - `builtin` - the default text renderers and default action renderers
//!
//! # Example
//!
//! ```rust
//! use explorer_engine::metadata::{ColumnType, ExplorerColumn, Variant};
//! use explorer_engine::renderer::{RendererRegistry, RendererResolver, ResolutionSource};
//! use std::sync::Arc;
//!
//! let resolver = RendererResolver::new(Arc::new(RendererRegistry::with_builtins()));
//! let column = ExplorerColumn::new("active", ColumnType::Boolean);
//!
//! let resolution = resolver.resolve_column(&column, Variant::Object);
//! assert_eq!(resolution.code, "boolean-object-renderer");
//! assert_eq!(resolution.source, ResolutionSource::TypeDefault);
//! ```

pub mod builtin;
mod context;
mod form;
mod registry;
mod resolver;

pub use context::{RESERVED_PARAM_KEYS, RenderContext, RenderSubject, merge_params};
pub use form::EntityForm;
pub use registry::RendererRegistry;
pub use resolver::{Resolution, ResolutionSource, RendererResolver};

use serde_json::{Map, Value};
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::metadata::Variant;

/// Renderer family a loader is registered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RendererFamily {
    /// Cell renderers of list views
    Section,
    /// Field renderers of detail views
    Object,
    /// Action renderers, both views
    Action,
}

impl RendererFamily {
    /// Lowercase family name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Section => "section",
            Self::Object => "object",
            Self::Action => "action",
        }
    }

    /// Column renderer family for a view variant.
    #[must_use]
    pub const fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::Section => Self::Section,
            Variant::Object => Self::Object,
        }
    }
}

impl fmt::Display for RendererFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a mounted renderer currently shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOutput {
    /// Display text
    pub text: String,
    /// Navigation target, e.g. a referenced entity or a media URL
    pub link: Option<String>,
}

impl RenderOutput {
    /// Output with text only.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            link: None,
        }
    }

    /// Output with text and a link.
    pub fn linked(text: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            link: Some(link.into()),
        }
    }
}

/// A live renderer child owned by a host.
///
/// `mount` is called exactly once with the initial context, `patch` for every
/// later strict change of the context and `destroy` before the child is dropped.
pub trait Renderer: Send + Sync {
    /// Receive the initial context.
    fn mount(&mut self, context: &RenderContext);

    /// Receive a changed context.
    fn patch(&mut self, context: &RenderContext);

    /// Release resources before removal.
    fn destroy(&mut self) {}

    /// Current output.
    fn output(&self) -> RenderOutput;

    /// Form this child edits through, if it has one.
    fn entity_form(&self) -> Option<Arc<EntityForm>> {
        None
    }

    /// Hand the child a form to use. Children without form support ignore it.
    fn assign_entity_form(&mut self, form: Arc<EntityForm>) {
        let _ = form;
    }
}

/// A renderer implementation, as produced by a loader.
pub trait RendererKind: Send + Sync {
    /// Code this implementation registers under.
    fn code(&self) -> &str;

    /// Parameters merged beneath descriptor and column overrides.
    fn default_params(&self) -> Map<String, Value> {
        Map::new()
    }

    /// Create a fresh, unmounted child.
    fn instantiate(&self) -> Box<dyn Renderer>;
}

type Factory = Box<dyn Fn() -> Arc<dyn RendererKind> + Send + Sync>;

/// Lazily obtains a renderer implementation.
///
/// The factory runs at most once; repeated [`RendererLoader::load`] calls return
/// the same implementation.
pub struct RendererLoader {
    code: String,
    factory: Factory,
    loaded: OnceLock<Arc<dyn RendererKind>>,
}

impl RendererLoader {
    /// Loader running `factory` on first use.
    pub fn new<F>(code: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Arc<dyn RendererKind> + Send + Sync + 'static,
    {
        Self {
            code: code.into(),
            factory: Box::new(factory),
            loaded: OnceLock::new(),
        }
    }

    /// Loader for an implementation that already exists.
    pub fn ready(kind: Arc<dyn RendererKind>) -> Self {
        let loaded = OnceLock::new();
        let code = kind.code().to_string();
        let _ = loaded.set(Arc::clone(&kind));
        Self {
            code,
            factory: Box::new(move || Arc::clone(&kind)),
            loaded,
        }
    }

    /// Extra code for the implementation behind `target`, sharing its memoization.
    pub fn alias(code: impl Into<String>, target: Arc<Self>) -> Self {
        Self::new(code, move || target.load())
    }

    /// Code the loader is registered under.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Obtain the implementation, invoking the factory on first call only.
    pub fn load(&self) -> Arc<dyn RendererKind> {
        Arc::clone(self.loaded.get_or_init(|| {
            tracing::debug!(target: "renderer_registry", "loading renderer '{}'", self.code);
            (self.factory)()
        }))
    }

    /// Whether the factory has run.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded.get().is_some()
    }
}

impl fmt::Debug for RendererLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererLoader")
            .field("code", &self.code)
            .field("loaded", &self.is_loaded())
            .finish_non_exhaustive()
    }
}

/// Registration record: a loader and the family it belongs to.
#[derive(Debug, Clone)]
pub struct RendererProvider {
    /// Target family
    pub family: RendererFamily,
    /// Loader to append
    pub loader: Arc<RendererLoader>,
}

impl RendererProvider {
    /// Record for `loader` in `family`.
    pub fn new(family: RendererFamily, loader: RendererLoader) -> Self {
        Self {
            family,
            loader: Arc::new(loader),
        }
    }
}
