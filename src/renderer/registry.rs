//! Per-family renderer loader lists.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

use super::builtin;
use super::{RendererFamily, RendererLoader, RendererProvider};
use crate::config::DisplayConfig;
use crate::metadata::Variant;

/// Registered renderer loaders of all three families.
///
/// Registration appends and never replaces. Lookup is a linear scan where the
/// first loader with a matching code wins, so built-ins registered at
/// construction shadow later registrations of the same code.
///
/// Built once at startup and shared behind [`Arc`]; lookups never mutate.
#[derive(Debug)]
pub struct RendererRegistry {
    section: Vec<Arc<RendererLoader>>,
    object: Vec<Arc<RendererLoader>>,
    action: Vec<Arc<RendererLoader>>,
    section_fallback: Arc<RendererLoader>,
    object_fallback: Arc<RendererLoader>,
}

impl RendererRegistry {
    /// Registry without any registered loader.
    #[must_use]
    pub fn new() -> Self {
        Self {
            section: Vec::new(),
            object: Vec::new(),
            action: Vec::new(),
            section_fallback: Arc::new(builtin::string_loader(Variant::Section)),
            object_fallback: Arc::new(builtin::string_loader(Variant::Object)),
        }
    }

    /// Registry with the built-in section and object renderers.
    #[must_use]
    pub fn with_builtins() -> Self {
        Self::with_display(&DisplayConfig::default())
    }

    /// Built-in renderers using `display` for their default parameters.
    #[must_use]
    pub fn with_display(display: &DisplayConfig) -> Self {
        let mut registry = Self::new();
        registry.register(RendererFamily::Section, builtin::column_loaders(Variant::Section, display));
        registry.register(RendererFamily::Object, builtin::column_loaders(Variant::Object, display));
        registry
    }

    /// Append `loaders` to `family`.
    pub fn register<I>(&mut self, family: RendererFamily, loaders: I) -> &mut Self
    where
        I: IntoIterator<Item = RendererLoader>,
    {
        for loader in loaders {
            self.push(family, Arc::new(loader));
        }
        self
    }

    /// Append each provider's loader to its family.
    pub fn register_providers<I>(&mut self, providers: I) -> &mut Self
    where
        I: IntoIterator<Item = RendererProvider>,
    {
        for provider in providers {
            self.push(provider.family, provider.loader);
        }
        self
    }

    /// Register `alias -> code` pairs in every family that knows `code`.
    ///
    /// Returns the aliases whose code is registered nowhere.
    pub fn register_aliases(&mut self, aliases: &BTreeMap<String, String>) -> Vec<String> {
        let mut unresolved = Vec::new();
        for (alias, code) in aliases {
            let mut registered = false;
            for family in [RendererFamily::Section, RendererFamily::Object, RendererFamily::Action] {
                if let Some(target) = self.find(family, code) {
                    self.push(family, Arc::new(RendererLoader::alias(alias.clone(), target)));
                    registered = true;
                }
            }
            if !registered {
                warn!(target: "renderer_registry", "renderer alias '{alias}' points at unknown code '{code}'");
                unresolved.push(alias.clone());
            }
        }
        unresolved
    }

    /// First loader of `family` registered under `code`.
    #[must_use]
    pub fn find(&self, family: RendererFamily, code: &str) -> Option<Arc<RendererLoader>> {
        self.loaders(family).iter().find(|loader| loader.code() == code).cloned()
    }

    /// Codes of `family` in registration order, duplicates included.
    #[must_use]
    pub fn codes(&self, family: RendererFamily) -> Vec<&str> {
        self.loaders(family).iter().map(|loader| loader.code()).collect()
    }

    /// Generic string renderer for `variant`.
    ///
    /// Prefers a registered string renderer and falls back to a private
    /// built-in copy, so this always yields a loader.
    #[must_use]
    pub fn fallback(&self, variant: Variant) -> Arc<RendererLoader> {
        let family = RendererFamily::for_variant(variant);
        let private = match variant {
            Variant::Section => &self.section_fallback,
            Variant::Object => &self.object_fallback,
        };
        self.find(family, private.code()).unwrap_or_else(|| Arc::clone(private))
    }

    /// Number of loaders registered in `family`.
    #[must_use]
    pub fn len(&self, family: RendererFamily) -> usize {
        self.loaders(family).len()
    }

    /// Whether no family has any loader.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.section.is_empty() && self.object.is_empty() && self.action.is_empty()
    }

    fn loaders(&self, family: RendererFamily) -> &[Arc<RendererLoader>] {
        match family {
            RendererFamily::Section => &self.section,
            RendererFamily::Object => &self.object,
            RendererFamily::Action => &self.action,
        }
    }

    fn push(&mut self, family: RendererFamily, loader: Arc<RendererLoader>) {
        debug!(target: "renderer_registry", "registering {family} renderer '{}'", loader.code());
        match family {
            RendererFamily::Section => self.section.push(loader),
            RendererFamily::Object => self.object.push(loader),
            RendererFamily::Action => self.action.push(loader),
        }
    }
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
