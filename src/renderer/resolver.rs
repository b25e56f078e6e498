//! Column and action descriptor to renderer loader.
//!
//! Columns resolve in three steps:
//!
//! 1. An explicit renderer code in the column's context for the view, looked
//!    up by exact match
//! 2. Without an explicit code, a default code derived from the column type;
//!    references are told apart by the referenced entity name
//! 3. Anything not found falls back to the generic string renderer with a
//!    single warning
//!
//! Column resolution never fails. Actions resolve by exact code only and are
//! skipped when missing.

use std::sync::Arc;
use tracing::{trace, warn};

use super::{RendererFamily, RendererLoader, RendererRegistry};
use crate::config::EntityNames;
use crate::constants::{
    BOOLEAN_OBJECT_RENDERER, BOOLEAN_SECTION_RENDERER, DATE_OBJECT_RENDERER, DATE_SECTION_RENDERER,
    LOCALIZED_MEDIA_OBJECT_RENDERER, LOCALIZED_MEDIA_SECTION_RENDERER,
    LOCALIZED_STRING_OBJECT_RENDERER, LOCALIZED_STRING_SECTION_RENDERER, MEDIA_OBJECT_RENDERER,
    MEDIA_SECTION_RENDERER, REFERENCE_OBJECT_RENDERER, REFERENCE_SECTION_RENDERER,
    STRING_OBJECT_RENDERER, STRING_SECTION_RENDERER, SUGGESTION_MAX_DISTANCE,
};
use crate::metadata::{ColumnType, ExplorerAction, ExplorerColumn, Variant};

/// How a column's renderer was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    /// The column named the code
    Explicit,
    /// Derived from the column type
    TypeDefault,
    /// Last-resort generic string renderer
    Fallback,
}

/// Outcome of column resolution.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Loader to instantiate
    pub loader: Arc<RendererLoader>,
    /// Code of the loader
    pub code: String,
    /// How it was chosen
    pub source: ResolutionSource,
}

impl Resolution {
    fn new(loader: Arc<RendererLoader>, source: ResolutionSource) -> Self {
        Self {
            code: loader.code().to_string(),
            loader,
            source,
        }
    }
}

/// Picks renderer loaders for descriptors.
#[derive(Debug, Clone)]
pub struct RendererResolver {
    registry: Arc<RendererRegistry>,
    entities: EntityNames,
}

impl RendererResolver {
    /// Resolver over `registry` with default special entity names.
    #[must_use]
    pub fn new(registry: Arc<RendererRegistry>) -> Self {
        Self {
            registry,
            entities: EntityNames::default(),
        }
    }

    /// Use `entities` to tell media and localized references apart.
    #[must_use]
    pub fn with_entities(mut self, entities: EntityNames) -> Self {
        self.entities = entities;
        self
    }

    /// The underlying registry.
    #[must_use]
    pub fn registry(&self) -> &RendererRegistry {
        &self.registry
    }

    /// Type-derived renderer code of `column` in `variant`.
    ///
    /// # Errors
    ///
    /// Returns the unrecognized type name for [`ColumnType::Other`].
    pub fn default_code<'a>(&self, column: &'a ExplorerColumn, variant: Variant) -> Result<&'static str, &'a str> {
        let section = variant == Variant::Section;
        let pick = |section_code, object_code| if section { section_code } else { object_code };

        let code = match &column.column_type {
            ColumnType::Boolean => pick(BOOLEAN_SECTION_RENDERER, BOOLEAN_OBJECT_RENDERER),
            ColumnType::Date => pick(DATE_SECTION_RENDERER, DATE_OBJECT_RENDERER),
            ColumnType::Reference => match column.referenced_entity_name.as_deref() {
                Some(name) if name == self.entities.media => pick(MEDIA_SECTION_RENDERER, MEDIA_OBJECT_RENDERER),
                Some(name) if name == self.entities.localized_string => {
                    pick(LOCALIZED_STRING_SECTION_RENDERER, LOCALIZED_STRING_OBJECT_RENDERER)
                }
                Some(name) if name == self.entities.localized_media => {
                    pick(LOCALIZED_MEDIA_SECTION_RENDERER, LOCALIZED_MEDIA_OBJECT_RENDERER)
                }
                _ => pick(REFERENCE_SECTION_RENDERER, REFERENCE_OBJECT_RENDERER),
            },
            ColumnType::String | ColumnType::Number | ColumnType::Unknown => {
                pick(STRING_SECTION_RENDERER, STRING_OBJECT_RENDERER)
            }
            ColumnType::Other(name) => return Err(name.as_str()),
        };
        Ok(code)
    }

    /// Renderer for `column` in `variant`. Always yields a loader.
    #[must_use]
    pub fn resolve_column(&self, column: &ExplorerColumn, variant: Variant) -> Resolution {
        let family = RendererFamily::for_variant(variant);

        if let Some(code) = column.context(variant).renderer_code() {
            if let Some(loader) = self.registry.find(family, code) {
                trace!(target: "renderer_resolver", "column '{}' uses explicit {family} renderer '{code}'", column.property);
                return Resolution::new(loader, ResolutionSource::Explicit);
            }
            warn!(
                target: "renderer_resolver",
                "No {family} renderer '{code}' for column '{}'{}; using the string renderer",
                column.property,
                self.suggestion(family, code)
            );
            return self.fallback(variant);
        }

        match self.default_code(column, variant) {
            Ok(code) => {
                if let Some(loader) = self.registry.find(family, code) {
                    return Resolution::new(loader, ResolutionSource::TypeDefault);
                }
                warn!(
                    target: "renderer_resolver",
                    "No {family} renderer '{code}' registered for {} column '{}'; using the string renderer",
                    column.column_type,
                    column.property
                );
            }
            Err(type_name) => {
                warn!(
                    target: "renderer_resolver",
                    "Unrecognized type '{type_name}' of column '{}'; using the string renderer",
                    column.property
                );
            }
        }
        self.fallback(variant)
    }

    /// Renderer for `action`, or `None` when no action renderer has its code.
    #[must_use]
    pub fn resolve_action(&self, action: &ExplorerAction) -> Option<Arc<RendererLoader>> {
        let loader = self.registry.find(RendererFamily::Action, &action.code);
        if loader.is_none() {
            warn!(
                target: "renderer_resolver",
                "No action renderer '{}'{}; skipping the action",
                action.code,
                self.suggestion(RendererFamily::Action, &action.code)
            );
        }
        loader
    }

    fn fallback(&self, variant: Variant) -> Resolution {
        Resolution::new(self.registry.fallback(variant), ResolutionSource::Fallback)
    }

    /// `" (did you mean 'x'?)"` for the closest registered code, if close enough.
    fn suggestion(&self, family: RendererFamily, code: &str) -> String {
        self.registry
            .codes(family)
            .into_iter()
            .map(|candidate| (strsim::levenshtein(code, candidate), candidate))
            .filter(|(distance, _)| *distance <= SUGGESTION_MAX_DISTANCE)
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, candidate)| format!(" (did you mean '{candidate}'?)"))
            .unwrap_or_default()
    }
}
