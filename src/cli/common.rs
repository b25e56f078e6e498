//! Engine wiring shared by the fixture-driven commands.

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::config::EngineConfig;
use crate::constants::FIXTURE_PATH_ENV;
use crate::renderer::{RendererFamily, RendererRegistry, RendererResolver, builtin};
use crate::resolver::CachedTargetResolver;
use crate::service::InMemoryExplorerService;

/// Fixture selection flag.
#[derive(Args, Debug, Clone)]
pub struct FixtureArgs {
    /// JSON fixture with "targets" and "rows"
    #[arg(long, env = FIXTURE_PATH_ENV, value_name = "FILE")]
    pub fixture: PathBuf,
}

/// Everything a command needs to render views.
pub struct EngineContext {
    /// Loaded configuration
    pub config: EngineConfig,
    /// Metadata cache over the fixture service
    pub cache: CachedTargetResolver<InMemoryExplorerService>,
    /// Renderer resolver over the configured registry
    pub resolver: Arc<RendererResolver>,
}

impl EngineContext {
    /// Load config and fixture and build the registry.
    ///
    /// Built-in column renderers use the configured display defaults, the
    /// default actions are registered, and config aliases are added last.
    pub fn load(config_path: Option<PathBuf>, fixture: &Path) -> Result<Self> {
        let config = EngineConfig::load_with_optional(config_path)?;
        let service = InMemoryExplorerService::from_path(fixture)
            .with_context(|| format!("Failed to load fixture {}", fixture.display()))?
            .with_default_limit(config.section.default_limit);
        Ok(Self::new(config, service))
    }

    /// Context over an already built service.
    #[must_use]
    pub fn new(config: EngineConfig, service: InMemoryExplorerService) -> Self {
        let mut registry = RendererRegistry::with_display(&config.display);
        registry.register(RendererFamily::Action, builtin::default_action_loaders());
        let unresolved = registry.register_aliases(&config.renderers);
        debug!(
            target: "renderer_registry",
            "{} section, {} object, {} action renderers ({} unresolved aliases)",
            registry.len(RendererFamily::Section),
            registry.len(RendererFamily::Object),
            registry.len(RendererFamily::Action),
            unresolved.len()
        );

        let resolver = RendererResolver::new(Arc::new(registry)).with_entities(config.entities.clone());
        Self {
            config,
            cache: CachedTargetResolver::new(service),
            resolver: Arc::new(resolver),
        }
    }
}
