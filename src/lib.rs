//! Explorer Engine - metadata-driven admin panels
//!
//! The engine behind a generated admin panel: it turns backend metadata about
//! each entity kind ("target") into list views and detail views by picking,
//! loading and hosting renderers, while caching target metadata and encoding
//! list-view search criteria into a compact URL-safe token.
//!
//! # Architecture Overview
//!
//! ```text
//!   ExplorerService (backend)        EngineConfig (~/.explorer/config.toml)
//!          |                                  |
//!   CachedTargetResolver  ---- TargetData ----+
//!          |                                  |
//!   SectionView / ObjectView  <- RendererResolver <- RendererRegistry
//!          |
//!   ColumnRendererHost / ActionRendererHost -> Renderer children
//! ```
//!
//! ## Key Features
//!
//! - **Single-flight metadata cache**: one fetch per `(target, variant)`, replayed to late subscribers
//! - **Type-driven renderer selection**: explicit codes, type defaults, string fallback
//! - **Lazy renderer loading**: renderer kinds load on first use and are memoized
//! - **Filter DSL**: `::name:value` tokens with substring, date range and reference forms
//!
//! # Core Modules
//!
//! - [`metadata`] - Target, column, tab and action descriptors
//! - [`filter`] - Filter token codec and row matching
//! - [`renderer`] - Renderer traits, registry, resolver and built-in renderers
//! - [`resolver`] - Cached, single-flight target resolution
//! - [`host`] - Renderer hosts and the list/detail views built from them
//! - [`service`] - Backend capability trait and the in-memory fixture service
//!
//! ## Supporting Modules
//! - [`config`] - Engine configuration (entity names, display, renderer aliases)
//! - [`core`] - Error types and user-facing error formatting
//! - [`constants`] - Renderer codes, action codes and entity names
//! - [`cli`] - The `explorer` preview binary
//!
//! # Command-Line Usage
//!
//! ```bash
//! # Encode and decode filter tokens
//! explorer filter encode status=true owner=ann --contains owner --ref owner=UserEntity.login
//! explorer filter decode '::status:true::owner:%ann%{UserEntity.login}'
//!
//! # Inspect renderer resolution of a target
//! explorer resolve --fixture fixture.json TaskEntity --variant object
//!
//! # Render a list view and a detail view
//! explorer list --fixture fixture.json TaskEntity --filter '::done:false' --sort title
//! explorer show --fixture fixture.json TaskEntity 1
//! ```

// Core functionality modules
pub mod config;
pub mod constants;
pub mod core;
pub mod filter;
pub mod metadata;

// Rendering and resolution
pub mod host;
pub mod renderer;
pub mod resolver;
pub mod service;

// Preview binary
pub mod cli;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
