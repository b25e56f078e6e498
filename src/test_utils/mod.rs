//! Test utilities for the explorer engine
//!
//! - [`init_test_logging`] installs a test-friendly tracing subscriber once
//! - [`CountingService`] wraps a service, counts calls, and can hold or fail fetches
//! - [`WarningCounter`] records `WARN` events emitted while it is installed
//! - [`sample_fixture`] / [`sample_service`] provide a small user/task/media data set
//!
//! # Example
//!
//! ```rust,no_run
//! use explorer_engine::resolver::CachedTargetResolver;
//! use explorer_engine::test_utils::{CountingService, sample_service};
//!
//! # async fn example() {
//! let cache = CachedTargetResolver::new(CountingService::gated(sample_service()));
//! let pending = cache.subscribe("UserEntity", None);
//! cache.service().open_gate();
//! # drop(pending);
//! # }
//! ```

use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once, PoisonError};
use tokio::sync::watch;
use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

use crate::core::{ExplorerError, Result};
use crate::metadata::{TargetData, Variant};
use crate::service::{ExplorerService, Fixture, InMemoryExplorerService, PageableData, PageableParams};

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// JSON text of the sample data set.
pub const SAMPLE_FIXTURE: &str = include_str!("../../tests/fixtures/explorer.json");

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` when given, otherwise
/// `RUST_LOG`; with neither, nothing is installed.
///
/// ```bash
/// RUST_LOG=target_cache=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}

/// The sample data set: `UserEntity`, `TaskEntity` and `MediaEntity`.
///
/// # Panics
///
/// If the bundled fixture is not valid JSON.
#[must_use]
pub fn sample_fixture() -> Fixture {
    serde_json::from_str(SAMPLE_FIXTURE).expect("bundled fixture is valid")
}

/// In-memory service over [`sample_fixture`].
///
/// # Panics
///
/// If the bundled fixture violates a target invariant.
#[must_use]
pub fn sample_service() -> InMemoryExplorerService {
    InMemoryExplorerService::from_fixture(sample_fixture()).expect("bundled fixture is consistent")
}

/// Service wrapper counting calls, with a gate holding `get_target` and
/// injectable failures.
#[derive(Debug)]
pub struct CountingService<S> {
    inner: S,
    target_calls: AtomicUsize,
    list_calls: AtomicUsize,
    failures: AtomicUsize,
    gate: watch::Sender<bool>,
}

impl<S: ExplorerService> CountingService<S> {
    /// Wrapper with an open gate.
    pub fn new(inner: S) -> Self {
        Self::with_gate(inner, true)
    }

    /// Wrapper whose `get_target` calls wait until [`Self::open_gate`].
    pub fn gated(inner: S) -> Self {
        Self::with_gate(inner, false)
    }

    fn with_gate(inner: S, open: bool) -> Self {
        Self {
            inner,
            target_calls: AtomicUsize::new(0),
            list_calls: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
            gate: watch::Sender::new(open),
        }
    }

    /// Release every held and future `get_target` call.
    pub fn open_gate(&self) {
        self.gate.send_replace(true);
    }

    /// Hold future `get_target` calls again.
    pub fn close_gate(&self) {
        self.gate.send_replace(false);
    }

    /// Make the next `count` `get_target` calls fail.
    pub fn fail_next(&self, count: usize) {
        self.failures.store(count, Ordering::SeqCst);
    }

    /// `get_target` calls so far, including held ones.
    pub fn target_calls(&self) -> usize {
        self.target_calls.load(Ordering::SeqCst)
    }

    /// `get_section_list` calls so far.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// The wrapped service.
    pub const fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: ExplorerService> ExplorerService for CountingService<S> {
    async fn get_target(&self, target: &str, variant: Option<Variant>) -> Result<TargetData> {
        self.target_calls.fetch_add(1, Ordering::SeqCst);
        let mut gate = self.gate.subscribe();
        let _ = gate.wait_for(|open| *open).await;

        let failing = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failing {
            return Err(ExplorerError::FetchFailed {
                target: target.to_string(),
                reason: "injected failure".to_string(),
            });
        }
        self.inner.get_target(target, variant).await
    }

    async fn get_section_list(&self, target: &str, params: &PageableParams) -> Result<PageableData> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get_section_list(target, params).await
    }

    async fn get_entity(&self, target: &str, id: &str) -> Result<Value> {
        self.inner.get_entity(target, id).await
    }

    async fn save_entity(&self, entity: Value, target: &str, id: Option<&str>) -> Result<Value> {
        self.inner.save_entity(entity, target, id).await
    }

    async fn remove_entity(&self, target: &str, id: &str) -> Result<()> {
        self.inner.remove_entity(target, id).await
    }
}

/// Tracing layer recording the message of every `WARN` event.
#[derive(Debug, Clone, Default)]
pub struct WarningCounter {
    messages: Arc<Mutex<Vec<String>>>,
}

impl WarningCounter {
    /// Empty counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` with the counter installed as the thread's subscriber.
    pub fn capture<T>(&self, f: impl FnOnce() -> T) -> T {
        let subscriber = tracing_subscriber::registry().with(self.clone());
        tracing::subscriber::with_default(subscriber, f)
    }

    /// Install the counter as the thread's subscriber until the guard drops.
    ///
    /// Works for async tests on the current-thread runtime.
    #[must_use]
    pub fn install(&self) -> DefaultGuard {
        tracing::subscriber::set_default(tracing_subscriber::registry().with(self.clone()))
    }

    /// Warnings recorded so far.
    #[must_use]
    pub fn count(&self) -> usize {
        self.lock().len()
    }

    /// Messages of the recorded warnings.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        self.messages.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: Subscriber> Layer<S> for WarningCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() != Level::WARN {
            return;
        }
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.lock().push(visitor.0);
    }
}

#[derive(Default)]
struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.0 = value.to_string();
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}
