//! Cached target resolution
//!
//! [`CachedTargetResolver`] wraps an [`ExplorerService`] and caches
//! `get_target` results per `(target, variant)` key.
//!
//! # Key States
//!
//! - **Pending**: a fetch is in flight; every caller joins it
//! - **Ready**: the value is stored; callers get it without fetching
//! - **Failed**: the fetch failed; waiters receive the error, the entry is
//!   dropped and the next call fetches again
//!
//! Each key has at most one fetch in flight. The fetch runs in its own task so
//! that callers losing interest never cancel it.
//!
//! # Retirement
//!
//! Ready entries live until [`CachedTargetResolver::retire`]. Retiring ends
//! every stream of the key (after delivering a pending fetch's outcome) and the
//! next call starts a new fetch.
//!
//! # Example
//!
//! ```rust,no_run
//! use explorer_engine::metadata::Variant;
//! use explorer_engine::resolver::CachedTargetResolver;
//! use explorer_engine::service::InMemoryExplorerService;
//!
//! # async fn example() -> explorer_engine::core::Result<()> {
//! let service = InMemoryExplorerService::from_path("fixture.json".as_ref())?;
//! let cache = CachedTargetResolver::new(service);
//!
//! let (a, b) = tokio::join!(
//!     cache.resolve("MediaEntity", Some(Variant::Section)),
//!     cache.resolve("MediaEntity", Some(Variant::Section)),
//! );
//! assert!(std::sync::Arc::ptr_eq(&a?, &b?));
//! assert_eq!(cache.stats().fetches, 1);
//! # Ok(())
//! # }
//! ```

mod stream;

pub use stream::TargetStream;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::core::{ExplorerError, Result};
use crate::metadata::{TargetData, Variant};
use crate::service::ExplorerService;
use stream::Slot;

type CacheKey = (String, Option<Variant>);
type SlotSender = Arc<watch::Sender<Slot>>;

/// Snapshot of cache activity counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Fetches started against the service
    pub fetches: u64,
    /// Calls answered from a Ready entry
    pub hits: u64,
    /// Calls that joined an in-flight fetch
    pub joins: u64,
}

#[derive(Debug, Default)]
struct Counters {
    fetches: AtomicU64,
    hits: AtomicU64,
    joins: AtomicU64,
}

/// Single-flight, replaying cache over [`ExplorerService::get_target`].
pub struct CachedTargetResolver<S> {
    service: Arc<S>,
    entries: Arc<DashMap<CacheKey, SlotSender>>,
    counters: Arc<Counters>,
}

impl<S> Clone for CachedTargetResolver<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            entries: Arc::clone(&self.entries),
            counters: Arc::clone(&self.counters),
        }
    }
}

impl<S: ExplorerService> CachedTargetResolver<S> {
    /// Cache over `service`.
    pub fn new(service: S) -> Self {
        Self::from_arc(Arc::new(service))
    }

    /// Cache over a shared service.
    pub fn from_arc(service: Arc<S>) -> Self {
        Self {
            service,
            entries: Arc::new(DashMap::new()),
            counters: Arc::new(Counters::default()),
        }
    }

    /// The wrapped service.
    #[must_use]
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Stream of the `(target, variant)` entry, starting a fetch if none is
    /// stored or in flight.
    ///
    /// Must be called within a tokio runtime.
    pub fn subscribe(&self, target: &str, variant: Option<Variant>) -> TargetStream {
        let key: CacheKey = (target.to_string(), variant);

        let sender = match self.entries.entry(key.clone()) {
            Entry::Occupied(mut entry) => {
                let state = match &*entry.get().borrow() {
                    Slot::Ready(_) => Some(&self.counters.hits),
                    Slot::Pending => Some(&self.counters.joins),
                    Slot::Failed(_) => None,
                };
                match state {
                    Some(counter) => {
                        counter.fetch_add(1, Ordering::Relaxed);
                        Arc::clone(entry.get())
                    }
                    None => {
                        let sender = self.start_fetch(&key);
                        entry.insert(Arc::clone(&sender));
                        sender
                    }
                }
            }
            Entry::Vacant(entry) => {
                let sender = self.start_fetch(&key);
                entry.insert(Arc::clone(&sender));
                sender
            }
        };

        TargetStream::new(key.0, key.1, sender.subscribe())
    }

    /// First value of the entry.
    ///
    /// Ready entries answer without suspending.
    ///
    /// # Errors
    ///
    /// [`ExplorerError::FetchFailed`] when the fetch this call waited on failed.
    pub async fn resolve(&self, target: &str, variant: Option<Variant>) -> Result<Arc<TargetData>> {
        let mut stream = self.subscribe(target, variant);
        match stream.next().await {
            Some(outcome) => outcome,
            None => Err(ExplorerError::FetchFailed {
                target: target.to_string(),
                reason: "entry ended before a value was delivered".to_string(),
            }),
        }
    }

    /// Stored value of a Ready entry, never fetching.
    #[must_use]
    pub fn cached(&self, target: &str, variant: Option<Variant>) -> Option<Arc<TargetData>> {
        let entry = self.entries.get(&(target.to_string(), variant))?;
        match &*entry.value().borrow() {
            Slot::Ready(data) => Some(Arc::clone(data)),
            _ => None,
        }
    }

    /// Fetch a Ready entry again and push the new value to its subscribers.
    ///
    /// Keys without a Ready entry are resolved normally.
    ///
    /// # Errors
    ///
    /// [`ExplorerError::FetchFailed`] when the fetch fails; the stored value is kept.
    pub async fn refresh(&self, target: &str, variant: Option<Variant>) -> Result<Arc<TargetData>> {
        let key: CacheKey = (target.to_string(), variant);
        let sender = self
            .entries
            .get(&key)
            .map(|entry| Arc::clone(entry.value()))
            .filter(|sender| matches!(&*sender.borrow(), Slot::Ready(_)));
        let Some(sender) = sender else {
            return self.resolve(target, variant).await;
        };

        self.counters.fetches.fetch_add(1, Ordering::Relaxed);
        debug!(target: "target_cache", "refreshing {target} ({variant:?})");
        let data = self
            .service
            .get_target(target, variant)
            .await
            .map(Arc::new)
            .map_err(|error| fetch_failed(target, error))?;

        let current = self.entries.get(&key).is_some_and(|entry| Arc::ptr_eq(entry.value(), &sender));
        if current {
            sender.send_replace(Slot::Ready(Arc::clone(&data)));
        }
        Ok(data)
    }

    /// End the entry's life; returns whether one existed.
    pub fn retire(&self, target: &str, variant: Option<Variant>) -> bool {
        let removed = self.entries.remove(&(target.to_string(), variant)).is_some();
        if removed {
            debug!(target: "target_cache", "retired {target} ({variant:?})");
        }
        removed
    }

    /// Retire every entry; returns how many there were.
    pub fn retire_all(&self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        debug!(target: "target_cache", "retired {count} entries");
        count
    }

    /// Number of stored or in-flight entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entry is stored or in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Activity counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            fetches: self.counters.fetches.load(Ordering::Relaxed),
            hits: self.counters.hits.load(Ordering::Relaxed),
            joins: self.counters.joins.load(Ordering::Relaxed),
        }
    }

    fn start_fetch(&self, key: &CacheKey) -> SlotSender {
        let (sender, _) = watch::channel(Slot::Pending);
        let sender = Arc::new(sender);
        let fetches = self.counters.fetches.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(target: "target_cache", "fetching {} ({:?}), fetch #{fetches}", key.0, key.1);

        let service = Arc::clone(&self.service);
        let entries = Arc::clone(&self.entries);
        let task_sender = Arc::clone(&sender);
        let key = key.clone();

        tokio::spawn(async move {
            let fetch = AssertUnwindSafe(service.get_target(&key.0, key.1)).catch_unwind().await;
            let slot = match fetch {
                Ok(Ok(data)) => Slot::Ready(Arc::new(data)),
                Ok(Err(error)) => Slot::Failed(fetch_failed(&key.0, error)),
                Err(_) => Slot::Failed(ExplorerError::FetchFailed {
                    target: key.0.clone(),
                    reason: "fetch task panicked".to_string(),
                }),
            };

            if let Slot::Failed(error) = &slot {
                warn!(target: "target_cache", "{error}");
                entries.remove_if(&key, |_, current| Arc::ptr_eq(current, &task_sender));
            }
            task_sender.send_replace(slot);
        });

        sender
    }
}

fn fetch_failed(target: &str, error: ExplorerError) -> ExplorerError {
    match error {
        ExplorerError::FetchFailed { .. } => error,
        other => ExplorerError::FetchFailed {
            target: target.to_string(),
            reason: other.to_string(),
        },
    }
}
