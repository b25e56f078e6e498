//! Subscriber side of a cache entry.

use futures::Stream;
use std::sync::Arc;
use tokio::sync::watch;

use crate::core::{ExplorerError, Result};
use crate::metadata::{TargetData, Variant};

/// Value slot shared by the fetch task and all subscribers of one key.
#[derive(Debug, Clone)]
pub(crate) enum Slot {
    Pending,
    Ready(Arc<TargetData>),
    Failed(ExplorerError),
}

impl Slot {
    fn item(&self) -> Option<Result<Arc<TargetData>>> {
        match self {
            Self::Pending => None,
            Self::Ready(data) => Some(Ok(Arc::clone(data))),
            Self::Failed(error) => Some(Err(error.clone())),
        }
    }
}

/// Push stream of one `(target, variant)` cache entry.
///
/// The first [`TargetStream::next`] replays the most recent value if there is
/// one. Later calls wait for refreshed values. The stream ends with `None` once
/// the entry is retired or its fetch failed.
#[derive(Debug)]
pub struct TargetStream {
    target: String,
    variant: Option<Variant>,
    rx: watch::Receiver<Slot>,
    primed: bool,
}

impl TargetStream {
    pub(crate) const fn new(target: String, variant: Option<Variant>, rx: watch::Receiver<Slot>) -> Self {
        Self {
            target,
            variant,
            rx,
            primed: false,
        }
    }

    /// Target name of the entry.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Variant of the entry.
    #[must_use]
    pub const fn variant(&self) -> Option<Variant> {
        self.variant
    }

    /// Latest delivered value without waiting.
    #[must_use]
    pub fn latest(&self) -> Option<Arc<TargetData>> {
        match &*self.rx.borrow() {
            Slot::Ready(data) => Some(Arc::clone(data)),
            _ => None,
        }
    }

    /// Next value, or `None` when the entry has ended.
    pub async fn next(&mut self) -> Option<Result<Arc<TargetData>>> {
        if !self.primed {
            self.primed = true;
            let current = self.rx.borrow_and_update().item();
            if current.is_some() {
                return current;
            }
        }

        loop {
            if self.rx.changed().await.is_err() {
                return None;
            }
            let current = self.rx.borrow_and_update().item();
            if current.is_some() {
                return current;
            }
        }
    }

    /// Adapt into a [`Stream`].
    pub fn into_stream(self) -> impl Stream<Item = Result<Arc<TargetData>>> + Send {
        futures::stream::unfold(self, |mut stream| async move {
            let item = stream.next().await?;
            Some((item, stream))
        })
    }
}
