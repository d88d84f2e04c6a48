//! Bounded Enrichment Gate
//!
//! Hydrate calls are one extra request per row. Jira answers bursts of those
//! with 429s, so every hydrate call made through a connection goes through a
//! single fixed-size pool of slots.

use crate::error::{ConnectorError, Result};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Default number of concurrent hydrate calls per connection
pub const DEFAULT_MAX_CONCURRENCY: usize = 50;

/// Fixed-size pool shared by all hydrate calls of one connection
#[derive(Clone, Debug)]
pub struct HydrateGate {
    slots: Arc<Semaphore>,
    capacity: usize,
}

impl HydrateGate {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots not currently held by a running hydrate call
    pub fn available_slots(&self) -> usize {
        self.slots.available_permits()
    }

    /// Run one hydrate call inside a slot.
    ///
    /// Waits for a free slot, then runs `fetch`. The slot is released when the
    /// call finishes, whether it succeeded or not. There is no retry: the
    /// first outcome is final.
    pub async fn enrich<T, F, Fut>(&self, label: &str, fetch: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        tracing::trace!("{}: pending", label);
        let _slot = self
            .slots
            .acquire()
            .await
            .map_err(|_| ConnectorError::transport("hydrate pool closed"))?;

        tracing::trace!("{}: fetching", label);
        let result = fetch().await;
        match &result {
            Ok(_) => tracing::trace!("{}: enriched", label),
            Err(e) => tracing::warn!("{}: hydrate failed: {}", label, e),
        }
        result
    }
}

impl Default for HydrateGate {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONCURRENCY)
    }
}
