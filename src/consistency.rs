//! Cross-entity consistency worker.
//!
//! The store broadcasts a [`DeleteEvent`] for every document deletion. This
//! worker consumes that stream, detached from any request, and repairs the
//! two cross-collection invariants:
//!
//! - **User-deletion cascade**: deleting a user removes every virus and
//!   symptom that user authored, in one batch commit.
//! - **Symptom-deletion pruning**: deleting a symptom removes the first
//!   occurrence of its key from the `symptoms` list of every virus that
//!   references it, in one batch commit.
//!
//! The cascade's symptom deletions emit their own events, so a user
//! deletion chains into pruning without any coordination here.
//!
//! Each event is attempted a bounded number of times with exponential
//! backoff. Every attempt re-runs the queries, which makes retries
//! re-entrant (a virus deleted between attempts simply no longer matches)
//! and redelivery idempotent (no matches, nothing committed). After the
//! final failed attempt the event is logged at error level and dropped.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, error, warn};

use crate::error::StoreError;
use crate::model::collections;
use crate::store::{DeleteEvent, DocumentStore, Filter, Patch, Query, WriteBatch};

/// Default attempt budget per event.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default backoff before the second attempt; doubles per attempt.
pub const DEFAULT_BASE_BACKOFF: Duration = Duration::from_millis(100);

/// Consumes delete events and maintains cross-entity invariants.
pub struct ConsistencyWorker<S: DocumentStore> {
    store: Arc<S>,
    events: broadcast::Receiver<DeleteEvent>,
    max_attempts: u32,
    base_backoff: Duration,
}

impl<S: DocumentStore> ConsistencyWorker<S> {
    /// Subscribe to the store's delete stream with default retry settings.
    pub fn new(store: Arc<S>) -> Self {
        Self::with_retry(store, DEFAULT_MAX_ATTEMPTS, DEFAULT_BASE_BACKOFF)
    }

    pub fn with_retry(store: Arc<S>, max_attempts: u32, base_backoff: Duration) -> Self {
        let events = store.subscribe_deletes();
        Self {
            store,
            events,
            max_attempts,
            base_backoff,
        }
    }

    /// Run until the store's event channel closes.
    ///
    /// Intended to be spawned as a detached task at startup.
    pub async fn run(mut self) {
        loop {
            match self.events.recv().await {
                Ok(event) => self.handle_event(&event).await,
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    // Skipped events stay unrepaired until the next
                    // overlapping deletion; bounded by channel capacity.
                    warn!(missed, "consistency worker lagged behind delete stream");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        debug!("delete stream closed, consistency worker stopping");
    }

    /// Process every event currently queued, then return.
    ///
    /// Events emitted by this worker's own batch commits (cascade into
    /// pruning) are queued behind the current one and drain in the same
    /// call. Used by tests for deterministic settling.
    pub async fn drain(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(event) => self.handle_event(&event).await,
                Err(broadcast::error::TryRecvError::Lagged(missed)) => {
                    warn!(missed, "consistency worker lagged behind delete stream");
                }
                Err(_) => break,
            }
        }
    }

    async fn handle_event(&self, event: &DeleteEvent) {
        match event.collection.as_str() {
            collections::USERS => {
                self.with_retry_loop("user cascade", &event.key, |key| {
                    let store = Arc::clone(&self.store);
                    async move { cascade_user_content(store.as_ref(), &key).await }
                })
                .await;
            }
            collections::SYMPTOMS => {
                self.with_retry_loop("symptom prune", &event.key, |key| {
                    let store = Arc::clone(&self.store);
                    async move { prune_symptom_references(store.as_ref(), &key).await }
                })
                .await;
            }
            // Virus and quiz deletions need no repair
            _ => {}
        }
    }

    async fn with_retry_loop<F, Fut>(&self, procedure: &str, key: &str, mut op: F)
    where
        F: FnMut(String) -> Fut,
        Fut: std::future::Future<Output = Result<usize, StoreError>>,
    {
        let mut backoff = self.base_backoff;
        for attempt in 1..=self.max_attempts {
            match op(key.to_string()).await {
                Ok(affected) => {
                    debug!(procedure, key, affected, attempt, "consistency repair done");
                    return;
                }
                Err(e) if attempt < self.max_attempts => {
                    warn!(
                        procedure,
                        key,
                        attempt,
                        error = %e,
                        "consistency repair failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
                Err(e) => {
                    error!(
                        procedure,
                        key,
                        attempts = self.max_attempts,
                        error = %e,
                        "consistency repair failed, dropping event"
                    );
                }
            }
        }
    }
}

/// Delete every virus and symptom authored by the given user, in one batch.
///
/// Returns the number of documents deleted. The symptom deletions emit
/// their own events.
async fn cascade_user_content<S: DocumentStore>(
    store: &S,
    username: &str,
) -> Result<usize, StoreError> {
    let authored = Query::new().filter(Filter::eq("createdBy", username));

    let viruses = store.query(collections::VIRUSES, authored.clone()).await?;
    let symptoms = store.query(collections::SYMPTOMS, authored).await?;

    let mut batch = WriteBatch::new();
    for (key, _) in &viruses {
        batch = batch.delete(collections::VIRUSES, key);
    }
    for (key, _) in &symptoms {
        batch = batch.delete(collections::SYMPTOMS, key);
    }

    let affected = batch.len();
    if affected > 0 {
        store.commit(batch).await?;
    }
    Ok(affected)
}

/// Remove the first occurrence of a deleted symptom key from every virus
/// that references it, in one batch.
///
/// Returns the number of viruses updated.
async fn prune_symptom_references<S: DocumentStore>(
    store: &S,
    symptom: &str,
) -> Result<usize, StoreError> {
    let referencing = store
        .query(
            collections::VIRUSES,
            Query::new().filter(Filter::array_contains("symptoms", symptom)),
        )
        .await?;

    let mut batch = WriteBatch::new();
    for (key, doc) in &referencing {
        let current: Vec<serde_json::Value> = doc
            .get("symptoms")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();
        let pruned = remove_first_occurrence(current, symptom);
        batch = batch.update(
            collections::VIRUSES,
            key,
            Patch::new().set("symptoms", serde_json::Value::Array(pruned)),
        );
    }

    let affected = batch.len();
    if affected > 0 {
        store.commit(batch).await?;
    }
    Ok(affected)
}

/// First-match removal: exactly one occurrence of the item is dropped.
fn remove_first_occurrence(
    mut items: Vec<serde_json::Value>,
    item: &str,
) -> Vec<serde_json::Value> {
    if let Some(index) = items.iter().position(|v| v.as_str() == Some(item)) {
        items.remove(index);
    }
    items
}

// =============================================================================
// Tests
// =============================================================================
