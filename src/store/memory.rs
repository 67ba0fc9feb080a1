//! In-memory document store.
//!
//! Collections are `BTreeMap`s of key to JSON document behind a single
//! `tokio::sync::RwLock`, so iteration order inside a collection is key
//! order. Batch commits stage against a copy of the state and swap it in,
//! which makes them all-or-nothing. Every successful deletion, standalone
//! or inside a batch, is broadcast as a [`DeleteEvent`].

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{broadcast, RwLock};

use crate::error::StoreError;
use crate::model::Document;

use super::{DeleteEvent, DocumentStore, Filter, Order, Patch, PatchOp, Query, WriteBatch, WriteOp};

/// Default capacity of the delete-event broadcast channel.
///
/// A consumer that lags behind by more than this many events loses the
/// oldest ones; the consistency worker logs and carries on when that
/// happens.
pub const DEFAULT_DELETE_CHANNEL_CAPACITY: usize = 256;

type State = HashMap<String, BTreeMap<String, Document>>;

/// In-memory [`DocumentStore`] implementation.
pub struct MemoryStore {
    state: RwLock<State>,
    deletes: broadcast::Sender<DeleteEvent>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_channel_capacity(DEFAULT_DELETE_CHANNEL_CAPACITY)
    }

    pub fn with_channel_capacity(capacity: usize) -> Self {
        let (deletes, _) = broadcast::channel(capacity);
        Self {
            state: RwLock::new(HashMap::new()),
            deletes,
        }
    }

    fn emit_delete(&self, collection: &str, key: &str) {
        // send() errs when there are no subscribers; that is fine.
        let _ = self.deletes.send(DeleteEvent {
            collection: collection.to_string(),
            key: key.to_string(),
        });
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .get(collection)
            .and_then(|docs| docs.get(key))
            .cloned())
    }

    async fn create(&self, collection: &str, key: &str, doc: Document) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let docs = state.entry(collection.to_string()).or_default();
        if docs.contains_key(key) {
            return Err(StoreError::AlreadyExists {
                collection: collection.to_string(),
                key: key.to_string(),
            });
        }
        docs.insert(key.to_string(), doc);
        Ok(())
    }

    async fn set(&self, collection: &str, key: &str, doc: Document) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), doc);
        Ok(())
    }

    async fn update(&self, collection: &str, key: &str, patch: Patch) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let doc = state
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(key))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                key: key.to_string(),
            })?;
        apply_patch(doc, &patch, collection, key)
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let removed = state
            .get_mut(collection)
            .and_then(|docs| docs.remove(key))
            .is_some();
        drop(state);

        if removed {
            self.emit_delete(collection, key);
        }
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        query: Query,
    ) -> Result<Vec<(String, Document)>, StoreError> {
        let state = self.state.read().await;
        let mut results: Vec<(String, Document)> = state
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, doc)| query.filters.iter().all(|f| matches_filter(doc, f)))
                    .map(|(key, doc)| (key.clone(), doc.clone()))
                    .collect()
            })
            .unwrap_or_default();
        drop(state);

        if !query.order_by.is_empty() {
            results.sort_by(|(_, a), (_, b)| compare_ordered(a, b, &query.order_by));
        }
        if let Some(limit) = query.limit {
            results.truncate(limit);
        }
        Ok(results)
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut state = self.state.write().await;

        // Stage against a copy so a failing operation leaves the live state
        // untouched.
        let mut staged = state.clone();
        let mut deleted: Vec<(String, String)> = Vec::new();

        for op in &batch.ops {
            match op {
                WriteOp::Create {
                    collection,
                    key,
                    doc,
                } => {
                    let docs = staged.entry(collection.clone()).or_default();
                    if docs.contains_key(key) {
                        return Err(StoreError::AlreadyExists {
                            collection: collection.clone(),
                            key: key.clone(),
                        });
                    }
                    docs.insert(key.clone(), doc.clone());
                }
                WriteOp::Set {
                    collection,
                    key,
                    doc,
                } => {
                    staged
                        .entry(collection.clone())
                        .or_default()
                        .insert(key.clone(), doc.clone());
                }
                WriteOp::Update {
                    collection,
                    key,
                    patch,
                } => {
                    let doc = staged
                        .get_mut(collection)
                        .and_then(|docs| docs.get_mut(key))
                        .ok_or_else(|| StoreError::NotFound {
                            collection: collection.clone(),
                            key: key.clone(),
                        })?;
                    apply_patch(doc, patch, collection, key)?;
                }
                WriteOp::Delete { collection, key } => {
                    let removed = staged
                        .get_mut(collection)
                        .and_then(|docs| docs.remove(key))
                        .is_some();
                    if removed {
                        deleted.push((collection.clone(), key.clone()));
                    }
                }
            }
        }

        *state = staged;
        drop(state);

        for (collection, key) in deleted {
            self.emit_delete(&collection, &key);
        }
        Ok(())
    }

    fn subscribe_deletes(&self) -> broadcast::Receiver<DeleteEvent> {
        self.deletes.subscribe()
    }
}

// =============================================================================
// Evaluation
// =============================================================================

fn matches_filter(doc: &Document, filter: &Filter) -> bool {
    match filter {
        Filter::Eq(field, value) => doc.get(field) == Some(value),
        Filter::ArrayContains(field, value) => doc
            .get(field)
            .and_then(Value::as_array)
            .map(|items| items.contains(value))
            .unwrap_or(false),
    }
}

fn compare_ordered(a: &Document, b: &Document, order_by: &[(String, Order)]) -> Ordering {
    for (field, order) in order_by {
        let va = a.get(field).unwrap_or(&Value::Null);
        let vb = b.get(field).unwrap_or(&Value::Null);
        let cmp = compare_values(va, vb);
        let cmp = match order {
            Order::Asc => cmp,
            Order::Desc => cmp.reverse(),
        };
        if cmp != Ordering::Equal {
            return cmp;
        }
    }
    Ordering::Equal
}

/// Compare two JSON values for ordering. Values of different types sort by
/// a fixed type rank (null < bool < number < string); a missing field is
/// treated as null by the caller.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn apply_patch(
    doc: &mut Document,
    patch: &Patch,
    collection: &str,
    key: &str,
) -> Result<(), StoreError> {
    for (field, op) in &patch.ops {
        match op {
            PatchOp::Set(value) => {
                doc.insert(field.clone(), value.clone());
            }
            PatchOp::Increment(delta) => {
                let current = match doc.get(field) {
                    None | Some(Value::Null) => 0,
                    Some(value) => value.as_i64().ok_or_else(|| StoreError::InvalidPatch {
                        collection: collection.to_string(),
                        key: key.to_string(),
                        message: format!("field '{}' is not an integer", field),
                    })?,
                };
                doc.insert(field.clone(), Value::from(current + delta));
            }
        }
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
