//! Document store abstraction.
//!
//! The store is collection/key addressed JSON document storage with:
//!
//! - per-document atomic operations (`create` fails if the key exists,
//!   `update` fails if it does not, `delete` of a missing key is a no-op)
//! - equality and array-containment queries with multi-field ordering and
//!   limits
//! - field-level patches, including an atomic increment
//! - all-or-nothing batch commits
//! - a broadcast stream of [`DeleteEvent`]s consumed by the consistency
//!   worker
//!
//! [`MemoryStore`] is the shipped implementation; the trait seam exists so
//! tests can wrap or replace it.

mod memory;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::error::StoreError;
use crate::model::Document;

pub use memory::MemoryStore;

// =============================================================================
// DocumentStore Trait
// =============================================================================

/// Trait for collection/key addressed document storage.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document, or `None` if the key is absent.
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError>;

    /// Write a new document; fails with `AlreadyExists` if the key is taken.
    async fn create(&self, collection: &str, key: &str, doc: Document) -> Result<(), StoreError>;

    /// Write a document unconditionally (create or replace).
    async fn set(&self, collection: &str, key: &str, doc: Document) -> Result<(), StoreError>;

    /// Apply a patch to an existing document; fails with `NotFound` if the
    /// key is absent.
    async fn update(&self, collection: &str, key: &str, patch: Patch) -> Result<(), StoreError>;

    /// Delete a document. Deleting a missing key is a no-op; a successful
    /// deletion emits a [`DeleteEvent`].
    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError>;

    /// Run a filtered, ordered, limited query. Returns `(key, document)`
    /// pairs.
    async fn query(
        &self,
        collection: &str,
        query: Query,
    ) -> Result<Vec<(String, Document)>, StoreError>;

    /// Commit a batch atomically: either every operation applies or none
    /// does. Deletions inside the batch emit [`DeleteEvent`]s on success.
    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;

    /// Subscribe to the stream of delete events.
    fn subscribe_deletes(&self) -> broadcast::Receiver<DeleteEvent>;
}

// =============================================================================
// Queries
// =============================================================================

/// A single query predicate.
#[derive(Debug, Clone)]
pub enum Filter {
    /// Field equals value.
    Eq(String, Value),

    /// Array-valued field contains value.
    ArrayContains(String, Value),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq(field.into(), value.into())
    }

    pub fn array_contains(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::ArrayContains(field.into(), value.into())
    }
}

/// Sort direction for an order-by field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

/// A query: conjunction of filters, multi-field ordering, optional limit.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order_by: Vec<(String, Order)>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_asc(mut self, field: impl Into<String>) -> Self {
        self.order_by.push((field.into(), Order::Asc));
        self
    }

    pub fn order_desc(mut self, field: impl Into<String>) -> Self {
        self.order_by.push((field.into(), Order::Desc));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

// =============================================================================
// Patches
// =============================================================================

/// A single-field mutation.
#[derive(Debug, Clone)]
pub enum PatchOp {
    /// Set the field to a value.
    Set(Value),

    /// Add a delta to a numeric field. A missing field starts from 0;
    /// a non-numeric field is an `InvalidPatch` error.
    Increment(i64),
}

/// An ordered set of field mutations applied atomically to one document.
#[derive(Debug, Clone, Default)]
pub struct Patch {
    pub ops: Vec<(String, PatchOp)>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.ops.push((field.into(), PatchOp::Set(value.into())));
        self
    }

    pub fn increment(mut self, field: impl Into<String>, delta: i64) -> Self {
        self.ops.push((field.into(), PatchOp::Increment(delta)));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

// =============================================================================
// Batches
// =============================================================================

/// One operation inside a [`WriteBatch`].
#[derive(Debug, Clone)]
pub enum WriteOp {
    Create {
        collection: String,
        key: String,
        doc: Document,
    },
    Set {
        collection: String,
        key: String,
        doc: Document,
    },
    Update {
        collection: String,
        key: String,
        patch: Patch,
    },
    Delete {
        collection: String,
        key: String,
    },
}

/// An ordered set of write operations committed atomically.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    pub ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(mut self, collection: &str, key: &str, doc: Document) -> Self {
        self.ops.push(WriteOp::Create {
            collection: collection.to_string(),
            key: key.to_string(),
            doc,
        });
        self
    }

    pub fn set(mut self, collection: &str, key: &str, doc: Document) -> Self {
        self.ops.push(WriteOp::Set {
            collection: collection.to_string(),
            key: key.to_string(),
            doc,
        });
        self
    }

    pub fn update(mut self, collection: &str, key: &str, patch: Patch) -> Self {
        self.ops.push(WriteOp::Update {
            collection: collection.to_string(),
            key: key.to_string(),
            patch,
        });
        self
    }

    pub fn delete(mut self, collection: &str, key: &str) -> Self {
        self.ops.push(WriteOp::Delete {
            collection: collection.to_string(),
            key: key.to_string(),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }
}

// =============================================================================
// Delete Events
// =============================================================================

/// Broadcast by the store after a document deletion, whether it happened
/// through `delete` or inside a committed batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteEvent {
    pub collection: String,
    pub key: String,
}
