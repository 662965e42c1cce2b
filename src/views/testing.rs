//! Test doubles for the views

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::store::{Document, DocumentStore, Fields, MemoryStore, OrderBy, StoreError};

/// Wraps a [`MemoryStore`] and rejects reads and/or writes on demand
pub struct FailingStore {
    inner: MemoryStore,
    fail_reads: AtomicBool,
    fail_updates: AtomicBool,
}

impl Default for FailingStore {
    /// A store where every call fails
    fn default() -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_reads: AtomicBool::new(true),
            fail_updates: AtomicBool::new(true),
        }
    }
}

impl FailingStore {
    /// Reads succeed against `inner`, updates fail
    pub fn rejecting_updates(inner: MemoryStore) -> Self {
        Self {
            inner,
            fail_reads: AtomicBool::new(false),
            fail_updates: AtomicBool::new(true),
        }
    }

    pub fn set_fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    fn unavailable() -> StoreError {
        StoreError::Status {
            status: 503,
            message: "store unavailable".to_string(),
        }
    }
}

#[async_trait]
impl DocumentStore for FailingStore {
    async fn list(&self, collection: &str, order: &OrderBy) -> Result<Vec<Document>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.inner.list(collection, order).await
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.inner.get(collection, id).await
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.inner.update(collection, id, fields).await
    }
}

/// Build a document from a JSON object literal
pub fn doc(id: &str, fields: serde_json::Value) -> Document {
    Document::new(id, fields.as_object().cloned().unwrap_or_default())
}
