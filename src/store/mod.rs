//! Document store abstraction
//!
//! Posts live in a remote document database. The views only need three
//! things from it: list a collection ordered by a field, get one document,
//! and update named fields on one document. Anything that can do those
//! implements [`DocumentStore`].

mod file;
mod firestore;
mod memory;

pub use file::JsonFileStore;
pub use firestore::FirestoreStore;
pub use memory::MemoryStore;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{StoreBackend, StoreConfig};
use crate::helpers::parse_timestamp;

/// Raw document fields as the store returns them
pub type Fields = Map<String, Value>;

/// One document read from a collection
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Get a field, treating an explicit `null` the same as a missing field
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field).filter(|v| !v.is_null())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Sort specification for listing a collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

impl OrderBy {
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Descending,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Ascending,
        }
    }
}

/// Errors raised by store backends
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store responded with {status}: {message}")]
    Status { status: u16, message: String },

    #[error("no document {id} in collection {collection}")]
    MissingDocument { collection: String, id: String },

    #[error("malformed document: {0}")]
    Decode(String),
}

/// The operations the blog needs from a document database
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// List every document in a collection, sorted by `order`
    async fn list(&self, collection: &str, order: &OrderBy) -> Result<Vec<Document>, StoreError>;

    /// Get a single document, `None` if it does not exist
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Overwrite the named fields of an existing document.
    ///
    /// Fails with [`StoreError::MissingDocument`] when there is no such document.
    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError>;
}

/// Build the configured store. Relative file paths resolve against `base_dir`.
pub fn open(config: &StoreConfig, base_dir: &Path) -> Result<Arc<dyn DocumentStore>> {
    let store: Arc<dyn DocumentStore> = match config.backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::File => Arc::new(JsonFileStore::new(base_dir.join(&config.path))),
        StoreBackend::Firestore => {
            let project_id = config
                .project_id
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("store.project_id is required for firestore"))?;
            let mut store = FirestoreStore::new(project_id, &config.database);
            if let Some(key) = &config.api_key {
                store = store.with_api_key(key);
            }
            if let Some(endpoint) = &config.endpoint {
                store = store.with_endpoint(endpoint);
            }
            Arc::new(store)
        }
    };
    tracing::debug!("Opened {:?} document store", config.backend);
    Ok(store)
}

/// Sort documents in place. Documents without the field go last either way.
pub(crate) fn sort_documents(docs: &mut [Document], order: &OrderBy) {
    docs.sort_by(|a, b| match (a.get(&order.field), b.get(&order.field)) {
        (Some(x), Some(y)) => {
            let ord = compare_values(x, y);
            match order.direction {
                Direction::Ascending => ord,
                Direction::Descending => ord.reverse(),
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
        return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
    }
    if let (Some(x), Some(y)) = (parse_timestamp(a), parse_timestamp(b)) {
        return x.cmp(&y);
    }
    match (a, b) {
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}
