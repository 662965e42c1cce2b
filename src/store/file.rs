//! JSON file document store
//!
//! All collections live in a single JSON file shaped like
//! `{ "<collection>": { "<id>": { ...fields } } }`. The file is re-read on
//! every operation so edits made out-of-band show up on the next fetch.

use async_trait::async_trait;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

use super::{sort_documents, Document, DocumentStore, Fields, OrderBy, StoreError};

type Database = IndexMap<String, IndexMap<String, Fields>>;

/// Document store persisted to a JSON file on disk
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the database, an absent file reads as empty
    async fn load(&self) -> Result<Database, StoreError> {
        match fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(Database::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Database::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write via a sibling temp file so readers never see a torn file
    async fn save(&self, db: &Database) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(db)?;
        fs::write(&tmp, content).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn list(&self, collection: &str, order: &OrderBy) -> Result<Vec<Document>, StoreError> {
        let mut db = self.load().await?;
        let mut docs: Vec<Document> = db
            .shift_remove(collection)
            .map(|c| c.into_iter().map(|(id, f)| Document::new(id, f)).collect())
            .unwrap_or_default();
        sort_documents(&mut docs, order);
        Ok(docs)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let mut db = self.load().await?;
        Ok(db
            .get_mut(collection)
            .and_then(|c| c.shift_remove(id))
            .map(|fields| Document::new(id, fields)))
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut db = self.load().await?;
        let existing = db
            .get_mut(collection)
            .and_then(|c| c.get_mut(id))
            .ok_or_else(|| StoreError::MissingDocument {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        existing.extend(fields);
        self.save(&db).await?;
        tracing::debug!("Updated {}/{} in {:?}", collection, id, self.path);
        Ok(())
    }
}
