//! In-process document store

use async_trait::async_trait;
use indexmap::IndexMap;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{sort_documents, Document, DocumentStore, Fields, OrderBy, StoreError};

type Collection = IndexMap<String, Fields>;

/// Keeps every collection in memory. Used for demos and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with one collection
    pub fn with_documents<I>(collection: &str, docs: I) -> Self
    where
        I: IntoIterator<Item = Document>,
    {
        let docs: Collection = docs.into_iter().map(|d| (d.id, d.fields)).collect();
        let mut collections = HashMap::new();
        collections.insert(collection.to_string(), docs);
        Self {
            collections: RwLock::new(collections),
        }
    }

    /// Insert or replace a document
    pub async fn insert(&self, collection: &str, doc: Document) {
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(doc.id, doc.fields);
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list(&self, collection: &str, order: &OrderBy) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        let mut docs: Vec<Document> = collections
            .get(collection)
            .map(|c| {
                c.iter()
                    .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default();
        sort_documents(&mut docs, order);
        Ok(docs)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|c| c.get(id))
            .map(|fields| Document::new(id, fields.clone())))
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let existing = collections
            .get_mut(collection)
            .and_then(|c| c.get_mut(id))
            .ok_or_else(|| StoreError::MissingDocument {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        existing.extend(fields);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_get_and_update() {
        let store = MemoryStore::with_documents(
            "blogs",
            [Document::new("a", fields(json!({ "title": "A", "likes": 1 })))],
        );

        store
            .update("blogs", "a", fields(json!({ "likes": 2 })))
            .await
            .unwrap();

        let doc = store.get("blogs", "a").await.unwrap().unwrap();
        assert_eq!(doc.fields["likes"], json!(2));
        assert_eq!(doc.fields["title"], json!("A"));
        assert!(store.get("blogs", "missing").await.unwrap().is_none());
        assert!(store.get("other", "a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_document_fails() {
        let store = MemoryStore::new();
        let err = store
            .update("blogs", "ghost", fields(json!({ "likes": 1 })))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingDocument { .. }));
    }

    #[tokio::test]
    async fn test_list_sorted() {
        let store = MemoryStore::new();
        store
            .insert("blogs", Document::new("old", fields(json!({ "date": "2020-01-01T00:00:00Z" }))))
            .await;
        store
            .insert("blogs", Document::new("new", fields(json!({ "date": "2022-01-01T00:00:00Z" }))))
            .await;

        let docs = store.list("blogs", &OrderBy::desc("date")).await.unwrap();
        let ids: Vec<_> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old"]);
        assert!(store.list("empty", &OrderBy::desc("date")).await.unwrap().is_empty());
    }
}
