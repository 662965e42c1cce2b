//! Counter mutations shared by the list and detail views
//!
//! A counter write is read-then-write: the new value is computed from the
//! count the caller currently shows, so two concurrent writers can both
//! store N+1. Callers only advance their local copy when this returns `Ok`.

use serde_json::Value;

use crate::error::BlogError;
use crate::store::{DocumentStore, Fields};

/// Counter fields this system ever writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Likes,
    Views,
}

impl Counter {
    pub fn field(self) -> &'static str {
        match self {
            Counter::Likes => "likes",
            Counter::Views => "views",
        }
    }
}

/// Write `current + 1` to the counter and return the new value
pub async fn increment(
    store: &dyn DocumentStore,
    collection: &str,
    id: &str,
    counter: Counter,
    current: u64,
) -> Result<u64, BlogError> {
    let next = current.saturating_add(1);
    let mut fields = Fields::new();
    fields.insert(counter.field().to_string(), Value::from(next));

    match store.update(collection, id, fields).await {
        Ok(()) => {
            tracing::debug!("{} on {} is now {}", counter.field(), id, next);
            Ok(next)
        }
        Err(source) => {
            tracing::error!("Error updating {} on {}: {}", counter.field(), id, source);
            Err(BlogError::MutationFailure {
                id: id.to_string(),
                field: counter.field(),
                source,
            })
        }
    }
}

/// Like a post whose displayed count is `current`
pub async fn increment_likes(
    store: &dyn DocumentStore,
    collection: &str,
    id: &str,
    current: u64,
) -> Result<u64, BlogError> {
    increment(store, collection, id, Counter::Likes, current).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Document, MemoryStore};
    use crate::views::testing::FailingStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_increment_likes_writes_next_value() {
        let store = MemoryStore::with_documents(
            "blogs",
            [Document::new("abc123", json!({ "likes": 4 }).as_object().cloned().unwrap())],
        );
        let likes = increment_likes(&store, "blogs", "abc123", 4).await.unwrap();
        assert_eq!(likes, 5);

        let doc = store.get("blogs", "abc123").await.unwrap().unwrap();
        assert_eq!(doc.fields["likes"], json!(5));
    }

    #[tokio::test]
    async fn test_failed_write_is_a_mutation_failure() {
        let store = FailingStore::default();
        let err = increment(&store, "blogs", "abc123", Counter::Views, 1)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BlogError::MutationFailure { field: "views", .. }
        ));
    }
}
