//! Like a post from the command line

use anyhow::Result;

use crate::store::DocumentStore;
use crate::views::BlogList;
use crate::Blog;

/// Increment a post's likes and return the new count
pub async fn run(blog: &Blog, store: &dyn DocumentStore, id: &str) -> Result<u64> {
    let mut list = BlogList::from_config(&blog.config);
    list.fetch(store).await?;
    Ok(list.like(store, id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Document, MemoryStore};
    use serde_json::json;

    fn store() -> MemoryStore {
        let fields = json!({ "title": "Hi", "likes": 3 });
        MemoryStore::with_documents(
            "blogs",
            [Document::new("hi", fields.as_object().cloned().unwrap_or_default())],
        )
    }

    #[tokio::test]
    async fn test_like_increments_stored_count() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        let store = store();

        assert_eq!(run(&blog, &store, "hi").await.unwrap(), 4);
        let doc = store.get("blogs", "hi").await.unwrap().unwrap();
        assert_eq!(doc.fields["likes"], json!(4));
    }

    #[tokio::test]
    async fn test_like_unknown_post_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        assert!(run(&blog, &store(), "missing").await.is_err());
    }
}
