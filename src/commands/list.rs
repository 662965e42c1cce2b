//! List posts in the configured collection

use anyhow::Result;

use crate::helpers::short_date;
use crate::store::DocumentStore;
use crate::views::BlogList;
use crate::Blog;

/// Print every post, newest first
pub async fn run(blog: &Blog, store: &dyn DocumentStore) -> Result<()> {
    let mut list = BlogList::from_config(&blog.config);
    list.fetch(store).await?;

    println!("Posts ({}):", list.posts().len());
    for line in lines(&list) {
        println!("{}", line);
    }

    Ok(())
}

fn lines(list: &BlogList) -> Vec<String> {
    list.posts()
        .iter()
        .map(|post| {
            format!(
                "  {} - {} ({} likes, {} views) [{}]",
                short_date(&post.date),
                post.title,
                post.likes,
                post.views,
                post.id
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Document, MemoryStore};
    use serde_json::json;

    #[tokio::test]
    async fn test_lines_newest_first() {
        let docs = [
            ("old", json!({ "title": "Old", "date": "2023-03-01T00:00:00Z" })),
            (
                "new",
                json!({ "title": "New", "likes": 2, "views": 7, "date": "2024-06-10T00:00:00Z" }),
            ),
        ]
        .into_iter()
        .map(|(id, v)| Document::new(id, v.as_object().cloned().unwrap_or_default()));
        let store = MemoryStore::with_documents("blogs", docs);

        let mut list = BlogList::new("blogs");
        list.fetch(&store).await.unwrap();
        let lines = lines(&list);

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "  Jun 10, 2024 - New (2 likes, 7 views) [new]");
        assert!(lines[1].contains("Old (0 likes, 0 views) [old]"));
    }
}
