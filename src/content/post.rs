//! Post model and normalization of raw store documents

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::helpers::parse_timestamp;
use crate::store::Document;

pub const DEFAULT_TITLE: &str = "Untitled Blog";
pub const DEFAULT_AUTHOR: &str = "Anonymous";
pub const DEFAULT_READ_TIME: &str = "5 min read";
pub const DEFAULT_LINK: &str = "#";
pub const LIST_IMAGE_PLACEHOLDER: &str = "https://via.placeholder.com/400x200?text=Blog+Image";
pub const DETAIL_IMAGE_PLACEHOLDER: &str = "https://via.placeholder.com/800x400?text=Blog+Image";
pub const BROKEN_IMAGE_PLACEHOLDER: &str =
    "https://via.placeholder.com/400x200?text=Image+Not+Found";

/// A blog post with every field populated
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    /// Store-assigned identifier
    pub id: String,

    pub title: String,

    /// Short teaser shown on cards
    pub excerpt: String,

    /// Raw markdown body
    pub content: String,

    /// Cover image URL
    pub image: String,

    /// Publication date
    pub date: DateTime<Utc>,

    pub likes: u64,

    pub views: u64,

    pub tags: Vec<String>,

    pub author: String,

    /// Display label such as "5 min read"
    pub read_time: String,

    /// External link used by the simple card layout
    pub link: String,
}

impl Post {
    /// Build a post from a raw document, filling every absent field.
    ///
    /// Null, missing, empty-string and wrongly-typed values all fall back to
    /// the same default. `image_placeholder` differs between the list cards
    /// and the detail hero image.
    pub fn from_document(doc: &Document, image_placeholder: &str) -> Self {
        Self {
            id: doc.id.clone(),
            title: text_or(doc, "title", DEFAULT_TITLE),
            excerpt: text_or(doc, "excerpt", ""),
            content: text_or(doc, "content", ""),
            image: text_or(doc, "image", image_placeholder),
            date: doc
                .get("date")
                .and_then(parse_timestamp)
                .unwrap_or_else(Utc::now),
            likes: counter(doc, "likes"),
            views: counter(doc, "views"),
            tags: tags(doc),
            author: text_or(doc, "author", DEFAULT_AUTHOR),
            read_time: text_or(doc, "readTime", DEFAULT_READ_TIME),
            link: text_or(doc, "link", DEFAULT_LINK),
        }
    }
}

fn text_or(doc: &Document, field: &str, default: &str) -> String {
    match doc.get(field) {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => default.to_string(),
    }
}

/// Non-negative counters; negatives and fractions read as 0
fn counter(doc: &Document, field: &str) -> u64 {
    doc.get(field)
        .and_then(|v| {
            v.as_u64().or_else(|| {
                v.as_f64()
                    .filter(|f| *f >= 0.0 && f.fract() == 0.0)
                    .map(|f| f as u64)
            })
        })
        .unwrap_or(0)
}

/// Tags may be stored as a list or as a single string
fn tags(doc: &Document) -> Vec<String> {
    match doc.get("tags") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) if !s.is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(fields: Value) -> Document {
        Document::new("abc123", fields.as_object().cloned().unwrap())
    }

    #[test]
    fn test_defaults_for_empty_document() {
        let before = Utc::now();
        let post = Post::from_document(&doc(json!({})), LIST_IMAGE_PLACEHOLDER);
        assert_eq!(post.id, "abc123");
        assert_eq!(post.title, DEFAULT_TITLE);
        assert_eq!(post.excerpt, "");
        assert_eq!(post.content, "");
        assert_eq!(post.image, LIST_IMAGE_PLACEHOLDER);
        assert!(post.date >= before);
        assert_eq!(post.likes, 0);
        assert_eq!(post.views, 0);
        assert!(post.tags.is_empty());
        assert_eq!(post.author, DEFAULT_AUTHOR);
        assert_eq!(post.read_time, DEFAULT_READ_TIME);
        assert_eq!(post.link, DEFAULT_LINK);
    }

    #[test]
    fn test_null_fields_match_missing_fields() {
        let nulls = doc(json!({
            "title": null, "excerpt": null, "content": null, "image": null,
            "likes": null, "views": null, "tags": null, "author": null,
            "readTime": null, "link": null
        }));
        let a = Post::from_document(&nulls, DETAIL_IMAGE_PLACEHOLDER);
        let b = Post::from_document(&doc(json!({})), DETAIL_IMAGE_PLACEHOLDER);
        assert_eq!(a.title, b.title);
        assert_eq!(a.image, DETAIL_IMAGE_PLACEHOLDER);
        assert_eq!(a.likes, b.likes);
        assert_eq!(a.tags, b.tags);
        assert_eq!(a.author, b.author);
        assert_eq!(a.read_time, b.read_time);
        assert_eq!(a.link, b.link);
    }

    #[test]
    fn test_populated_document() {
        let post = Post::from_document(
            &doc(json!({
                "title": "Async Rust",
                "excerpt": "Futures all the way down",
                "content": "# Hi",
                "image": "https://img.example/cover.png",
                "date": "2024-01-05T10:00:00Z",
                "likes": 4,
                "views": 10,
                "tags": ["rust", 3, "async"],
                "author": "Dee",
                "readTime": "8 min read",
                "link": "https://example.com"
            })),
            LIST_IMAGE_PLACEHOLDER,
        );
        assert_eq!(post.title, "Async Rust");
        assert_eq!(post.image, "https://img.example/cover.png");
        assert_eq!(post.date.to_rfc3339(), "2024-01-05T10:00:00+00:00");
        assert_eq!(post.likes, 4);
        assert_eq!(post.views, 10);
        assert_eq!(post.tags, vec!["rust", "async"]);
        assert_eq!(post.author, "Dee");
        assert_eq!(post.read_time, "8 min read");
    }

    #[test]
    fn test_falsy_and_mistyped_values_fall_back() {
        let post = Post::from_document(
            &doc(json!({ "title": "", "likes": -3, "views": "12", "tags": "solo", "author": 7 })),
            LIST_IMAGE_PLACEHOLDER,
        );
        assert_eq!(post.title, DEFAULT_TITLE);
        assert_eq!(post.likes, 0);
        assert_eq!(post.views, 0);
        assert_eq!(post.tags, vec!["solo"]);
        assert_eq!(post.author, DEFAULT_AUTHOR);
    }

    #[test]
    fn test_whole_float_counters() {
        let post = Post::from_document(&doc(json!({ "likes": 4.0 })), LIST_IMAGE_PLACEHOLDER);
        assert_eq!(post.likes, 4);
    }
}
