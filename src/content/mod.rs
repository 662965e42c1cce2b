//! Content module - post model, normalization and markdown rendering

mod markdown;
mod post;

pub use markdown::MarkdownRenderer;
pub use post::{
    Post, BROKEN_IMAGE_PLACEHOLDER, DEFAULT_AUTHOR, DEFAULT_LINK, DEFAULT_READ_TIME,
    DEFAULT_TITLE, DETAIL_IMAGE_PLACEHOLDER, LIST_IMAGE_PLACEHOLDER,
};
