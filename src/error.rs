//! Errors surfaced by the blog views

use thiserror::Error;

use crate::store::StoreError;

/// What went wrong while loading or mutating posts.
///
/// None of these are fatal: every variant maps to a screen the reader can
/// navigate away from.
#[derive(Debug, Error)]
pub enum BlogError {
    /// Listing the collection or reading one post failed
    #[error("failed to fetch {what}: {source}")]
    FetchFailure {
        what: String,
        #[source]
        source: StoreError,
    },

    /// No post exists for the identifier
    #[error("no blog post with id {0}")]
    NotFound(String),

    /// A counter write was rejected; local state was left alone
    #[error("failed to update {field} on {id}: {source}")]
    MutationFailure {
        id: String,
        field: &'static str,
        #[source]
        source: StoreError,
    },
}
