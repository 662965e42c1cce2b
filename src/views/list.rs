//! Blog list: fetch every post once, paginate in memory
//!
//! The whole collection is requested newest first and normalized up front.
//! Paging never goes back to the store; only a re-mount (`fetch` again)
//! does.

use anyhow::Result;
use tera::Context;

use super::like;
use super::notice::Notice;
use crate::config::SiteConfig;
use crate::content::{Post, BROKEN_IMAGE_PLACEHOLDER};
use crate::error::BlogError;
use crate::store::{Document, DocumentStore, OrderBy, StoreError};
use crate::templates::{CardData, PaginationData, SiteData, TemplateRenderer};

/// Number of posts per page
pub const PAGE_SIZE: usize = 6;

/// Field the collection is ordered by, newest first
pub const ORDER_FIELD: &str = "date";

/// Where the list is in its fetch lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Never fetched
    Idle,
    Loading,
    Ready,
    /// Last fetch failed; whatever was shown before is kept
    Failed,
}

/// One page worth of posts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Page<'a> {
    pub number: usize,
    pub total: usize,
    pub items: &'a [Post],
}

impl Page<'_> {
    pub fn has_prev(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total
    }
}

/// The list view's state
#[derive(Debug, Clone)]
pub struct BlogList {
    collection: String,
    per_page: usize,
    skeleton_count: usize,
    image_placeholder: String,
    posts: Vec<Post>,
    state: LoadState,
    /// Paging cursor for single-reader callers. The server shares one list
    /// between requests and pages through [`BlogList::page`] instead.
    current_page: usize,
}

impl BlogList {
    pub fn new(collection: &str) -> Self {
        Self {
            collection: collection.to_string(),
            per_page: PAGE_SIZE,
            skeleton_count: PAGE_SIZE,
            image_placeholder: crate::content::LIST_IMAGE_PLACEHOLDER.to_string(),
            posts: Vec::new(),
            state: LoadState::Idle,
            current_page: 1,
        }
    }

    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            per_page: config.per_page.max(1),
            skeleton_count: config.skeleton_count,
            image_placeholder: config.list_image_placeholder.clone(),
            ..Self::new(&config.collection)
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn find(&self, id: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }

    /// Request the raw documents for this list, newest first
    pub async fn request(
        store: &dyn DocumentStore,
        collection: &str,
    ) -> Result<Vec<Document>, StoreError> {
        store.list(collection, &OrderBy::desc(ORDER_FIELD)).await
    }

    /// Mark a fetch as outstanding
    pub fn begin_loading(&mut self) {
        self.state = LoadState::Loading;
    }

    /// Apply the outcome of [`BlogList::request`].
    ///
    /// On success the posts are replaced wholesale. On failure the error is
    /// logged and the previous posts stay in place.
    pub fn finish_loading(
        &mut self,
        result: Result<Vec<Document>, StoreError>,
    ) -> Result<usize, BlogError> {
        match result {
            Ok(docs) => {
                self.posts = docs
                    .iter()
                    .map(|doc| Post::from_document(doc, &self.image_placeholder))
                    .collect();
                self.state = LoadState::Ready;
                self.current_page = self.clamp(self.current_page);
                tracing::info!("Loaded {} blog posts", self.posts.len());
                Ok(self.posts.len())
            }
            Err(source) => {
                tracing::error!("Error fetching blogs: {}", source);
                self.state = LoadState::Failed;
                Err(BlogError::FetchFailure {
                    what: format!("collection {}", self.collection),
                    source,
                })
            }
        }
    }

    /// Fetch the whole collection
    pub async fn fetch(&mut self, store: &dyn DocumentStore) -> Result<usize, BlogError> {
        self.begin_loading();
        let result = Self::request(store, &self.collection).await;
        self.finish_loading(result)
    }

    /// `max(1, ceil(count / per_page))`
    pub fn total_pages(&self) -> usize {
        self.posts.len().div_ceil(self.per_page).max(1)
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    fn clamp(&self, page: usize) -> usize {
        page.clamp(1, self.total_pages())
    }

    /// Move the cursor to a page; out-of-range requests are clamped.
    /// Shared callers should use [`BlogList::page`], which leaves the cursor alone.
    pub fn go_to(&mut self, page: usize) -> usize {
        self.current_page = self.clamp(page);
        self.current_page
    }

    pub fn next(&mut self) -> usize {
        self.go_to(self.current_page.saturating_add(1))
    }

    pub fn prev(&mut self) -> usize {
        self.go_to(self.current_page.saturating_sub(1))
    }

    /// Posts on the current page
    pub fn page_items(&self) -> &[Post] {
        self.page(self.current_page).items
    }

    /// Any page by number, clamped, without moving the current page
    pub fn page(&self, number: usize) -> Page<'_> {
        let number = self.clamp(number);
        let start = ((number - 1) * self.per_page).min(self.posts.len());
        let end = (start + self.per_page).min(self.posts.len());
        Page {
            number,
            total: self.total_pages(),
            items: &self.posts[start..end],
        }
    }

    /// Like a post on the list; the local count moves only after the store
    /// accepted the write
    pub async fn like(&mut self, store: &dyn DocumentStore, id: &str) -> Result<u64, BlogError> {
        let current = self
            .find(id)
            .map(|p| p.likes)
            .ok_or_else(|| BlogError::NotFound(id.to_string()))?;
        let likes = like::increment_likes(store, &self.collection, id, current).await?;
        self.apply_likes(id, likes);
        Ok(likes)
    }

    /// Reflect a like confirmed elsewhere (e.g. on the detail page).
    /// Counts never go down.
    pub fn apply_likes(&mut self, id: &str, likes: u64) -> bool {
        match self.posts.iter_mut().find(|p| p.id == id) {
            Some(post) => {
                post.likes = post.likes.max(likes);
                true
            }
            None => false,
        }
    }

    /// Render one page of the list
    pub fn render(
        &self,
        templates: &TemplateRenderer,
        config: &SiteConfig,
        page: usize,
        notice: Option<&Notice>,
    ) -> Result<String> {
        let page = self.page(page);
        let cards: Vec<CardData> = page.items.iter().map(CardData::from).collect();
        let pagination = PaginationData {
            current: page.number,
            total: page.total,
            prev: page.number.saturating_sub(1).max(1),
            next: (page.number + 1).min(page.total),
            has_prev: page.has_prev(),
            has_next: page.has_next(),
        };

        let mut context = Context::new();
        context.insert("site", &SiteData::from(config));
        context.insert("loading", &matches!(self.state, LoadState::Idle | LoadState::Loading));
        context.insert("failed", &(self.state == LoadState::Failed));
        context.insert("skeleton_count", &self.skeleton_count);
        context.insert("refresh_url", &format!("/blogs?page={}", page.number));
        context.insert("posts", &cards);
        context.insert("pagination", &pagination);
        context.insert("broken_image", BROKEN_IMAGE_PLACEHOLDER);
        context.insert("notice", &notice);
        context.insert("notice_id", "page-notice");
        context.insert("notice_open", &true);

        templates.render("list.html", &context)
    }
}
