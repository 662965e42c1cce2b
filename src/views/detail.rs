//! Blog detail: load one post, count the view, render the markdown body

use anyhow::Result;
use tera::Context;

use super::like::{self, Counter};
use super::notice::Notice;
use crate::config::SiteConfig;
use crate::content::{MarkdownRenderer, Post};
use crate::error::BlogError;
use crate::store::DocumentStore;
use crate::templates::{DetailData, SiteData, TemplateRenderer};

/// A loaded post and the collection it came from
#[derive(Debug, Clone)]
pub struct BlogDetail {
    collection: String,
    post: Post,
    image_placeholder: String,
}

impl BlogDetail {
    /// Load a post by id and record one view.
    ///
    /// The view count written is `stored + 1` where `stored` is what this
    /// load read, so concurrent loads of the same post can lose increments.
    /// A failed view write is logged and the page still loads with the
    /// stored count.
    pub async fn load(
        store: &dyn DocumentStore,
        collection: &str,
        id: &str,
        image_placeholder: &str,
    ) -> Result<Self, BlogError> {
        let mut detail = Self::open(store, collection, id, image_placeholder).await?;
        if let Ok(views) =
            like::increment(store, collection, id, Counter::Views, detail.post.views).await
        {
            detail.post.views = views;
        }
        Ok(detail)
    }

    /// Read a post by id without counting a view
    pub async fn open(
        store: &dyn DocumentStore,
        collection: &str,
        id: &str,
        image_placeholder: &str,
    ) -> Result<Self, BlogError> {
        let doc = match store.get(collection, id).await {
            Ok(Some(doc)) => doc,
            Ok(None) => {
                tracing::info!("No such document: {}/{}", collection, id);
                return Err(BlogError::NotFound(id.to_string()));
            }
            Err(source) => {
                tracing::error!("Error getting document {}/{}: {}", collection, id, source);
                return Err(BlogError::FetchFailure {
                    what: format!("post {}", id),
                    source,
                });
            }
        };

        Ok(Self {
            collection: collection.to_string(),
            post: Post::from_document(&doc, image_placeholder),
            image_placeholder: image_placeholder.to_string(),
        })
    }

    /// Load using the collection and placeholder from the site config
    pub async fn load_with_config(
        store: &dyn DocumentStore,
        config: &SiteConfig,
        id: &str,
    ) -> Result<Self, BlogError> {
        Self::load(store, &config.collection, id, &config.detail_image_placeholder).await
    }

    /// [`BlogDetail::open`] with the site config's collection and placeholder
    pub async fn open_with_config(
        store: &dyn DocumentStore,
        config: &SiteConfig,
        id: &str,
    ) -> Result<Self, BlogError> {
        Self::open(store, &config.collection, id, &config.detail_image_placeholder).await
    }

    pub fn post(&self) -> &Post {
        &self.post
    }

    /// Like the loaded post, counting from the likes this load read.
    /// The local count moves only on success.
    pub async fn like(&mut self, store: &dyn DocumentStore) -> Result<u64, BlogError> {
        let likes =
            like::increment_likes(store, &self.collection, &self.post.id, self.post.likes).await?;
        self.post.likes = likes;
        Ok(likes)
    }

    /// Render the detail page
    pub fn render(
        &self,
        templates: &TemplateRenderer,
        markdown: &MarkdownRenderer,
        config: &SiteConfig,
    ) -> Result<String> {
        let content = markdown.render(&self.post.content)?;

        let mut context = Context::new();
        context.insert("site", &SiteData::from(config));
        context.insert("post", &DetailData::new(&self.post, content));
        context.insert("image_fallback", &self.image_placeholder);
        context.insert("notice", &Notice::link_copied());
        context.insert("notice_id", "share-notice");
        context.insert("notice_open", &false);

        templates.render("detail.html", &context)
    }
}
