//! Built-in templates using the Tera template engine
//!
//! Every page template is embedded in the binary, so the server needs no
//! theme directory at runtime.

use anyhow::Result;
use serde::Serialize;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::Post;
use crate::helpers::{date_xml, full_date, initial, short_date};

/// Template renderer with the embedded theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Autoescaping stays on for .html; rendered markdown goes through `| safe`
        tera.add_raw_templates(vec![
            ("layout.html", include_str!("theme/layout.html")),
            ("list.html", include_str!("theme/list.html")),
            ("detail.html", include_str!("theme/detail.html")),
            ("not_found.html", include_str!("theme/not_found.html")),
            // Partials
            (
                "partials/notice.html",
                include_str!("theme/partials/notice.html"),
            ),
            (
                "partials/pager.html",
                include_str!("theme/partials/pager.html"),
            ),
        ])?;

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }

    /// Render the not-found page
    pub fn render_not_found(&self, config: &SiteConfig) -> Result<String> {
        let mut context = Context::new();
        context.insert("site", &SiteData::from(config));
        self.render("not_found.html", &context)
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub language: String,
}

impl From<&SiteConfig> for SiteData {
    fn from(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            subtitle: config.subtitle.clone(),
            description: config.description.clone(),
            language: config.language.clone(),
        }
    }
}

/// A post as a list card shows it
#[derive(Debug, Clone, Serialize)]
pub struct CardData {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub image: String,
    pub date: String,
    pub date_iso: String,
    pub likes: u64,
    pub link: String,
}

impl From<&Post> for CardData {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id.clone(),
            title: post.title.clone(),
            excerpt: post.excerpt.clone(),
            image: post.image.clone(),
            date: short_date(&post.date),
            date_iso: date_xml(&post.date),
            likes: post.likes,
            link: post.link.clone(),
        }
    }
}

/// A post as the detail page shows it, with the body already rendered
#[derive(Debug, Clone, Serialize)]
pub struct DetailData {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub image: String,
    pub date: String,
    pub date_iso: String,
    pub likes: u64,
    pub views: u64,
    pub tags: Vec<String>,
    pub author: String,
    pub author_initial: String,
    pub read_time: String,
    pub content: String,
}

impl DetailData {
    pub fn new(post: &Post, content_html: String) -> Self {
        Self {
            id: post.id.clone(),
            title: post.title.clone(),
            excerpt: post.excerpt.clone(),
            image: post.image.clone(),
            date: full_date(&post.date),
            date_iso: date_xml(&post.date),
            likes: post.likes,
            views: post.views,
            tags: post.tags.clone(),
            author: post.author.clone(),
            author_initial: initial(&post.author),
            read_time: post.read_time.clone(),
            content: content_html,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginationData {
    pub current: usize,
    pub total: usize,
    pub prev: usize,
    pub next: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_load() {
        assert!(TemplateRenderer::new().is_ok());
    }

    #[test]
    fn test_not_found_page() {
        let renderer = TemplateRenderer::new().unwrap();
        let html = renderer.render_not_found(&SiteConfig::default()).unwrap();
        assert!(html.contains("Blog Post Not Found"));
        assert!(html.contains("Back to Blogs"));
    }
}
