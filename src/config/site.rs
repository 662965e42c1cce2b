//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::content::{DETAIL_IMAGE_PLACEHOLDER, LIST_IMAGE_PLACEHOLDER};

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,
    pub language: String,

    // Posts
    pub collection: String,
    pub per_page: usize,
    pub skeleton_count: usize,
    pub list_image_placeholder: String,
    pub detail_image_placeholder: String,

    #[serde(default)]
    pub highlight: HighlightConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Blogs".to_string(),
            subtitle: "Insights, tutorials, and updates from my journey as a developer.".to_string(),
            description: String::new(),
            author: "Anonymous".to_string(),
            language: "en".to_string(),

            collection: "blogs".to_string(),
            per_page: 6,
            skeleton_count: 6,
            list_image_placeholder: LIST_IMAGE_PLACEHOLDER.to_string(),
            detail_image_placeholder: DETAIL_IMAGE_PLACEHOLDER.to_string(),

            highlight: HighlightConfig::default(),
            server: ServerConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let mut config: SiteConfig = serde_yaml::from_str(&content)?;
        if config.per_page == 0 {
            tracing::warn!("per_page must be at least 1, falling back to 6");
            config.per_page = 6;
        }
        Ok(config)
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
            line_number: true,
        }
    }
}

/// HTTP server defaults, overridable from the command line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub ip: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ip: "localhost".to_string(),
            port: 4000,
        }
    }
}

/// Which document store backs the blog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    File,
    Firestore,
}

/// Document store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Data file for the `file` backend, relative to the site directory
    pub path: String,
    pub project_id: Option<String>,
    pub database: String,
    pub api_key: Option<String>,
    /// Override for the Firestore REST base URL (emulators, proxies)
    pub endpoint: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::File,
            path: "data/blogs.json".to_string(),
            project_id: None,
            database: "(default)".to_string(),
            api_key: None,
            endpoint: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.collection, "blogs");
        assert_eq!(config.per_page, 6);
        assert_eq!(config.skeleton_count, 6);
        assert_eq!(config.store.backend, StoreBackend::File);
        assert_eq!(config.server.port, 4000);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Blog
author: Test User
per_page: 9
store:
  backend: firestore
  project_id: portfolio
  api_key: secret
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Blog");
        assert_eq!(config.author, "Test User");
        assert_eq!(config.per_page, 9);
        assert_eq!(config.store.backend, StoreBackend::Firestore);
        assert_eq!(config.store.project_id.as_deref(), Some("portfolio"));
        assert_eq!(config.store.database, "(default)");
        assert_eq!(config.highlight.theme, "base16-ocean.dark");
    }

    #[test]
    fn test_load_rejects_zero_page_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_config.yml");
        fs::write(&path, "per_page: 0\n").unwrap();
        let config = SiteConfig::load(&path).unwrap();
        assert_eq!(config.per_page, 6);
    }
}
