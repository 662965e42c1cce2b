//! devblog-rs: a small blog server backed by a document store
//!
//! Posts live in a remote collection. The server shows them as a paginated
//! list and as individual markdown pages, and keeps like/view counters on
//! each post up to date.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod helpers;
pub mod server;
pub mod store;
pub mod templates;
pub mod views;

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

pub use error::BlogError;

/// The main blog application
#[derive(Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: std::path::PathBuf,
}

impl Blog {
    /// Create a new blog instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No _config.yml in {:?}, using defaults", base_dir);
            config::SiteConfig::default()
        };

        Ok(Self { config, base_dir })
    }

    /// Open the document store the configuration points at.
    ///
    /// Call once and share the handle; every view takes it as a parameter.
    pub fn open_store(&self) -> Result<Arc<dyn store::DocumentStore>> {
        store::open(&self.config.store, &self.base_dir)
    }
}
