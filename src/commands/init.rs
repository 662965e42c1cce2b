//! Initialize a new blog directory

use anyhow::Result;
use serde_json::json;
use std::fs;
use std::path::Path;

use crate::Blog;

const CONFIG_TEMPLATE: &str = r#"# Blog Configuration

# Site
title: Blogs
subtitle: ''
description: ''
author: ''
language: en

# Posts
collection: blogs
per_page: 6
skeleton_count: 6

# Code blocks
highlight:
  theme: base16-ocean.dark
  line_number: true

# Server
server:
  ip: localhost
  port: 4000

# Document store (memory, file or firestore)
store:
  backend: file
  path: data/blogs.json
#  backend: firestore
#  project_id: my-project
#  database: (default)
#  api_key: ''
"#;

const SAMPLE_CONTENT: &str = r#"Welcome! This post lives in `data/blogs.json`. Edit that file, or point
`_config.yml` at a Firestore project, and refresh the list.

## Quick Start

### Run server

```bash
$ devblog-rs server
```

### Like a post from the terminal

```bash
$ devblog-rs like hello-world
```
"#;

/// Initialize a new blog in the given directory.
///
/// Existing files are left alone so re-running never clobbers data.
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir.join("data"))?;

    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        tracing::warn!("{:?} already exists, skipping", config_path);
    } else {
        fs::write(&config_path, CONFIG_TEMPLATE)?;
    }

    let data_path = target_dir.join("data/blogs.json");
    if data_path.exists() {
        tracing::warn!("{:?} already exists, skipping", data_path);
    } else {
        let now = chrono::Utc::now();
        let sample = json!({
            "blogs": {
                "hello-world": {
                    "title": "Hello World",
                    "excerpt": "Your very first post.",
                    "content": SAMPLE_CONTENT,
                    "date": now.to_rfc3339(),
                    "likes": 0,
                    "views": 0,
                    "tags": ["welcome"],
                    "readTime": "1 min read"
                }
            }
        });
        fs::write(&data_path, serde_json::to_string_pretty(&sample)?)?;
    }

    Ok(())
}

/// Run the init command against an existing blog directory
pub fn run(blog: &Blog) -> Result<()> {
    init_site(&blog.base_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DocumentStore;

    #[tokio::test]
    async fn test_init_creates_loadable_site() {
        let dir = tempfile::tempdir().unwrap();
        init_site(dir.path()).unwrap();

        let blog = Blog::new(dir.path()).unwrap();
        assert_eq!(blog.config.per_page, 6);

        let store = blog.open_store().unwrap();
        let doc = store.get("blogs", "hello-world").await.unwrap().unwrap();
        assert_eq!(doc.fields["title"], "Hello World");
    }

    #[test]
    fn test_init_keeps_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("_config.yml"), "title: Mine\n").unwrap();
        init_site(dir.path()).unwrap();

        let config = fs::read_to_string(dir.path().join("_config.yml")).unwrap();
        assert_eq!(config, "title: Mine\n");
        assert!(dir.path().join("data/blogs.json").exists());
    }
}
