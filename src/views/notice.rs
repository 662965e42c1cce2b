//! Modal notifications shown to the reader

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
}

/// A dismissable dialog with a title, body, icon and OK button
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub text: String,
    pub confirm: String,
}

impl Notice {
    /// Query-string code carried across the detail → list redirect
    pub const LOAD_FAILED: &'static str = "load-failed";

    pub fn load_failed() -> Self {
        Self {
            kind: NoticeKind::Error,
            title: "Error".to_string(),
            text: "Failed to load blog post".to_string(),
            confirm: "OK".to_string(),
        }
    }

    pub fn link_copied() -> Self {
        Self {
            kind: NoticeKind::Success,
            title: "Link Copied!".to_string(),
            text: "Blog link has been copied to clipboard".to_string(),
            confirm: "OK".to_string(),
        }
    }

    /// Resolve a notice code from a redirect, unknown codes show nothing
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            Self::LOAD_FAILED => Some(Self::load_failed()),
            _ => None,
        }
    }
}
