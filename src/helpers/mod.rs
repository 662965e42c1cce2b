//! Helper functions shared by the views and templates

mod date;
mod html;

pub use date::*;
pub use html::*;
