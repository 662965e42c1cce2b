//! CLI commands

pub mod init;
pub mod like;
pub mod list;
