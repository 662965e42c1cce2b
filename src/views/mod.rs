//! The blog's two views and the mutations they share

pub mod detail;
pub mod like;
pub mod list;
pub mod notice;

#[cfg(test)]
pub(crate) mod testing;

pub use detail::BlogDetail;
pub use list::{BlogList, LoadState, Page, PAGE_SIZE};
pub use notice::{Notice, NoticeKind};
