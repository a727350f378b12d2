//! # Catalog
//!
//! Paged and filtered reads of the product collection.

pub mod feed;
pub mod paging;

pub use feed::ProductFeed;
pub use paging::{PageOutcome, PagingCursor, ProductSource};
