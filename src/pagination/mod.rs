//! Pagination module
//!
//! Supports: page cursors (next / previous / jump) and lazy item streams
//!
//! # Overview
//!
//! Listing endpoints return a [`Page`] that remembers the client, the endpoint
//! path and the options that produced it. `next()` and `previous()` re-issue
//! the same request for an adjacent index without the caller re-specifying
//! filters, and [`PageStream`] flattens the pages into a single item stream.

mod options;
mod stream;
mod types;

pub use options::{PagedOptions, PagedRequestOptions, RequestOptions, SearchRequestOptions};
pub use stream::PageStream;
pub use types::{Page, PageContext};

#[cfg(test)]
mod tests;
