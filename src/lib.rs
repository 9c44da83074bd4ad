// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # BeatSaver Client
//!
//! A resilient async client for the BeatSaver beatmap API.
//!
//! ## Features
//!
//! - **Rate Limit Handling**: Optionally sleeps until the window resets on HTTP 429
//! - **ETag Caching**: Conditional requests, 304 answers served from memory
//! - **Streaming Downloads**: Chunked body reads with progress and cancellation
//! - **Page Cursors**: `next()` / `previous()` without re-specifying filters
//! - **Item Streams**: Lazily walk every page of a listing as one `Stream`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use beatsaver_client::{BeatSaver, ClientConfig, PagedRequestOptions, RequestOptions, Result};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ClientConfig::builder("MyApp", "1.0.0")
//!         .handle_rate_limits(true)
//!         .build()?;
//!     let client = BeatSaver::new(config)?;
//!
//!     // Single beatmap (None when it does not exist)
//!     let map = client.beatmap_by_key("2144", &RequestOptions::default()).await?;
//!
//!     // Walk a feed page by page
//!     let page = client.latest(PagedRequestOptions::default()).await?;
//!     let next = page.next(None).await?;
//!
//!     // Or as one stream of beatmaps
//!     let mut maps = client.hot_stream(PagedRequestOptions::default());
//!     while let Some(map) = maps.next().await {
//!         println!("{:?}", map?.name);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                   BeatSaver (endpoint methods)                  │
//! │  beatmap_by_key  latest/hot/rating/downloads  search  user      │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────────┬───────────────┴──────┬───────────────────────────┐
//! │  Pagination  │        HTTP          │         Models            │
//! ├──────────────┼──────────────────────┼───────────────────────────┤
//! │ Page cursor  │ Streaming fetcher    │ Beatmap (partial/populate)│
//! │ PageStream   │ ETag cache           │ User                      │
//! │ Options      │ Rate limit parser    │ Metadata, Stats           │
//! └──────────────┴──────────────────────┴───────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the client
pub mod error;

/// Common types and type aliases
pub mod types;

/// Client configuration
pub mod config;

/// HTTP fetch layer with rate limiting and caching
pub mod http;

/// Page cursors, request options and item streams
pub mod pagination;

/// Beatmap and user entities
pub mod models;

/// BeatSaver API client
pub mod client;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use client::{BeatSaver, ClientHandle};
pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_BASE_URL};
pub use error::{Error, Result};
pub use http::{MemoryCache, RateLimitInfo, ResponseCache};
pub use models::{Beatmap, User};
pub use pagination::{
    Page, PageStream, PagedRequestOptions, RequestOptions, SearchRequestOptions,
};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
