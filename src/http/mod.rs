//! HTTP fetch layer
//!
//! Performs every GET the client issues.
//!
//! # Features
//!
//! - **Rate Limits**: Parses `Rate-Limit-*` headers, sleeps until reset on 429
//! - **ETag Caching**: Conditional requests with If-None-Match, 304 served from cache
//! - **Streaming Bodies**: 8 KiB chunked reads with progress and cancellation
//! - **Throttling**: Optional client-side token bucket using governor

mod cache;
mod client;
mod rate_limit;
mod request;
mod response;

pub use cache::{MemoryCache, ResponseCache};
pub use client::{HttpClient, CHUNK_SIZE};
pub use rate_limit::{RateLimitHeaders, RateLimitInfo, Throttle, ThrottleConfig};
pub use request::{Progress, ProgressSink, QueryStore, RequestDescriptor};
pub use response::Response;
