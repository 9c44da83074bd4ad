//! Request option sets
//!
//! [`RequestOptions`] carries the per-call concerns shared by every endpoint
//! (cancellation, progress, extra headers). The paged variants add the page
//! index and their own query parameters, and know how to clone themselves
//! for another index so a [`Page`](super::Page) can walk its neighbours.

use crate::error::{Error, Result};
use crate::http::{ProgressSink, RequestDescriptor};
use crate::types::{AutomapFilter, HeaderList};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

// ============================================================================
// Request Options
// ============================================================================

/// Cancellation, progress and headers for a single call
#[derive(Clone, Default)]
pub struct RequestOptions {
    /// Token that aborts the request
    pub cancel: Option<CancellationToken>,
    /// Receiver of body download progress
    pub progress: Option<ProgressSink>,
    /// Extra request headers
    pub headers: HeaderList,
}

impl RequestOptions {
    /// Create empty options
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a cancellation token
    #[must_use]
    pub fn cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Attach a progress sink
    #[must_use]
    pub fn progress(mut self, sink: ProgressSink) -> Self {
        self.progress = Some(sink);
        self
    }

    /// Attach a progress callback
    #[must_use]
    pub fn on_progress(self, f: impl Fn(f64) + Send + Sync + 'static) -> Self {
        self.progress(Arc::new(f))
    }

    /// Add a request header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Build a descriptor for `path` carrying these options
    pub fn descriptor(&self, path: impl AsRef<str>) -> RequestDescriptor {
        self.apply(RequestDescriptor::new(path))
    }

    /// Copy these options onto an existing descriptor
    pub(crate) fn apply(&self, mut request: RequestDescriptor) -> RequestDescriptor {
        if let Some(ref token) = self.cancel {
            request = request.cancel_token(token.clone());
        }
        if let Some(ref sink) = self.progress {
            request = request.progress(sink.clone());
        }
        request.headers(self.headers.iter().cloned())
    }
}

impl fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestOptions")
            .field("has_cancel", &self.cancel.is_some())
            .field("has_progress", &self.progress.is_some())
            .field("headers", &self.headers)
            .finish()
    }
}

// ============================================================================
// Paged Options Trait
// ============================================================================

/// Options for an endpoint that returns pages
pub trait PagedOptions: fmt::Debug + Send + Sync {
    /// 0-based page index
    fn page(&self) -> u32;

    /// Per-call options
    fn request_options(&self) -> &RequestOptions;

    /// Add endpoint-specific query parameters
    fn apply_query(&self, request: RequestDescriptor) -> Result<RequestDescriptor>;

    /// Copy of these options for `page`.
    ///
    /// When `overrides` is given, its cancellation, progress and headers
    /// replace the current ones; otherwise they carry over unchanged.
    fn clone_for_page(&self, page: u32, overrides: Option<&RequestOptions>) -> Arc<dyn PagedOptions>;

    /// Descriptor for `{base}/{page}`
    fn descriptor(&self, base: &str) -> Result<RequestDescriptor> {
        let path = format!("{}/{}", base.trim_end_matches('/'), self.page());
        let request = self.request_options().descriptor(path);
        self.apply_query(request)
    }
}

// ============================================================================
// Feed Options
// ============================================================================

/// Options for the map feeds and a user's uploads
#[derive(Debug, Clone, Default)]
pub struct PagedRequestOptions {
    /// 0-based page index
    pub page: u32,
    /// Automapped beatmap filter
    pub automaps: AutomapFilter,
    /// Per-call options
    pub request: RequestOptions,
}

impl PagedRequestOptions {
    /// Options for page 0 including automapped beatmaps
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page index
    #[must_use]
    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Set the automapper filter
    #[must_use]
    pub fn automaps(mut self, filter: AutomapFilter) -> Self {
        self.automaps = filter;
        self
    }

    /// Set the per-call options
    #[must_use]
    pub fn request(mut self, request: RequestOptions) -> Self {
        self.request = request;
        self
    }
}

impl PagedOptions for PagedRequestOptions {
    fn page(&self) -> u32 {
        self.page
    }

    fn request_options(&self) -> &RequestOptions {
        &self.request
    }

    fn apply_query(&self, request: RequestDescriptor) -> Result<RequestDescriptor> {
        Ok(match self.automaps.query_value() {
            Some(value) => request.query("automapper", value),
            None => request,
        })
    }

    fn clone_for_page(&self, page: u32, overrides: Option<&RequestOptions>) -> Arc<dyn PagedOptions> {
        Arc::new(Self {
            page,
            automaps: self.automaps,
            request: overrides.unwrap_or(&self.request).clone(),
        })
    }
}

// ============================================================================
// Search Options
// ============================================================================

/// Options for text and advanced search
#[derive(Debug, Clone, Default)]
pub struct SearchRequestOptions {
    /// 0-based page index
    pub page: u32,
    /// Search query (Lucene syntax for advanced search)
    pub query: String,
    /// Per-call options
    pub request: RequestOptions,
}

impl SearchRequestOptions {
    /// Options for page 0 of `query`
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    /// Set the page index
    #[must_use]
    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Set the per-call options
    #[must_use]
    pub fn request(mut self, request: RequestOptions) -> Self {
        self.request = request;
        self
    }
}

impl PagedOptions for SearchRequestOptions {
    fn page(&self) -> u32 {
        self.page
    }

    fn request_options(&self) -> &RequestOptions {
        &self.request
    }

    fn apply_query(&self, request: RequestDescriptor) -> Result<RequestDescriptor> {
        if self.query.trim().is_empty() {
            return Err(Error::invalid_argument("query"));
        }
        Ok(request.query("q", self.query.as_str()))
    }

    fn clone_for_page(&self, page: u32, overrides: Option<&RequestOptions>) -> Arc<dyn PagedOptions> {
        Arc::new(Self {
            page,
            query: self.query.clone(),
            request: overrides.unwrap_or(&self.request).clone(),
        })
    }
}
