//! Request descriptors
//!
//! A [`RequestDescriptor`] is everything the fetcher needs to perform one GET:
//! the target path with its ordered, multi-valued query, extra headers, and
//! the optional cancellation token and progress sink threaded through the
//! body read.

use crate::types::HeaderList;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::form_urlencoded::byte_serialize;

// ============================================================================
// Progress
// ============================================================================

/// Receiver of fractional download progress in `0.0..=1.0`
pub trait Progress: Send + Sync {
    /// Report the fraction of the body read so far
    fn report(&self, value: f64);
}

impl<F> Progress for F
where
    F: Fn(f64) + Send + Sync,
{
    fn report(&self, value: f64) {
        self(value);
    }
}

/// Shared progress sink
pub type ProgressSink = Arc<dyn Progress>;

// ============================================================================
// Query Store
// ============================================================================

/// Ordered multi-valued query parameters.
///
/// Keys keep their first insertion position; appending to an existing key
/// adds another value under it. Empty values render as a bare key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryStore {
    entries: Vec<(String, Vec<String>)>,
}

impl QueryStore {
    /// Create an empty query
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value under `key`
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();

        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((key, vec![value])),
        }
    }

    /// All values recorded for `key`
    pub fn get(&self, key: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map_or(&[], |(_, values)| values.as_slice())
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no parameters are set
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as `?k=v&k=v2`, or `None` when empty
    pub fn to_query_string(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }

        let mut out = String::new();
        for (key, values) in &self.entries {
            for value in values {
                out.push(if out.is_empty() { '?' } else { '&' });
                out.extend(byte_serialize(key.as_bytes()));
                if !value.is_empty() {
                    out.push('=');
                    out.extend(byte_serialize(value.as_bytes()));
                }
            }
        }
        Some(out)
    }
}

// ============================================================================
// Request Descriptor
// ============================================================================

/// Description of a single GET request
#[derive(Clone, Default)]
pub struct RequestDescriptor {
    path: String,
    query: QueryStore,
    headers: HeaderList,
    cancel: Option<CancellationToken>,
    progress: Option<ProgressSink>,
}

impl RequestDescriptor {
    /// Create a descriptor for a path relative to the API root, or an absolute URL
    pub fn new(path: impl AsRef<str>) -> Self {
        let path = path.as_ref();
        let path = if is_absolute(path) {
            path.to_string()
        } else {
            path.trim_start_matches('/').to_string()
        };

        Self {
            path,
            ..Self::default()
        }
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.append(key, value);
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Add several headers
    #[must_use]
    pub fn headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.headers.extend(headers);
        self
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

    /// Path or absolute URL without the query
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query parameters
    pub fn query_params(&self) -> &QueryStore {
        &self.query
    }

    /// Extra headers supplied by the caller
    pub fn header_list(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Cancellation token, if any
    pub fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancel.as_ref()
    }

    /// Whether the request has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    /// Report progress to the sink, if any
    pub fn report_progress(&self, value: f64) {
        if let Some(sink) = &self.progress {
            sink.report(value);
        }
    }

    /// Path plus rendered query; used as the cache key
    pub fn uri(&self) -> String {
        match self.query.to_query_string() {
            Some(query) => format!("{}{query}", self.path),
            None => self.path.clone(),
        }
    }
}

impl fmt::Debug for RequestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestDescriptor")
            .field("uri", &self.uri())
            .field("headers", &self.headers)
            .field("has_cancel", &self.cancel.is_some())
            .field("has_progress", &self.progress.is_some())
            .finish()
    }
}

fn is_absolute(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}
