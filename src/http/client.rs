//! Streaming fetcher with rate limit handling and ETag caching
//!
//! Provides an HTTP client that handles:
//! - Conditional requests against the response cache (If-None-Match)
//! - HTTP 429 sleep-until-reset and retry, bounded only by cancellation
//!   and the optional attempt ceiling
//! - Chunked body reads with progress reporting and cancellation checks
//! - Status classification (404 passes through, other failures are errors)

use super::cache::{MemoryCache, ResponseCache};
use super::rate_limit::{RateLimitHeaders, RateLimitInfo, Throttle};
use super::request::RequestDescriptor;
use super::response::Response;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use bytes::{Bytes, BytesMut};
use chrono::Utc;
use futures::TryStreamExt;
use reqwest::header::IF_NONE_MATCH;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::io;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio_util::io::StreamReader;
use tracing::{debug, trace, warn};
use url::Url;

/// Size of each body read
pub const CHUNK_SIZE: usize = 8 * 1024;

/// Headers the fetcher manages itself; caller-supplied values are dropped
const MANAGED_HEADERS: [&str; 2] = ["user-agent", "if-none-match"];

/// HTTP client for GET requests against the API
pub struct HttpClient {
    client: Client,
    api_base: Url,
    cache: Option<Arc<dyn ResponseCache>>,
    throttle: Option<Throttle>,
    rate_limit_headers: RateLimitHeaders,
    handle_rate_limits: bool,
    max_rate_limit_retries: Option<u32>,
}

impl HttpClient {
    /// Create a client with an in-memory cache (unless caching is disabled)
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let cache: Option<Arc<dyn ResponseCache>> = if config.caching_enabled() {
            Some(Arc::new(MemoryCache::new()))
        } else {
            None
        };
        Self::build(config, cache)
    }

    /// Create a client using the given cache store
    pub fn with_cache(config: &ClientConfig, cache: Arc<dyn ResponseCache>) -> Result<Self> {
        let cache = config.caching_enabled().then_some(cache);
        Self::build(config, cache)
    }

    fn build(config: &ClientConfig, cache: Option<Arc<dyn ResponseCache>>) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent())
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base()?,
            cache,
            throttle: config.throttle.as_ref().map(Throttle::new),
            rate_limit_headers: config.rate_limit_headers.clone(),
            handle_rate_limits: config.handle_rate_limits,
            max_rate_limit_retries: config.max_rate_limit_retries,
        })
    }

    /// Root URL that relative request paths are joined onto
    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Response cache, when caching is enabled
    pub fn cache(&self) -> Option<&Arc<dyn ResponseCache>> {
        self.cache.as_ref()
    }

    /// Resolve a descriptor to an absolute URL
    pub fn build_url(&self, request: &RequestDescriptor) -> Result<Url> {
        Ok(self.api_base.join(&request.uri())?)
    }

    /// Execute a GET request.
    ///
    /// Returns the response for 2xx and 404 statuses; every other status is
    /// an error. A 304 for a validator held in the cache returns the cached
    /// response without reading a body.
    pub async fn fetch(&self, request: &RequestDescriptor) -> Result<Response> {
        let url = self.build_url(request)?;
        let uri = request.uri();
        let mut rate_limit_waits = 0u32;

        loop {
            ensure_not_cancelled(request)?;

            if let Some(ref throttle) = self.throttle {
                cancellable(request, throttle.wait()).await?;
            }

            // Re-checked on every attempt, the cache may have changed while sleeping
            let validator = match self.cache {
                Some(ref cache) => cache.usable_validator(&uri).await,
                None => None,
            };

            let mut req = self.client.get(url.clone());
            for (key, value) in request.header_list() {
                if is_managed_header(key) {
                    continue;
                }
                req = req.header(key.as_str(), value.as_str());
            }
            if let Some(ref validator) = validator {
                req = req.header(IF_NONE_MATCH, validator.as_str());
            }

            debug!(url = %url, conditional = validator.is_some(), "GET");
            let response = cancellable(request, req.send()).await??;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                let info = RateLimitInfo::from_headers(response.headers(), &self.rate_limit_headers)
                    .ok_or(Error::MalformedRateLimit {
                        status: status.as_u16(),
                    })?;

                if !self.handle_rate_limits {
                    return Err(Error::RateLimited { info });
                }
                if self
                    .max_rate_limit_retries
                    .is_some_and(|max| rate_limit_waits >= max)
                {
                    warn!(url = %url, waits = rate_limit_waits, "Rate limit retries exhausted");
                    return Err(Error::RateLimited { info });
                }
                rate_limit_waits += 1;

                if let Some(wait) = info.wait_duration(Utc::now()) {
                    warn!(
                        url = %url,
                        attempt = rate_limit_waits,
                        wait_ms = wait.as_millis() as u64,
                        "Rate limited (429), sleeping until reset"
                    );
                    cancellable(request, tokio::time::sleep(wait)).await?;
                }
                continue;
            }

            if status == StatusCode::NOT_MODIFIED {
                if let (Some(cache), Some(validator)) = (&self.cache, &validator) {
                    if let Some(cached) = cache.body_for(validator).await {
                        debug!(url = %url, validator = %validator, "Not modified, serving cached body");
                        return Ok(cached.cached_copy());
                    }
                }
            }

            if !status.is_success() && status != StatusCode::NOT_FOUND {
                return Err(Error::http_status(
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown"),
                ));
            }

            let rate_limit = RateLimitInfo::from_headers(response.headers(), &self.rate_limit_headers);
            let headers = response.headers().clone();
            let body = read_body(request, response).await?;
            let response = Response::new(status, headers, body, rate_limit);

            if status.is_success() {
                if let (Some(cache), Some(etag)) = (&self.cache, response.etag()) {
                    cache.store(&uri, etag, response.clone()).await;
                }
            }

            debug!(url = %url, status = status.as_u16(), bytes = response.bytes().len(), "Request succeeded");
            return Ok(response);
        }
    }

    /// Execute a GET and return the body bytes
    pub async fn fetch_bytes(&self, request: &RequestDescriptor) -> Result<Option<Bytes>> {
        let response = self.fetch(request).await?;
        if response.is_not_found() {
            return Ok(None);
        }
        Ok(Some(response.into_bytes()))
    }

    /// Execute a GET and decode the JSON body; `None` on 404
    pub async fn fetch_json<T: DeserializeOwned>(&self, request: &RequestDescriptor) -> Result<Option<T>> {
        let response = self.fetch(request).await?;
        if response.is_not_found() {
            return Ok(None);
        }
        response.json().map(Some)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("api_base", &self.api_base.as_str())
            .field("caching", &self.cache.is_some())
            .field("has_throttle", &self.throttle.is_some())
            .field("handle_rate_limits", &self.handle_rate_limits)
            .field("max_rate_limit_retries", &self.max_rate_limit_retries)
            .finish_non_exhaustive()
    }
}

/// Drain the body in fixed-size chunks, reporting progress after each one
async fn read_body(request: &RequestDescriptor, response: reqwest::Response) -> Result<Bytes> {
    let content_length = response.content_length().filter(|&len| len > 0);
    let stream = response.bytes_stream().map_err(io::Error::other);
    let mut reader = std::pin::pin!(StreamReader::new(stream));

    let mut buffer = [0u8; CHUNK_SIZE];
    let mut body = BytesMut::new();
    request.report_progress(0.0);

    loop {
        ensure_not_cancelled(request)?;

        let read = cancellable(request, reader.read(&mut buffer))
            .await?
            .map_err(body_error)?;
        if read == 0 {
            break;
        }
        body.extend_from_slice(&buffer[..read]);

        if let Some(total) = content_length {
            request.report_progress((body.len() as f64 / total as f64).min(1.0));
        }
        trace!(read = body.len(), total = ?content_length, "Read body chunk");
    }

    request.report_progress(1.0);
    Ok(body.freeze())
}

/// Recover the transport error wrapped by the stream reader
fn body_error(err: io::Error) -> Error {
    if err.get_ref().is_some_and(|inner| inner.is::<reqwest::Error>()) {
        if let Some(inner) = err.into_inner() {
            if let Ok(e) = inner.downcast::<reqwest::Error>() {
                return Error::Http(*e);
            }
        }
        return Error::Io(io::Error::other("body stream failed"));
    }
    Error::Io(err)
}

fn ensure_not_cancelled(request: &RequestDescriptor) -> Result<()> {
    if request.is_cancelled() {
        return Err(Error::Cancelled);
    }
    Ok(())
}

/// Race `fut` against the request's cancellation token
async fn cancellable<F: Future>(request: &RequestDescriptor, fut: F) -> Result<F::Output> {
    match request.cancellation() {
        Some(token) => tokio::select! {
            biased;
            () = token.cancelled() => Err(Error::Cancelled),
            out = fut => Ok(out),
        },
        None => Ok(fut.await),
    }
}

fn is_managed_header(name: &str) -> bool {
    MANAGED_HEADERS
        .iter()
        .any(|managed| managed.eq_ignore_ascii_case(name))
}
