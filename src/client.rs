//! BeatSaver API client
//!
//! [`BeatSaver`] is a cheap-to-clone handle over one HTTP client and cache.
//! Entities and pages it returns hold a [`ClientHandle`], a weak reference
//! back to it, so they can fetch more data without outliving the client.

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::http::{HttpClient, ResponseCache};
use crate::models::{Beatmap, User};
use crate::pagination::{
    Page, PageContext, PageStream, PagedOptions, PagedRequestOptions, RequestOptions,
    SearchRequestOptions,
};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::debug;
use url::form_urlencoded::byte_serialize;
use url::Url;

// ============================================================================
// Client Handle
// ============================================================================

pub(crate) struct ClientInner {
    http: HttpClient,
    config: ClientConfig,
}

/// Weak reference from a returned entity or page back to its client
#[derive(Clone, Default)]
pub struct ClientHandle {
    inner: Weak<ClientInner>,
}

impl ClientHandle {
    /// Handle that is not attached to any client
    pub fn detached() -> Self {
        Self::default()
    }

    /// Whether the client is still alive
    pub fn is_attached(&self) -> bool {
        self.inner.strong_count() > 0
    }

    /// Get the client back, or [`Error::Detached`] if it has been dropped
    pub fn upgrade(&self) -> Result<BeatSaver> {
        self.inner
            .upgrade()
            .map(|inner| BeatSaver { inner })
            .ok_or(Error::Detached)
    }
}

impl fmt::Debug for ClientHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientHandle")
            .field("attached", &self.is_attached())
            .finish()
    }
}

/// Values that keep a handle to the client that produced them
pub trait Attach {
    /// Point this value (and anything nested in it) at `client`
    fn attach(&mut self, client: &ClientHandle);
}

impl Attach for serde_json::Value {
    fn attach(&mut self, _client: &ClientHandle) {}
}

// ============================================================================
// Client
// ============================================================================

/// Client for the BeatSaver API
#[derive(Clone)]
pub struct BeatSaver {
    inner: Arc<ClientInner>,
}

impl BeatSaver {
    /// Create a client from a config
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = HttpClient::new(&config)?;
        Ok(Self::from_parts(http, config))
    }

    /// Create a client that stores responses in `cache`
    pub fn with_cache(config: ClientConfig, cache: Arc<dyn ResponseCache>) -> Result<Self> {
        let http = HttpClient::with_cache(&config, cache)?;
        Ok(Self::from_parts(http, config))
    }

    fn from_parts(http: HttpClient, config: ClientConfig) -> Self {
        debug!(base_url = %config.base_url, user_agent = %config.user_agent(), "Created client");
        Self {
            inner: Arc::new(ClientInner { http, config }),
        }
    }

    /// Client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Underlying HTTP client
    pub fn http(&self) -> &HttpClient {
        &self.inner.http
    }

    /// Weak handle to this client
    pub fn handle(&self) -> ClientHandle {
        ClientHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Resolve an asset URL against the instance base URL
    pub fn asset_url(&self, url: &str) -> Result<Url> {
        if let Ok(absolute) = Url::parse(url) {
            return Ok(absolute);
        }
        let base = self.inner.config.base_url.trim_end_matches('/');
        let separator = if url.starts_with('/') { "" } else { "/" };
        Ok(Url::parse(&format!("{base}{separator}{url}"))?)
    }

    // ========================================================================
    // Single Beatmaps
    // ========================================================================

    /// Fetch a beatmap by its hex key
    pub async fn beatmap_by_key(&self, key: &str, options: &RequestOptions) -> Result<Option<Beatmap>> {
        let key = require("key", key)?;
        self.fetch_single(&format!("maps/detail/{key}"), options).await
    }

    /// Fetch a beatmap by its SHA1 hash
    pub async fn beatmap_by_hash(&self, hash: &str, options: &RequestOptions) -> Result<Option<Beatmap>> {
        let hash = require("hash", hash)?;
        self.fetch_single(&format!("maps/by-hash/{hash}"), options).await
    }

    /// Fetch a beatmap's current name, description and stats by hash
    pub async fn beatmap_stats_by_hash(
        &self,
        hash: &str,
        options: &RequestOptions,
    ) -> Result<Option<Beatmap>> {
        let hash = require("hash", hash)?;
        self.fetch_single(&format!("stats/hash/{hash}"), options).await
    }

    // ========================================================================
    // Feeds
    // ========================================================================

    /// Beatmaps ordered by upload date
    pub async fn latest(&self, options: PagedRequestOptions) -> Result<Page<Beatmap>> {
        self.fetch_page("maps/latest", Arc::new(options)).await
    }

    /// Beatmaps ordered by heat
    pub async fn hot(&self, options: PagedRequestOptions) -> Result<Page<Beatmap>> {
        self.fetch_page("maps/hot", Arc::new(options)).await
    }

    /// Beatmaps ordered by rating
    pub async fn rating(&self, options: PagedRequestOptions) -> Result<Page<Beatmap>> {
        self.fetch_page("maps/rating", Arc::new(options)).await
    }

    /// Beatmaps ordered by download count
    pub async fn downloads(&self, options: PagedRequestOptions) -> Result<Page<Beatmap>> {
        self.fetch_page("maps/downloads", Arc::new(options)).await
    }

    /// Stream of every beatmap, ordered by upload date
    pub fn latest_stream(&self, options: PagedRequestOptions) -> PageStream<Beatmap> {
        let client = self.clone();
        PageStream::lazy(async move { client.latest(options).await })
    }

    /// Stream of every beatmap, ordered by heat
    pub fn hot_stream(&self, options: PagedRequestOptions) -> PageStream<Beatmap> {
        let client = self.clone();
        PageStream::lazy(async move { client.hot(options).await })
    }

    /// Stream of every beatmap, ordered by rating
    pub fn rating_stream(&self, options: PagedRequestOptions) -> PageStream<Beatmap> {
        let client = self.clone();
        PageStream::lazy(async move { client.rating(options).await })
    }

    /// Stream of every beatmap, ordered by download count
    pub fn downloads_stream(&self, options: PagedRequestOptions) -> PageStream<Beatmap> {
        let client = self.clone();
        PageStream::lazy(async move { client.downloads(options).await })
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Text search
    pub async fn search(&self, options: SearchRequestOptions) -> Result<Page<Beatmap>> {
        self.fetch_page("search/text", Arc::new(options)).await
    }

    /// Advanced search using Lucene syntax
    pub async fn search_advanced(&self, options: SearchRequestOptions) -> Result<Page<Beatmap>> {
        self.fetch_page("search/advanced", Arc::new(options)).await
    }

    /// Stream of every text search result
    pub fn search_stream(&self, options: SearchRequestOptions) -> PageStream<Beatmap> {
        let client = self.clone();
        PageStream::lazy(async move { client.search(options).await })
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// Fetch a user by ID
    pub async fn user(&self, id: &str, options: &RequestOptions) -> Result<Option<User>> {
        let id = require("id", id)?;
        self.fetch_single(&format!("users/find/{id}"), options).await
    }

    /// Beatmaps uploaded by the user with `id`
    pub async fn uploads(&self, id: &str, options: PagedRequestOptions) -> Result<Page<Beatmap>> {
        let id = require("id", id)?;
        self.fetch_page(&format!("maps/uploader/{id}"), Arc::new(options)).await
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Download raw bytes from an asset URL; 404 is an error here
    pub(crate) async fn fetch_asset(&self, url: &str, options: &RequestOptions) -> Result<Bytes> {
        let url = self.asset_url(url)?;
        let request = options.descriptor(url.as_str());
        self.inner
            .http
            .fetch_bytes(&request)
            .await?
            .ok_or_else(|| Error::http_status(404, "Not Found"))
    }

    async fn fetch_single<T>(&self, path: &str, options: &RequestOptions) -> Result<Option<T>>
    where
        T: DeserializeOwned + Attach,
    {
        let request = options.descriptor(path);
        let mut value: Option<T> = self.inner.http.fetch_json(&request).await?;
        if let Some(ref mut value) = value {
            value.attach(&self.handle());
        }
        Ok(value)
    }

    /// Fetch one page of `path` and wire it up for further navigation
    pub(crate) async fn fetch_page<T>(&self, path: &str, options: Arc<dyn PagedOptions>) -> Result<Page<T>>
    where
        T: DeserializeOwned + Attach,
    {
        let request = options.descriptor(path)?;
        let index = options.page();

        let mut page: Page<T> = self
            .inner
            .http
            .fetch_json(&request)
            .await?
            .ok_or_else(|| Error::http_status(404, "Not Found"))?;

        let handle = self.handle();
        for item in &mut page.items {
            item.attach(&handle);
        }
        page.attach_context(index, PageContext::new(handle, path, options));

        debug!(path, index, items = page.len(), next = ?page.next_index, "Fetched page");
        Ok(page)
    }
}

impl fmt::Debug for BeatSaver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeatSaver")
            .field("base_url", &self.inner.config.base_url)
            .field("http", &self.inner.http)
            .finish()
    }
}

/// Reject blank identifiers and percent-encode the rest as one path segment
fn require(name: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::invalid_argument(name));
    }
    Ok(byte_serialize(value.as_bytes())
        .map(|part| if part == "+" { "%20" } else { part })
        .collect())
}
