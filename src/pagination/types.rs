//! Page envelope and cursor
//!
//! A [`Page`] is one decoded result page plus the context needed to fetch
//! its neighbours: a weak handle to the client, the endpoint path and the
//! option set that produced it.

use super::options::{PagedOptions, RequestOptions};
use crate::client::{Attach, ClientHandle};
use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Page Context
// ============================================================================

/// Everything a page needs to request another page of the same listing
#[derive(Clone)]
pub struct PageContext {
    client: ClientHandle,
    path: String,
    options: Arc<dyn PagedOptions>,
}

impl PageContext {
    pub(crate) fn new(client: ClientHandle, path: impl Into<String>, options: Arc<dyn PagedOptions>) -> Self {
        Self {
            client,
            path: path.into(),
            options,
        }
    }

    /// Endpoint path the page was fetched from (without the index)
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Options used for the page
    pub fn options(&self) -> &dyn PagedOptions {
        self.options.as_ref()
    }

    pub(crate) async fn fetch<T>(&self, index: u32, overrides: Option<&RequestOptions>) -> Result<Page<T>>
    where
        T: DeserializeOwned + Attach,
    {
        let client = self.client.upgrade()?;
        let options = self.options.clone_for_page(index, overrides);
        client.fetch_page(&self.path, options).await
    }
}

impl fmt::Debug for PageContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageContext")
            .field("path", &self.path)
            .field("options", &self.options)
            .field("attached", &self.client.is_attached())
            .finish()
    }
}

// ============================================================================
// Page
// ============================================================================

/// One page of a listing.
///
/// `previous_index` is `None` exactly when `current_index` is 0, and
/// `next_index` is `None` exactly when `current_index == last_index`. Both
/// come from the server and are not recomputed.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    /// Items on this page
    #[serde(rename = "docs", alias = "items", default = "Vec::new")]
    pub items: Vec<T>,

    /// Total number of items across all pages
    #[serde(rename = "totalDocs", alias = "totalCount", default)]
    pub total_count: u64,

    /// Index of this page
    #[serde(skip)]
    pub current_index: u32,

    /// Index of the last page
    #[serde(
        rename = "lastPage",
        alias = "lastIndex",
        default,
        deserialize_with = "non_negative_index"
    )]
    pub last_index: u32,

    /// Index of the previous page
    #[serde(rename = "prevPage", alias = "previousIndex", default)]
    pub previous_index: Option<u32>,

    /// Index of the next page
    #[serde(rename = "nextPage", alias = "nextIndex", default)]
    pub next_index: Option<u32>,

    #[serde(skip)]
    context: Option<PageContext>,
}

/// Empty listings report a last index of -1
fn non_negative_index<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<i64>::deserialize(deserializer)?.unwrap_or(0);
    Ok(u32::try_from(value.max(0)).unwrap_or(u32::MAX))
}

impl<T> Page<T> {
    /// Create a page without client context
    pub fn new(
        items: Vec<T>,
        total_count: u64,
        current_index: u32,
        last_index: u32,
        previous_index: Option<u32>,
        next_index: Option<u32>,
    ) -> Self {
        Self {
            items,
            total_count,
            current_index,
            last_index,
            previous_index,
            next_index,
            context: None,
        }
    }

    pub(crate) fn attach_context(&mut self, index: u32, context: PageContext) {
        self.current_index = index;
        self.context = Some(context);
    }

    /// Context used to fetch neighbouring pages, if any
    pub fn context(&self) -> Option<&PageContext> {
        self.context.as_ref()
    }

    /// Items on this page
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Take the items, dropping the page
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Number of items on this page
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether this page has no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether a next page exists
    pub fn has_next(&self) -> bool {
        self.next_index.is_some()
    }

    /// Whether a previous page exists
    pub fn has_previous(&self) -> bool {
        self.previous_index.is_some()
    }
}

impl<T> Page<T>
where
    T: DeserializeOwned + Attach,
{
    /// Fetch the next page
    pub async fn next(&self, overrides: Option<&RequestOptions>) -> Result<Page<T>> {
        let index = self.next_index.ok_or(Error::NoNextPage)?;
        self.at(index, overrides).await
    }

    /// Fetch the previous page
    pub async fn previous(&self, overrides: Option<&RequestOptions>) -> Result<Page<T>> {
        let index = self.previous_index.ok_or(Error::NoPreviousPage)?;
        self.at(index, overrides).await
    }

    /// Fetch an arbitrary page of the same listing.
    ///
    /// Indices past `last_index` are not an error; the server answers with an
    /// empty page.
    pub async fn at(&self, index: u32, overrides: Option<&RequestOptions>) -> Result<Page<T>> {
        let context = self.context.as_ref().ok_or(Error::Detached)?;
        context.fetch(index, overrides).await
    }
}
