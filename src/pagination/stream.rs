//! Lazy item stream over successive pages

use super::types::{Page, PageContext};
use crate::client::Attach;
use crate::error::{Error, Result};
use futures::future;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Forward-only stream of items across pages.
///
/// Yields every item of the current page, then fetches the next one. The
/// only suspension points are page fetches. A failed fetch is yielded once
/// and ends the stream. The stream consumes its starting page, so a second
/// traversal has to start from a clone of it.
pub struct PageStream<T> {
    inner: BoxStream<'static, Result<T>>,
}

struct Cursor<T> {
    items: std::vec::IntoIter<T>,
    next_index: Option<u32>,
    context: Option<PageContext>,
}

impl<T> Cursor<T> {
    fn new(page: Page<T>) -> Self {
        Self {
            next_index: page.next_index,
            context: page.context().cloned(),
            items: page.into_items().into_iter(),
        }
    }
}

impl<T> PageStream<T>
where
    T: DeserializeOwned + Attach + Send + 'static,
{
    /// Stream starting at `page`
    pub fn new(page: Page<T>) -> Self {
        let inner = stream::unfold(Some(Cursor::new(page)), |state| async move {
            let mut cursor = state?;
            loop {
                if let Some(item) = cursor.items.next() {
                    return Some((Ok(item), Some(cursor)));
                }
                let index = cursor.next_index?;
                let fetched = match cursor.context {
                    Some(ref context) => context.fetch(index, None).await,
                    None => Err(Error::Detached),
                };
                match fetched {
                    Ok(next) => cursor = Cursor::new(next),
                    Err(e) => return Some((Err(e), None)),
                }
            }
        });

        Self {
            inner: inner.boxed(),
        }
    }

    /// Stream whose first page is produced by `first`
    pub fn lazy<F>(first: F) -> Self
    where
        F: Future<Output = Result<Page<T>>> + Send + 'static,
    {
        let inner = stream::once(first)
            .map(|first| match first {
                Ok(page) => Self::new(page).inner,
                Err(e) => stream::once(future::ready(Err(e))).boxed(),
            })
            .flatten();

        Self {
            inner: inner.boxed(),
        }
    }
}

impl<T> Page<T>
where
    T: DeserializeOwned + Attach + Send + 'static,
{
    /// Consume the page into a stream over it and every following page
    pub fn into_stream(self) -> PageStream<T> {
        PageStream::new(self)
    }
}

impl<T> Stream for PageStream<T> {
    type Item = Result<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

impl<T> std::fmt::Debug for PageStream<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageStream").finish_non_exhaustive()
    }
}
