//! Cursor-driven pagination over a page-fetch function.
//!
//! [`Pages`] calls the fetch function with no cursor first, then with each
//! page's `next_cursor`, and stops after the page whose cursor is absent, null
//! or empty. Fetches are strictly sequential. Sequences are single-pass: once
//! exhausted (or failed) they stay exhausted.

use std::mem;

use futures_util::future::BoxFuture;
use futures_util::stream::{self, Stream};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One list response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    /// Cursor for the following page, if there is one.
    pub fn next(&self) -> Option<&str> {
        self.next_cursor.as_deref().filter(|c| !c.is_empty())
    }
}

type FetchPage<'a, T> = Box<dyn FnMut(Option<String>) -> BoxFuture<'a, Result<Page<T>>> + Send + 'a>;

enum Cursor {
    Start,
    Next(String),
    Done,
}

/// Lazy sequence of page `data` arrays.
pub struct Pages<'a, T> {
    fetch: FetchPage<'a, T>,
    cursor: Cursor,
}

impl<'a, T: Send + 'a> Pages<'a, T> {
    pub fn new<F>(fetch: F) -> Self
    where
        F: FnMut(Option<String>) -> BoxFuture<'a, Result<Page<T>>> + Send + 'a,
    {
        Self {
            fetch: Box::new(fetch),
            cursor: Cursor::Start,
        }
    }

    /// Fetches the next page. `None` once the sequence is over.
    ///
    /// A failed fetch is returned once and ends the sequence.
    pub async fn next_page(&mut self) -> Option<Result<Vec<T>>> {
        let cursor = match mem::replace(&mut self.cursor, Cursor::Done) {
            Cursor::Start => None,
            Cursor::Next(c) => Some(c),
            Cursor::Done => return None,
        };
        match (self.fetch)(cursor).await {
            Ok(page) => {
                if let Some(next) = page.next() {
                    self.cursor = Cursor::Next(next.to_string());
                }
                Some(Ok(page.data))
            }
            Err(e) => Some(Err(e)),
        }
    }

    /// Drains every remaining page into one vector, in fetch order.
    /// Memory grows with the result set; use [`Pages::next_page`] or
    /// [`Pages::items`] to bound it.
    pub async fn collect_all(mut self) -> Result<Vec<T>> {
        let mut all = Vec::new();
        while let Some(page) = self.next_page().await {
            all.extend(page?);
        }
        Ok(all)
    }

    pub fn items(self) -> Items<'a, T> {
        Items {
            pages: self,
            buffered: Vec::new().into_iter(),
        }
    }

    pub fn into_stream(self) -> impl Stream<Item = Result<Vec<T>>> + Send + 'a {
        stream::unfold(self, |mut pages| async move {
            pages.next_page().await.map(|page| (page, pages))
        })
    }
}

/// Lazy sequence of individual items, flattened from [`Pages`].
pub struct Items<'a, T> {
    pages: Pages<'a, T>,
    buffered: std::vec::IntoIter<T>,
}

impl<'a, T: Send + 'a> Items<'a, T> {
    pub async fn next_item(&mut self) -> Option<Result<T>> {
        loop {
            if let Some(item) = self.buffered.next() {
                return Some(Ok(item));
            }
            match self.pages.next_page().await? {
                Ok(data) => self.buffered = data.into_iter(),
                Err(e) => return Some(Err(e)),
            }
        }
    }

    pub fn into_stream(self) -> impl Stream<Item = Result<T>> + Send + 'a {
        stream::unfold(self, |mut items| async move {
            items.next_item().await.map(|item| (item, items))
        })
    }
}
