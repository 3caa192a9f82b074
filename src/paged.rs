//! Cursor-based page fetching over collection endpoints.
//!
//! [`PagedFetcher`] is stateless: the caller owns the cursor and the page
//! size. Each call issues exactly one request, and identical arguments always
//! produce an identical [`ApiRequest`].

use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::{
    error::{Error, Result},
    net::{ApiRequest, Transport, json},
    types::Cursor,
};

/// One page of raw items.
///
/// `has_more` is `false` exactly when `items` is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_more: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>) -> Self {
        let has_more = !items.is_empty();
        Self { items, has_more }
    }

    /// Maps the items while keeping the termination flag.
    pub fn map<U>(self, f: impl FnOnce(Vec<T>) -> Vec<U>) -> Page<U> {
        Page {
            items: f(self.items),
            has_more: self.has_more,
        }
    }
}

/// Builds collection requests and decodes their envelopes.
#[derive(Clone)]
pub struct PagedFetcher {
    transport: Arc<dyn Transport>,
}

impl PagedFetcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Request issued for page `cursor` of `path`.
    pub fn page_request(
        path: &str,
        cursor: Cursor,
        page_size: u32,
        extra: &[(String, String)],
    ) -> ApiRequest {
        ApiRequest::get(path)
            .param("page", cursor)
            .param("size", page_size)
            .params(extra)
    }

    /// Fetches one page of `path`.
    ///
    /// # Errors
    ///
    /// * [`Error::Config`] - If `page_size` is zero
    /// * [`Error::Network`] / [`Error::Transport`] - If the request fails
    /// * [`Error::Parse`] - If the body is not a page envelope
    pub async fn fetch<T>(
        &self,
        path: &str,
        cursor: Cursor,
        page_size: u32,
        extra: &[(String, String)],
    ) -> Result<Page<T>>
    where
        T: DeserializeOwned,
    {
        if page_size == 0 {
            return Err(Error::config("page size must be greater than zero"));
        }

        let request = Self::page_request(path, cursor, page_size, extra);
        let body = self.transport.issue(&request).await?;
        let items: Vec<T> = json::parse_content(&body)?;

        tracing::debug!(path, cursor, page_size, items = items.len(), "fetched page");
        Ok(Page::new(items))
    }

    /// Fetches a whole collection in one request (`unpaged=true`).
    pub async fn fetch_unpaged<T>(&self, path: &str, extra: &[(String, String)]) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let request = ApiRequest::get(path).param("unpaged", true).params(extra);
        let body = self.transport.issue(&request).await?;
        json::parse_content(&body)
    }

    /// Fetches a single record, or a bare JSON array.
    pub async fn fetch_record<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let body = self.transport.issue(&ApiRequest::get(path)).await?;
        json::parse(&body)
    }
}

/// Percent-encodes one path segment (an identifier).
pub(crate) fn segment(id: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(id)
}
