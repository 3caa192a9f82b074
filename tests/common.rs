//! Common test utilities
//!
//! An in-memory transport that serves canned Komga payloads and records every
//! request it receives, plus fixture builders.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};
use hondana::config::KomgaConfig;
use hondana::net::{ApiRequest, Transport};
use hondana::{Error, Result};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

#[allow(dead_code)]
pub const API_BASE: &str = "http://komga.test/api/v1";

#[derive(Clone)]
#[allow(dead_code)]
pub enum MockResponse {
    Json(Value),
    Raw(String),
    Status(u16),
    Delayed(Duration, Box<MockResponse>),
}

/// Transport double keyed by path and `page` query value.
#[derive(Default)]
#[allow(dead_code)]
pub struct MockTransport {
    routes: Mutex<HashMap<(String, Option<String>), MockResponse>>,
    requests: Mutex<Vec<ApiRequest>>,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Serves `response` for a request without `page` parameter.
    pub fn route(&self, path: &str, response: MockResponse) -> &Self {
        self.routes
            .lock()
            .insert((path.to_string(), None), response);
        self
    }

    /// Serves `response` for page `page` of `path`.
    pub fn route_page(&self, path: &str, page: u32, response: MockResponse) -> &Self {
        self.routes
            .lock()
            .insert((path.to_string(), Some(page.to_string())), response);
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }

    fn lookup(&self, request: &ApiRequest) -> Option<MockResponse> {
        let page = request.query_value("page").map(str::to_string);
        self.routes.lock().get(&(request.path.clone(), page)).cloned()
    }
}

#[allow(dead_code)]
async fn respond(path: &str, response: MockResponse) -> Result<Bytes> {
    let mut response = response;
    loop {
        match response {
            MockResponse::Json(value) => return Ok(Bytes::from(value.to_string())),
            MockResponse::Raw(text) => return Ok(Bytes::from(text)),
            MockResponse::Status(status) => {
                return Err(Error::transport(
                    Some(status),
                    format!("{} returned HTTP {}", path, status),
                ));
            }
            MockResponse::Delayed(delay, inner) => {
                tokio::time::sleep(delay).await;
                response = *inner;
            }
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn issue(&self, request: &ApiRequest) -> Result<Bytes> {
        self.requests.lock().push(request.clone());
        let response = self.lookup(request).unwrap_or(MockResponse::Status(404));
        respond(&request.path, response).await
    }
}

#[allow(dead_code)]
pub fn config() -> KomgaConfig {
    KomgaConfig::builder()
        .base_url("http://komga.test")
        .username("reader@komga.test")
        .password("secret")
        .build()
        .unwrap()
}

/// `2024-01-01T00:00:{seconds}Z`
#[allow(dead_code)]
pub fn at(seconds: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, seconds).unwrap()
}

#[allow(dead_code)]
pub fn envelope(items: Vec<Value>) -> MockResponse {
    MockResponse::Json(json!({
        "content": items,
        "number": 0,
        "totalPages": 1,
        "last": true,
    }))
}

#[allow(dead_code)]
pub fn empty_page() -> MockResponse {
    envelope(vec![])
}

/// Minimal series record as listed by collection endpoints.
#[allow(dead_code)]
pub fn series_item(id: &str, title: &str) -> Value {
    json!({
        "id": id,
        "name": title,
        "metadata": { "title": title, "status": "ONGOING" },
    })
}

/// Update-feed entry modified at `at(seconds)`.
#[allow(dead_code)]
pub fn feed_item(id: &str, seconds: u32) -> Value {
    json!({
        "id": id,
        "metadata": {
            "title": format!("Series {}", id),
            "lastModified": at(seconds).to_rfc3339(),
        },
    })
}

/// Full series record as returned by `/series/{id}`.
#[allow(dead_code)]
pub fn series_detail(id: &str) -> Value {
    json!({
        "id": id,
        "name": "Blame!",
        "metadata": {
            "status": "ENDED",
            "title": "Blame!",
            "summary": "",
            "language": "ja",
            "readingDirection": "RIGHT_TO_LEFT",
            "genres": ["Sci-Fi", "Cyberpunk"],
            "tags": ["megastructure"],
            "lastModified": "2024-01-01T00:00:30Z",
        },
        "booksMetadata": {
            "authors": [
                { "name": "Tsutomu Nihei", "role": "writer" },
                { "name": "Tsutomu Nihei", "role": "penciller" },
                { "name": "Someone Else", "role": "colorist" },
                { "name": "Co Writer", "role": "writer" },
            ],
            "summary": "Killy wanders the City.",
        },
    })
}

#[allow(dead_code)]
pub fn book(id: &str, number: &str, number_sort: f64, title: &str) -> Value {
    json!({
        "id": id,
        "seriesId": "S1",
        "size": "12.4 MiB",
        "fileLastModified": "2024-02-03T04:05:06Z",
        "metadata": {
            "title": title,
            "number": number,
            "numberSort": number_sort,
        },
    })
}
