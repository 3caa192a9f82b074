//! Transport boundary and the bundled HTTP implementation.
//!
//! The catalog logic never talks to the network directly: it builds
//! [`ApiRequest`] values and hands them to a [`Transport`]. Authentication,
//! retries and throttling are the transport's business.
//!
//! [`HttpClient`] is the provided reqwest transport:
//!
//! - **Authentication**: HTTP Basic credentials from the config on every request
//! - **Rate Limiting**: Optional minimum delay between requests
//! - **Retry Logic**: Bounded retries with exponential backoff on 429 and connection errors
//!
//! # Examples
//!
//! ```rust,no_run
//! use hondana::config::KomgaConfig;
//! use hondana::net::{ApiRequest, HttpClient, Transport};
//!
//! # async fn example() -> hondana::Result<()> {
//! let config = KomgaConfig::builder()
//!     .base_url("https://demo.komga.org")
//!     .username("demo@komga.org")
//!     .password("komga-demo")
//!     .build()?;
//! let client = HttpClient::new(&config)?;
//!
//! let body = client.issue(&ApiRequest::get("/series/new").param("page", 0)).await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use reqwest::{Client, Method, StatusCode};
use std::time::Duration;
use tokio::time::Instant;

use crate::config::KomgaConfig;

pub mod json;

/// One request against the REST API, relative to the API root.
///
/// Two requests built from the same arguments compare equal, which is what
/// makes paged fetches reproducible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,

    /// Path below the API root, starting with `/`
    pub path: String,

    /// Query parameters in insertion order
    pub query: Vec<(String, String)>,
}

impl ApiRequest {
    /// Creates a GET request for `path`.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            query: Vec::new(),
        }
    }

    /// Appends a query parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((name.into(), value.to_string()));
        self
    }

    /// Appends several query parameters, keeping their order.
    pub fn params<'a>(mut self, params: impl IntoIterator<Item = &'a (String, String)>) -> Self {
        self.query.extend(params.into_iter().cloned());
        self
    }

    /// Value of the first query parameter named `name`.
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Collaborator that turns an [`ApiRequest`] into a raw response body.
///
/// Implementations inject authentication and may retry; callers treat every
/// error as final for that request.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn issue(&self, request: &ApiRequest) -> crate::Result<Bytes>;
}

/// Minimum-delay rate limiter for one server.
///
/// A delay of zero turns [`wait`](RateLimiter::wait) into a no-op.
#[derive(Debug)]
pub struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    delay: Duration,
}

impl RateLimiter {
    /// Creates a new rate limiter with the specified delay in milliseconds.
    pub fn new(delay_ms: u64) -> Self {
        Self {
            last_request: Mutex::new(None),
            delay: Duration::from_millis(delay_ms),
        }
    }

    /// Waits until this caller's request slot comes up.
    ///
    /// Each caller reserves the slot `delay` after the previous one under a
    /// single lock, so concurrent callers are spaced out too.
    pub async fn wait(&self) {
        if self.delay.is_zero() {
            return;
        }

        let slot = {
            let mut last = self.last_request.lock();
            let now = Instant::now();
            let slot = match *last {
                Some(previous) => (previous + self.delay).max(now),
                None => now,
            };
            *last = Some(slot);
            slot
        };

        tokio::time::sleep_until(slot).await;
    }
}

/// reqwest-backed [`Transport`] for one Komga server.
///
/// Each instance owns its own connection pool, so connectors for different
/// servers never share state.
#[derive(Debug)]
pub struct HttpClient {
    client: Client,
    api_base: String,
    username: String,
    password: String,
    rate_limiter: RateLimiter,
    max_retries: u32,
}

impl HttpClient {
    /// Creates a client from the connection settings of `config`.
    ///
    /// # Errors
    ///
    /// * [`Error::Network`](crate::Error::Network) - If the TLS backend cannot be initialized
    pub fn new(config: &KomgaConfig) -> crate::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .pool_max_idle_per_host(10)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base(),
            username: config.username.clone(),
            password: config.password.clone(),
            rate_limiter: RateLimiter::new(config.rate_limit_ms),
            max_retries: config.max_retries,
        })
    }

    fn url(&self, request: &ApiRequest) -> String {
        format!("{}{}", self.api_base, request.path)
    }
}

/// Upper bound of a single retry backoff.
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Exponential backoff for retry `attempt`, capped at [`MAX_BACKOFF`].
fn backoff(attempt: u32) -> Duration {
    Duration::from_secs(2_u64.saturating_pow(attempt)).min(MAX_BACKOFF)
}

#[async_trait]
impl Transport for HttpClient {
    /// Performs the request with Basic authentication, rate limiting and
    /// retries.
    ///
    /// 429 responses and connection failures are retried up to
    /// `max_retries` times with exponential backoff. Any other non-success
    /// status is returned as [`Error::Transport`](crate::Error::Transport).
    async fn issue(&self, request: &ApiRequest) -> crate::Result<Bytes> {
        let url = self.url(request);
        let mut attempts = 0;

        loop {
            self.rate_limiter.wait().await;
            tracing::debug!(method = %request.method, %url, query = ?request.query, "issuing request");

            let sent = self
                .client
                .request(request.method.clone(), &url)
                .query(&request.query)
                .basic_auth(&self.username, Some(&self.password))
                .send()
                .await;

            match sent {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response.bytes().await?);
                    }

                    if status == StatusCode::TOO_MANY_REQUESTS && attempts < self.max_retries {
                        attempts += 1;
                        let delay = backoff(attempts);
                        tracing::warn!(%url, attempts, "rate limited by server, backing off");
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    return Err(crate::Error::transport(
                        Some(status.as_u16()),
                        format!("{} returned HTTP {}", request.path, status),
                    ));
                }
                Err(e) => {
                    if (e.is_connect() || e.is_timeout()) && attempts < self.max_retries {
                        attempts += 1;
                        tracing::warn!(%url, attempts, error = %e, "request failed, retrying");
                        tokio::time::sleep(Duration::from_secs(1)).await;
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }
    }
}
