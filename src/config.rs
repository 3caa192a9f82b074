//! Connector configuration.
//!
//! Every value that identifies a server or shapes a request (credentials,
//! page sizes, timeouts) lives in one immutable [`KomgaConfig`] that is
//! injected into the transport and into every component. Two connectors built
//! from two configs never share state.
//!
//! # Examples
//!
//! ```rust
//! use hondana::config::KomgaConfig;
//!
//! let config = KomgaConfig::builder()
//!     .base_url("https://demo.komga.org")
//!     .username("demo@komga.org")
//!     .password("komga-demo")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.page_size, 40);
//! assert_eq!(config.api_base(), "https://demo.komga.org/api/v1");
//! ```
//!
//! The same values can be read from TOML:
//!
//! ```rust
//! use hondana::config::KomgaConfig;
//!
//! let config = KomgaConfig::from_toml_str(r#"
//!     base_url = "http://localhost:25600"
//!     username = "admin@example.org"
//!     password = "secret"
//!     page_size = 25
//! "#).unwrap();
//!
//! assert_eq!(config.page_size, 25);
//! assert_eq!(config.section_page_size, 20);
//! ```

use derive_builder::{Builder, UninitializedFieldError};
use serde::Deserialize;
use std::path::Path;

use crate::error::{Error, Result};

/// Number of items requested by paged listings, search and update scans.
pub const DEFAULT_PAGE_SIZE: u32 = 40;

/// Number of items requested for the first page of each home section.
pub const DEFAULT_SECTION_PAGE_SIZE: u32 = 20;

/// Upper bound accepted for `max_retries`.
pub const MAX_RETRIES: u32 = 10;

const API_PATH: &str = "/api/v1";

/// Immutable settings for one Komga connector instance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Builder)]
#[builder(setter(into), build_fn(error = "Error"))]
pub struct KomgaConfig {
    /// Identifier of this source inside a [`Sources`](crate::Sources) collection
    #[serde(default = "default_id")]
    #[builder(default = "default_id()")]
    pub id: String,

    /// Display name of the source
    #[serde(default = "default_name")]
    #[builder(default = "default_name()")]
    pub name: String,

    /// Server root, e.g. `https://demo.komga.org`
    pub base_url: String,

    pub username: String,

    pub password: String,

    /// Items per page for search, view-more and update scans
    #[serde(default = "default_page_size")]
    #[builder(default = "DEFAULT_PAGE_SIZE")]
    pub page_size: u32,

    /// Items per home section first page
    #[serde(default = "default_section_page_size")]
    #[builder(default = "DEFAULT_SECTION_PAGE_SIZE")]
    pub section_page_size: u32,

    #[serde(default = "default_timeout_secs")]
    #[builder(default = "30")]
    pub timeout_secs: u64,

    /// Minimum delay between two requests, 0 disables the limiter
    #[serde(default)]
    #[builder(default)]
    pub rate_limit_ms: u64,

    /// Retries performed by the HTTP transport on 429 and connection errors
    #[serde(default = "default_max_retries")]
    #[builder(default = "3")]
    pub max_retries: u32,

    #[serde(default = "default_user_agent")]
    #[builder(default = "default_user_agent()")]
    pub user_agent: String,
}

fn default_id() -> String {
    "komga".to_string()
}

fn default_name() -> String {
    "Komga".to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_section_page_size() -> u32 {
    DEFAULT_SECTION_PAGE_SIZE
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_user_agent() -> String {
    format!("Hondana/{}", env!("CARGO_PKG_VERSION"))
}

impl From<UninitializedFieldError> for Error {
    fn from(e: UninitializedFieldError) -> Self {
        Error::config(format!("missing field `{}`", e.field_name()))
    }
}

impl KomgaConfig {
    /// Starts a builder with every optional field at its default.
    pub fn builder() -> KomgaConfigBuilder {
        KomgaConfigBuilder::default()
    }

    /// Parses a configuration from TOML text and validates it.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: KomgaConfig =
            toml::from_str(text).map_err(|e| Error::config(format!("invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a TOML configuration file.
    pub async fn from_file(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks that the base URL is an absolute http(s) URL, that page sizes
    /// are positive and that `max_retries` stays within [`MAX_RETRIES`].
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.base_url)
            .map_err(|e| Error::config(format!("invalid base_url `{}`: {}", self.base_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "unsupported base_url scheme `{}`",
                url.scheme()
            )));
        }
        if self.page_size == 0 {
            return Err(Error::config("page_size must be greater than zero"));
        }
        if self.section_page_size == 0 {
            return Err(Error::config("section_page_size must be greater than zero"));
        }
        if self.max_retries > MAX_RETRIES {
            return Err(Error::config(format!(
                "max_retries must be at most {}",
                MAX_RETRIES
            )));
        }
        Ok(())
    }

    /// Root of the REST API, without trailing slash.
    pub fn api_base(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), API_PATH)
    }
}
