//! Error types and result handling for Hondana operations.
//!
//! All operations return a [`Result<T>`] which is a type alias for
//! `std::result::Result<T, Error>`.
//!
//! # Error Categories
//!
//! - **Transport Errors**: Connection issues, timeouts, rejected credentials, HTTP errors
//! - **Parse Errors**: Payloads that are not the JSON the endpoint promises
//! - **Mapping Errors**: A well-formed record missing a field the catalog requires
//! - **Section Errors**: One home section failed while its siblings kept going
//! - **Scan Errors**: An update scan aborted part way through the feed
//! - **Config Errors**: Invalid connector configuration
//!
//! Hosts usually only need one distinction: [`Error::is_source_unavailable`]
//! tells whether the server could not be reached or did not answer properly,
//! which is the single retryable condition surfaced to users.
//!
//! # Examples
//!
//! ```rust
//! use hondana::Error;
//!
//! let error = Error::transport(Some(401), "Unauthorized");
//! assert!(error.is_source_unavailable());
//!
//! let error = Error::mapping("series", "metadata.title");
//! assert!(!error.is_source_unavailable());
//! ```

use thiserror::Error;

/// Type alias for Results with Hondana errors.
///
/// # Examples
///
/// ```rust
/// use hondana::{Result, Error};
///
/// fn example_operation() -> Result<String> {
///     Ok("Success".to_string())
/// }
///
/// fn example_with_error() -> Result<()> {
///     Err(Error::parse("Something went wrong"))
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all connector operations.
///
/// # Variants
///
/// * [`Network`](Error::Network) - HTTP client and connection errors
/// * [`Transport`](Error::Transport) - Non-success responses from the server
/// * [`Parse`](Error::Parse) - Payload format errors
/// * [`Json`](Error::Json) - JSON deserialization errors
/// * [`Mapping`](Error::Mapping) - Missing required field on a record
/// * [`Section`](Error::Section) - Isolated failure of one home section
/// * [`Scan`](Error::Scan) - Aborted update scan
/// * [`Config`](Error::Config) - Invalid configuration
#[derive(Error, Debug)]
pub enum Error {
    /// Network-related errors from HTTP operations.
    ///
    /// Wraps errors from the underlying HTTP client (reqwest): connection
    /// timeouts, DNS resolution failures, TLS errors.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered, but not with a success status.
    ///
    /// Rejected credentials surface here as `401`/`403`. `status` is `None`
    /// when the failure happened before a status was available.
    #[error("Transport error ({status:?}): {message}")]
    Transport {
        status: Option<u16>,
        message: String,
    },

    /// Payload format errors.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hondana::Error;
    ///
    /// let error = Error::parse("Expected a page envelope");
    /// ```
    #[error("Parse error: {0}")]
    Parse(String),

    /// JSON deserialization errors from serde_json.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required field is absent on an otherwise well-formed record.
    ///
    /// Fatal for that single entity only; siblings in the same page are
    /// still mapped.
    #[error("Mapping error: {record} is missing `{field}`")]
    Mapping { record: String, field: String },

    /// One home section could not be loaded.
    ///
    /// Never aborts the other sections of the same aggregation.
    #[error("Section [{section}] failed: {source}")]
    Section {
        section: String,
        #[source]
        source: Box<Error>,
    },

    /// An update scan stopped because fetching or reading a page failed.
    ///
    /// Batches delivered before the failure remain valid; the scan can be
    /// re-run from the same watermark.
    #[error("Update scan aborted at page {page}: {source}")]
    Scan {
        page: u32,
        #[source]
        source: Box<Error>,
    },

    /// Invalid connector configuration.
    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// Creates a parse error with the given message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }

    /// Creates a transport error from an optional HTTP status and a message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hondana::Error;
    ///
    /// let error = Error::transport(Some(503), "Service Unavailable");
    /// assert!(error.to_string().contains("503"));
    /// ```
    pub fn transport(status: Option<u16>, msg: impl Into<String>) -> Self {
        Error::Transport {
            status,
            message: msg.into(),
        }
    }

    /// Creates a mapping error naming the record kind and the missing field.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hondana::Error;
    ///
    /// let error = Error::mapping("book", "metadata.numberSort");
    /// assert!(error.to_string().contains("metadata.numberSort"));
    /// ```
    pub fn mapping(record: impl Into<String>, field: impl Into<String>) -> Self {
        Error::Mapping {
            record: record.into(),
            field: field.into(),
        }
    }

    /// Wraps the error that made the section `section` fail.
    pub fn section(section: impl Into<String>, source: Error) -> Self {
        Error::Section {
            section: section.into(),
            source: Box::new(source),
        }
    }

    /// Wraps the error that aborted an update scan at `page`.
    pub fn scan(page: u32, source: Error) -> Self {
        Error::Scan {
            page,
            source: Box::new(source),
        }
    }

    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Returns `true` when the server could not be reached or answered with
    /// something unusable.
    ///
    /// Hosts present this as one retryable "source unavailable" condition.
    /// A scan or section aborted by such an error is classified the same way.
    pub fn is_source_unavailable(&self) -> bool {
        match self {
            Error::Network(_) | Error::Transport { .. } | Error::Parse(_) | Error::Json(_) => true,
            Error::Scan { source, .. } | Error::Section { source, .. } => {
                source.is_source_unavailable()
            }
            _ => false,
        }
    }
}
