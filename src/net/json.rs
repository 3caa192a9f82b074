//! JSON decoding of API payloads.
//!
//! Komga wraps collection responses in a Spring page envelope:
//!
//! ```json
//! { "content": [ ... ], "number": 0, "size": 20, "totalPages": 3, "last": false }
//! ```
//!
//! Only `content` is read. Counters such as `totalPages` or `last` are ignored:
//! an empty `content` is the only end-of-listing signal the catalog trusts.
//!
//! # Examples
//!
//! ```rust
//! use hondana::net::json;
//! use serde_json::Value;
//!
//! let body = br#"{ "content": [ {"id": "a"}, {"id": "b"} ], "totalPages": 99 }"#;
//! let items: Vec<Value> = json::parse_content(body).unwrap();
//! assert_eq!(items.len(), 2);
//! ```

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    content: Vec<T>,
}

/// Deserializes a whole response body.
///
/// # Errors
///
/// * [`Error::Parse`] - If the body is not the expected JSON document
pub fn parse<T>(body: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    serde_json::from_slice(body).map_err(|e| Error::parse(format!("malformed payload: {}", e)))
}

/// Deserializes the `content` array of a page envelope.
///
/// # Errors
///
/// * [`Error::Parse`] - If the body is not an envelope or an item has the wrong shape
pub fn parse_content<T>(body: &[u8]) -> Result<Vec<T>>
where
    T: DeserializeOwned,
{
    parse::<Envelope<T>>(body).map(|envelope| envelope.content)
}
