//! Source trait and collection for managing catalog sources.
//!
//! This module defines the [`Source`] trait that the host application talks
//! to, and the [`Sources`] collection for keeping several independently
//! configured servers side by side.
//!
//! # Examples
//!
//! ```rust,no_run
//! use hondana::prelude::*;
//! use hondana::error::Result;
//!
//! # async fn example() -> Result<()> {
//! let mut sources = Sources::new();
//! sources.add(KomgaSource::new(
//!     KomgaConfig::builder()
//!         .id("home")
//!         .base_url("http://nas.local:25600")
//!         .username("reader@example.org")
//!         .password("secret")
//!         .build()?,
//! )?);
//!
//! if let Some(source) = sources.get("home") {
//!     let chapters = source.list_chapters("0A1B2C").await?;
//! }
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

use crate::{
    error::Result,
    types::{
        Chapter, ChapterDetail, Cursor, PagedResults, ScanSummary, SearchRequest, Section, Series,
        Tile,
    },
};

/// Operations a catalog source exposes to the host application.
///
/// Cursors and watermarks are supplied and persisted by the caller; a source
/// keeps no state between calls.
#[async_trait]
pub trait Source: Send + Sync {
    /// Returns the unique identifier for this source.
    fn id(&self) -> &str;

    /// Returns the human-readable name of this source.
    fn name(&self) -> &str;

    /// Returns the server root URL, without trailing slash.
    fn base_url(&self) -> &str;

    /// Retrieves the full metadata of one series.
    ///
    /// # Errors
    ///
    /// * [`Error::Network`](crate::Error::Network) / [`Error::Transport`](crate::Error::Transport) - Server unreachable or refusing
    /// * [`Error::Parse`](crate::Error::Parse) - Malformed payload
    /// * [`Error::Mapping`](crate::Error::Mapping) - Record lacks a required field
    async fn get_series_detail(&self, series_id: &str) -> Result<Series>;

    /// Retrieves every readable chapter of a series, in server order.
    ///
    /// Books that cannot be mapped are skipped.
    async fn list_chapters(&self, series_id: &str) -> Result<Vec<Chapter>>;

    /// Retrieves the page references and reading mode of one chapter.
    async fn get_chapter_detail(&self, series_id: &str, chapter_id: &str) -> Result<ChapterDetail>;

    /// Searches the catalog.
    ///
    /// `cursor` is `None` for the first page, then the `next` value of the
    /// previous result. A result with `next == None` is the last page.
    async fn search(
        &self,
        request: &SearchRequest,
        cursor: Option<Cursor>,
    ) -> Result<PagedResults<Tile>>;

    /// Delivers the home sections through `callback`: a placeholder for each
    /// section, then each section once loaded or failed.
    ///
    /// Individual section failures are delivered, not returned.
    async fn get_home_sections(&self, callback: &mut (dyn FnMut(Section) + Send)) -> Result<()>;

    /// Continues one home section past its first page.
    async fn view_more_section(
        &self,
        section_id: &str,
        cursor: Option<Cursor>,
    ) -> Result<PagedResults<Tile>>;

    /// Reports, batch by batch, which ids of `interest` changed at or after
    /// `watermark`.
    ///
    /// # Errors
    ///
    /// * [`Error::Scan`](crate::Error::Scan) - The scan aborted; re-run it with the same watermark
    async fn scan_for_updates(
        &self,
        watermark: DateTime<Utc>,
        interest: &HashSet<String>,
        on_batch: &mut (dyn FnMut(HashSet<String>) + Send),
    ) -> Result<ScanSummary>;

    /// Link to a series that can be shared outside the host.
    fn share_url(&self, series_id: &str) -> String;
}

/// A collection of sources, indexed by id.
pub struct Sources {
    sources: Vec<Box<dyn Source>>,
    by_id: HashMap<String, usize>,
}

impl Sources {
    /// Creates a new empty source collection.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hondana::prelude::*;
    ///
    /// let sources = Sources::new();
    /// assert_eq!(sources.len(), 0);
    /// assert!(sources.is_empty());
    /// ```
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            by_id: HashMap::new(),
        }
    }

    /// Adds a source to the collection.
    ///
    /// A source with an id already present replaces the previous one in
    /// lookups.
    pub fn add(&mut self, source: impl Source + 'static) -> &mut Self {
        let id = source.id().to_string();
        let index = self.sources.len();
        self.sources.push(Box::new(source));
        self.by_id.insert(id, index);
        self
    }

    /// Retrieves a source by its ID.
    pub fn get(&self, id: &str) -> Option<&dyn Source> {
        self.by_id
            .get(id)
            .and_then(|&index| self.sources.get(index))
            .map(|s| s.as_ref())
    }

    /// Returns the IDs of all sources, in insertion order.
    pub fn list_ids(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl Default for Sources {
    fn default() -> Self {
        Self::new()
    }
}
