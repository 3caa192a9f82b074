//! Core data types of the normalized catalog.
//!
//! This module defines the entities handed to the host application:
//!
//! - [`Series`] - A catalog entry with its full metadata
//! - [`Chapter`] - An orderable sub-unit of a series
//! - [`ChapterDetail`] - The page references of one chapter
//! - [`Tile`] - Minimal display unit for listings
//! - [`Section`] - A named home listing, delivered in two phases
//! - [`PagedResults`] - One page of results plus the cursor for the next
//!
//! All entities are plain immutable values. Mapping the same raw record twice
//! yields equal entities, which is why they all derive `PartialEq`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Zero-based page index threaded by the caller between invocations.
pub type Cursor = u32;

/// Publication status of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeriesStatus {
    Ongoing,
    Completed,
}

/// Languages a chapter can be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LanguageCode {
    English,
}

/// Language assigned to every chapter.
///
/// Komga exposes no per-book language that the catalog trusts, so chapters
/// carry this fixed value instead of a guess.
pub const CHAPTER_LANGUAGE: LanguageCode = LanguageCode::English;

/// A single tag, whose id and label are both the raw server string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub label: String,
}

/// A labeled group of tags ("genres", "tags").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSection {
    pub id: String,
    pub label: String,
    pub tags: Vec<Tag>,
}

/// A catalog entry aggregating one title's metadata.
///
/// # Examples
///
/// ```rust
/// use hondana::types::{Series, SeriesStatus};
///
/// let series = Series {
///     id: "0A1B".to_string(),
///     titles: vec!["Blame!".to_string()],
///     image: "https://komga.example.org/api/v1/series/0A1B/thumbnail".to_string(),
///     status: SeriesStatus::Completed,
///     lang_flag: Some("ja".to_string()),
///     author: "Tsutomu Nihei".to_string(),
///     artist: "Tsutomu Nihei".to_string(),
///     description: None,
///     tags: vec![],
///     last_update: None,
/// };
/// assert_eq!(series.status, SeriesStatus::Completed);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    /// Series identifier on the server
    pub id: String,

    /// Titles, main title first
    pub titles: Vec<String>,

    /// Cover thumbnail URL
    pub image: String,

    pub status: SeriesStatus,

    /// Raw language code of the series, if the server knows it
    pub lang_flag: Option<String>,

    /// Writers, comma separated in encounter order
    pub author: String,

    /// Pencillers, comma separated in encounter order
    pub artist: String,

    pub description: Option<String>,

    /// "genres" then "tags"
    pub tags: Vec<TagSection>,

    /// Last modification of the series metadata
    pub last_update: Option<DateTime<Utc>>,
}

/// An orderable sub-unit of a series (a Komga book).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: String,

    /// Parent series identifier
    pub series_id: String,

    /// Sort key taken from the server's `numberSort`
    pub number: f64,

    /// Display name: number, title and file size
    pub name: String,

    pub lang_code: LanguageCode,

    /// Last modification of the underlying file
    pub time: Option<DateTime<Utc>>,
}

/// Page image references of one chapter, in reading order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterDetail {
    pub id: String,
    pub series_id: String,
    pub pages: Vec<String>,

    /// Whether the reader should use a vertical long-strip layout
    pub long_strip: bool,
}

/// Minimal display unit for catalog listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub id: String,
    pub title: String,
    pub image: String,
    pub subtitle: String,
}

/// One page of host-facing results.
///
/// `next` is `None` once a page came back empty; otherwise it is the cursor
/// to pass to the following call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagedResults<T> {
    pub results: Vec<T>,
    pub next: Option<Cursor>,
}

/// Name and title of a home section, before anything is fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDefinition {
    pub id: String,
    pub title: String,
}

impl SectionDefinition {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// Resolution state of a [`Section`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectionState {
    /// Placeholder, the fetch has not settled yet
    Pending,
    Loaded,
    /// The fetch failed
    Failed {
        message: String,
        /// Whether the cause was the server being unreachable or unusable,
        /// as told by [`Error::is_source_unavailable`]
        source_unavailable: bool,
    },
}

/// A named, independently fetched home listing.
///
/// A section is first delivered [`Pending`](SectionState::Pending) and empty,
/// then exactly once more as either loaded or failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub title: String,
    pub items: Vec<Tile>,
    pub has_more_available: bool,
    pub state: SectionState,
}

impl Section {
    /// Empty placeholder for a definition.
    pub fn pending(definition: &SectionDefinition) -> Self {
        Self {
            id: definition.id.clone(),
            title: definition.title.clone(),
            items: Vec::new(),
            has_more_available: false,
            state: SectionState::Pending,
        }
    }

    /// Consumes the placeholder into its loaded form.
    pub fn loaded(self, items: Vec<Tile>, has_more_available: bool) -> Self {
        Self {
            items,
            has_more_available,
            state: SectionState::Loaded,
            ..self
        }
    }

    /// Consumes the placeholder into its failed form.
    pub fn failed(self, error: &Error) -> Self {
        Self {
            state: SectionState::Failed {
                message: error.to_string(),
                source_unavailable: error.is_source_unavailable(),
            },
            ..self
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, SectionState::Pending)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.state, SectionState::Failed { .. })
    }

    /// `true` when the section failed because the source was unavailable.
    pub fn is_source_unavailable(&self) -> bool {
        matches!(
            self.state,
            SectionState::Failed {
                source_unavailable: true,
                ..
            }
        )
    }
}

/// Parameters of a catalog search.
///
/// # Examples
///
/// ```rust
/// use hondana::types::SearchRequest;
///
/// let request: SearchRequest = "one piece".into();
/// assert_eq!(request.title.as_deref(), Some("one piece"));
///
/// let everything = SearchRequest::default();
/// assert!(everything.title.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchRequest {
    pub title: Option<String>,
}

impl From<String> for SearchRequest {
    fn from(title: String) -> Self {
        SearchRequest { title: Some(title) }
    }
}

impl From<&str> for SearchRequest {
    fn from(title: &str) -> Self {
        SearchRequest {
            title: Some(title.to_string()),
        }
    }
}

/// Outcome of a completed update scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Requests issued against the update feed
    pub pages_fetched: u32,

    /// Identifiers delivered across all batches
    pub reported: usize,
}
