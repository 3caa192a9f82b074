//! # Hondana - Komga catalog connector
//!
//! Hondana adapts the REST API of a self-hosted [Komga](https://komga.org)
//! comic/manga server into a normalized catalog for reader and downloader
//! applications: series, chapters, page references, listing tiles, home
//! sections and update batches.
//!
//! ## Features
//!
//! - **Cursor Pagination**: Stateless page fetching, caller-owned cursors
//! - **Progressive Home Sections**: Placeholders first, then each section as soon as it loads
//! - **Failure Isolation**: One failing home section never hides the others
//! - **Incremental Update Scan**: Stops at the first series older than the watermark
//! - **Injected Configuration**: No global state, several servers side by side
//! - **Pluggable Transport**: Bring your own HTTP stack or use the bundled reqwest client
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hondana::prelude::*;
//! use hondana::error::Result;
//! use std::collections::HashSet;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = KomgaConfig::builder()
//!         .base_url("https://demo.komga.org")
//!         .username("demo@komga.org")
//!         .password("komga-demo")
//!         .build()?;
//!     let source = KomgaSource::new(config)?;
//!
//!     // Render placeholders, then fill each section in as it arrives
//!     source
//!         .get_home_sections(&mut |section: Section| {
//!             println!("{} -> {:?}", section.title, section.state);
//!         })
//!         .await?;
//!
//!     // Which of the series we follow changed during the last day?
//!     let followed: HashSet<String> = ["0A1B2C".to_string()].into();
//!     let since = chrono::Utc::now() - chrono::Duration::days(1);
//!     source
//!         .scan_for_updates(since, &followed, &mut |ids: HashSet<String>| println!("updated: {:?}", ids))
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`paged`]: Stateless cursor-based page fetching
//! - [`mapping`]: Raw Komga records to catalog entities
//! - [`section`]: Concurrent home section aggregation
//! - [`scanner`]: Incremental update scan over the time-ordered feed
//! - [`source`]: Host-facing trait and source collection
//! - [`sources`]: The Komga implementation
//! - [`net`]: Transport boundary, HTTP client and JSON decoding
//! - [`config`]: Connector configuration
//! - [`error`]: Error handling

pub mod config;
pub mod error;
pub mod mapping;
pub mod net;
pub mod paged;
pub mod scanner;
pub mod section;
pub mod source;
pub mod sources;
pub mod types;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use hondana::prelude::*;
///
/// // Now you have access to:
/// // - Sources, Source trait, KomgaSource
/// // - KomgaConfig
/// // - Series, Chapter, ChapterDetail, Tile, Section, PagedResults, SearchRequest
/// ```
pub mod prelude {
    pub use crate::{
        config::KomgaConfig,
        source::{Source, Sources},
        sources::KomgaSource,
        types::{
            Chapter, ChapterDetail, Cursor, PagedResults, ScanSummary, SearchRequest, Section,
            SectionState, Series, SeriesStatus, Tile,
        },
    };
}

// Re-export main types at crate root for direct access
pub use config::KomgaConfig;
pub use error::{Error, Result};
pub use source::{Source, Sources};
pub use sources::KomgaSource;
pub use types::{Chapter, ChapterDetail, PagedResults, Section, Series, Tile};
