//! Concurrent aggregation of home sections with progressive delivery.
//!
//! For N section definitions the aggregator yields exactly 2×N sections: all
//! N pending placeholders first, then each section again as soon as its own
//! first-page fetch settles, loaded or failed. Fetches run concurrently and
//! share nothing but the read-only fetcher; a failing section is reported in
//! its own [`SectionState::Failed`] and never disturbs its siblings.
//!
//! # Examples
//!
//! ```rust,no_run
//! use hondana::section::{SectionAggregator, default_sections};
//! # use hondana::paged::PagedFetcher;
//!
//! # async fn example(fetcher: PagedFetcher) {
//! let aggregator = SectionAggregator::new(fetcher, "https://komga.example.org/api/v1", 20);
//!
//! aggregator
//!     .run(&default_sections(), |section| {
//!         println!("{}: {:?} ({} items)", section.id, section.state, section.items.len());
//!     })
//!     .await;
//! # }
//! ```

use futures::{
    Stream, StreamExt,
    stream::{self, FuturesUnordered},
};

use crate::{
    error::{Error, Result},
    mapping::{self, RawSeries},
    paged::{Page, PagedFetcher, segment},
    types::{Section, SectionDefinition, Tile},
};

/// Home sections offered by a Komga server.
pub fn default_sections() -> Vec<SectionDefinition> {
    vec![
        SectionDefinition::new("new", "Recently added series"),
        SectionDefinition::new("updated", "Recently updated series"),
    ]
}

/// Collection path backing a section id.
pub fn section_path(section_id: &str) -> String {
    format!("/series/{}", segment(section_id))
}

/// Fans out one first-page fetch per home section.
#[derive(Clone)]
pub struct SectionAggregator {
    fetcher: PagedFetcher,
    api_base: String,
    page_size: u32,
}

impl SectionAggregator {
    /// Creates an aggregator requesting `page_size` items per section.
    pub fn new(fetcher: PagedFetcher, api_base: impl Into<String>, page_size: u32) -> Self {
        Self {
            fetcher,
            api_base: api_base.into(),
            page_size,
        }
    }

    async fn load(&self, definition: &SectionDefinition) -> Result<Page<Tile>> {
        let page: Page<RawSeries> = self
            .fetcher
            .fetch(&section_path(&definition.id), 0, self.page_size, &[])
            .await?;
        Ok(page.map(|raws| mapping::map_tiles(&raws, &self.api_base)))
    }

    async fn resolve(&self, definition: &SectionDefinition) -> Section {
        let placeholder = Section::pending(definition);
        match self.load(definition).await {
            Ok(page) => placeholder.loaded(page.items, page.has_more),
            Err(e) => {
                let error = Error::section(definition.id.clone(), e);
                tracing::warn!(
                    error = %error,
                    source_unavailable = error.is_source_unavailable(),
                    "home section failed"
                );
                placeholder.failed(&error)
            }
        }
    }

    /// Stream of every section state change.
    ///
    /// Placeholders are yielded first, in definition order. Resolved sections
    /// follow in completion order. The stream ends once every fetch has
    /// settled.
    pub fn stream<'a>(
        &'a self,
        definitions: &'a [SectionDefinition],
    ) -> impl Stream<Item = Section> + 'a {
        let placeholders = stream::iter(definitions.iter().map(Section::pending));
        let resolved: FuturesUnordered<_> = definitions
            .iter()
            .map(|definition| self.resolve(definition))
            .collect();

        placeholders.chain(resolved)
    }

    /// Delivers every section state to `callback` and returns once all
    /// sections have settled.
    ///
    /// Returns the number of sections that failed.
    pub async fn run<F>(&self, definitions: &[SectionDefinition], mut callback: F) -> usize
    where
        F: FnMut(Section),
    {
        let mut failed = 0;
        let mut sections = std::pin::pin!(self.stream(definitions));
        while let Some(section) = sections.next().await {
            if section.is_failed() {
                failed += 1;
            }
            callback(section);
        }

        tracing::debug!(
            sections = definitions.len(),
            failed,
            "home sections settled"
        );
        failed
    }
}
