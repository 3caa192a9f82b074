use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    config::KomgaConfig,
    error::Result,
    mapping::{self, RawBook, RawPage, RawSeries},
    net::{HttpClient, Transport},
    paged::{PagedFetcher, segment},
    scanner::UpdateScanner,
    section::{self, SectionAggregator},
    source::Source,
    types::{
        Chapter, ChapterDetail, Cursor, PagedResults, ScanSummary, SearchRequest, Section, Series,
        Tile,
    },
};

/// Komga source for one server.
///
/// Series map to Komga series, chapters to Komga books. Every request goes
/// through the injected [`Transport`]; [`KomgaSource::new`] wires the bundled
/// [`HttpClient`].
///
/// # Examples
///
/// ```rust,no_run
/// use hondana::prelude::*;
///
/// # async fn example() -> hondana::Result<()> {
/// let config = KomgaConfig::builder()
///     .base_url("https://demo.komga.org")
///     .username("demo@komga.org")
///     .password("komga-demo")
///     .build()?;
/// let source = KomgaSource::new(config)?;
///
/// let page = source.search(&"blame".into(), None).await?;
/// for tile in &page.results {
///     let series = source.get_series_detail(&tile.id).await?;
///     println!("{} ({:?})", series.titles[0], series.status);
/// }
/// # Ok(())
/// # }
/// ```
pub struct KomgaSource {
    config: Arc<KomgaConfig>,
    api_base: String,
    fetcher: PagedFetcher,
    aggregator: SectionAggregator,
    scanner: UpdateScanner,
}

impl KomgaSource {
    /// Creates a source talking HTTP to the configured server.
    ///
    /// # Errors
    ///
    /// * [`Error::Config`](crate::Error::Config) - If the configuration is invalid
    pub fn new(config: KomgaConfig) -> Result<Self> {
        config.validate()?;
        let transport = Arc::new(HttpClient::new(&config)?);
        Self::with_transport(config, transport)
    }

    /// Creates a source on top of a custom transport.
    pub fn with_transport(config: KomgaConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;
        let config = Arc::new(config);
        let api_base = config.api_base();
        let fetcher = PagedFetcher::new(transport);

        Ok(Self {
            aggregator: SectionAggregator::new(
                fetcher.clone(),
                api_base.clone(),
                config.section_page_size,
            ),
            scanner: UpdateScanner::new(fetcher.clone(), config.page_size),
            fetcher,
            api_base,
            config,
        })
    }

    pub fn config(&self) -> &KomgaConfig {
        &self.config
    }

    async fn fetch_series(&self, series_id: &str) -> Result<RawSeries> {
        self.fetcher
            .fetch_record(&format!("/series/{}", segment(series_id)))
            .await
    }

    async fn tile_page(
        &self,
        path: &str,
        cursor: Option<Cursor>,
        extra: &[(String, String)],
    ) -> Result<PagedResults<Tile>> {
        let cursor = cursor.unwrap_or(0);
        let page = self
            .fetcher
            .fetch::<RawSeries>(path, cursor, self.config.page_size, extra)
            .await?;

        Ok(PagedResults {
            next: page.has_more.then(|| cursor.checked_add(1)).flatten(),
            results: mapping::map_tiles(&page.items, &self.api_base),
        })
    }
}

#[async_trait]
impl Source for KomgaSource {
    fn id(&self) -> &str {
        &self.config.id
    }

    fn name(&self) -> &str {
        &self.config.name
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    async fn get_series_detail(&self, series_id: &str) -> Result<Series> {
        let raw = self.fetch_series(series_id).await?;
        mapping::map_series(&raw, &self.api_base)
    }

    async fn list_chapters(&self, series_id: &str) -> Result<Vec<Chapter>> {
        let extra = [("media_status".to_string(), "READY".to_string())];
        let books: Vec<RawBook> = self
            .fetcher
            .fetch_unpaged(&format!("/series/{}/books", segment(series_id)), &extra)
            .await?;

        let chapters = books
            .iter()
            .filter_map(|book| match mapping::map_chapter(book, series_id) {
                Ok(chapter) => Some(chapter),
                Err(e) => {
                    tracing::warn!(series_id, book = ?book.id, error = %e, "skipping chapter");
                    None
                }
            })
            .collect();
        Ok(chapters)
    }

    async fn get_chapter_detail(&self, series_id: &str, chapter_id: &str) -> Result<ChapterDetail> {
        let pages_path = format!("/books/{}/pages", segment(chapter_id));
        let pages: Vec<RawPage> = self.fetcher.fetch_record(&pages_path).await?;
        let series = self.fetch_series(series_id).await?;

        let reading_direction = series
            .metadata
            .as_ref()
            .and_then(|m| m.reading_direction.as_deref());

        mapping::map_chapter_detail(
            series_id,
            chapter_id,
            &pages,
            reading_direction,
            &self.api_base,
        )
    }

    async fn search(
        &self,
        request: &SearchRequest,
        cursor: Option<Cursor>,
    ) -> Result<PagedResults<Tile>> {
        let extra: Vec<(String, String)> = request
            .title
            .iter()
            .map(|title| ("search".to_string(), title.clone()))
            .collect();
        self.tile_page("/series", cursor, &extra).await
    }

    async fn get_home_sections(&self, callback: &mut (dyn FnMut(Section) + Send)) -> Result<()> {
        let definitions = section::default_sections();
        self.aggregator.run(&definitions, callback).await;
        Ok(())
    }

    async fn view_more_section(
        &self,
        section_id: &str,
        cursor: Option<Cursor>,
    ) -> Result<PagedResults<Tile>> {
        tracing::debug!(section_id, ?cursor, "view more");
        self.tile_page(&section::section_path(section_id), cursor, &[])
            .await
    }

    async fn scan_for_updates(
        &self,
        watermark: DateTime<Utc>,
        interest: &HashSet<String>,
        on_batch: &mut (dyn FnMut(HashSet<String>) + Send),
    ) -> Result<ScanSummary> {
        self.scanner.scan(watermark, interest, on_batch).await
    }

    fn share_url(&self, series_id: &str) -> String {
        format!("{}/series/{}", self.api_base, segment(series_id))
    }
}
