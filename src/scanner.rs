//! Incremental detection of updated series.
//!
//! The server's `/series/updated` feed lists series by non-increasing
//! modification time. [`UpdateScanner`] walks it page by page from cursor 0,
//! reports the ids of interest that changed at or after a watermark, and stops
//! at the first entry older than the watermark: ordering guarantees nothing
//! after it can qualify, so no further page is requested.
//!
//! The ordering is assumed, not verified.

use chrono::{DateTime, Utc};
use std::collections::HashSet;

use crate::{
    error::{Error, Result},
    mapping::{self, RawSeries},
    paged::PagedFetcher,
    types::{Cursor, ScanSummary},
};

/// Path of the time-ordered update feed.
pub const UPDATE_FEED_PATH: &str = "/series/updated";

/// Sequential scanner over the update feed.
#[derive(Clone)]
pub struct UpdateScanner {
    fetcher: PagedFetcher,
    page_size: u32,
}

enum PageOutcome {
    Continue,
    Stop,
}

impl UpdateScanner {
    pub fn new(fetcher: PagedFetcher, page_size: u32) -> Self {
        Self { fetcher, page_size }
    }

    /// Scans the feed, calling `on_batch` once per page that produced at
    /// least one id of interest.
    ///
    /// A timestamp equal to `watermark` is inside the window. An empty first
    /// page completes without any callback.
    ///
    /// # Errors
    ///
    /// * [`Error::Scan`] - If a page could not be fetched or an entry lacks its id or
    ///   timestamp. Batches delivered before the failure remain valid.
    pub async fn scan<F>(
        &self,
        watermark: DateTime<Utc>,
        interest: &HashSet<String>,
        mut on_batch: F,
    ) -> Result<ScanSummary>
    where
        F: FnMut(HashSet<String>),
    {
        let mut summary = ScanSummary::default();
        let mut cursor: Cursor = 0;
        let mut batch = HashSet::new();

        loop {
            let page = self
                .fetcher
                .fetch::<RawSeries>(UPDATE_FEED_PATH, cursor, self.page_size, &[])
                .await
                .map_err(|e| Error::scan(cursor, e))?;
            summary.pages_fetched += 1;

            if page.items.is_empty() {
                break;
            }

            let outcome = Self::collect(&page.items, watermark, interest, &mut batch)
                .map_err(|e| Error::scan(cursor, e))?;

            if !batch.is_empty() {
                summary.reported += batch.len();
                tracing::debug!(cursor, found = batch.len(), "update batch");
                on_batch(std::mem::take(&mut batch));
            }

            cursor += 1;
            if let PageOutcome::Stop = outcome {
                break;
            }
        }

        tracing::info!(
            pages = summary.pages_fetched,
            reported = summary.reported,
            %watermark,
            "update scan finished"
        );
        Ok(summary)
    }

    fn collect(
        items: &[RawSeries],
        watermark: DateTime<Utc>,
        interest: &HashSet<String>,
        batch: &mut HashSet<String>,
    ) -> Result<PageOutcome> {
        for item in items {
            let (id, modified) = mapping::feed_entry(item)?;
            if modified < watermark {
                return Ok(PageOutcome::Stop);
            }
            if interest.contains(id) {
                batch.insert(id.to_string());
            }
        }
        Ok(PageOutcome::Continue)
    }
}
