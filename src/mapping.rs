//! Raw Komga records and their mapping into catalog entities.
//!
//! Every function here is pure and deterministic. The only failure is a
//! required field missing on a record ([`Error::Mapping`]); optional fields
//! fall back to empty values.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::{
    error::{Error, Result},
    paged::segment,
    types::{
        CHAPTER_LANGUAGE, Chapter, ChapterDetail, Series, SeriesStatus, Tag, TagSection, Tile,
    },
};

/// Media types readers can display without conversion.
pub const SUPPORTED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Reading directions rendered as a vertical long strip.
pub const LONG_STRIP_DIRECTIONS: [&str; 2] = ["VERTICAL", "WEBTOON"];

/// Format requested for pages in an unsupported media type.
const CONVERSION_FORMAT: &str = "png";

/// Komga series record
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSeries {
    pub id: Option<String>,
    pub metadata: Option<RawSeriesMetadata>,
    pub books_metadata: Option<RawBooksMetadata>,
}

/// Series-level metadata
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSeriesMetadata {
    pub status: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub language: Option<String>,
    pub reading_direction: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub last_modified: Option<String>,
}

/// Metadata aggregated by the server from a series' books
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBooksMetadata {
    #[serde(default)]
    pub authors: Vec<RawAuthor>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAuthor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
}

/// Komga book record
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBook {
    pub id: Option<String>,
    /// Human readable file size, e.g. `"12.4 MiB"`
    pub size: Option<String>,
    pub file_last_modified: Option<String>,
    pub metadata: Option<RawBookMetadata>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBookMetadata {
    pub title: Option<String>,
    pub number: Option<String>,
    pub number_sort: Option<f64>,
}

/// One page of a book
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPage {
    pub number: Option<u32>,
    pub media_type: Option<String>,
}

/// Maps a raw status string; anything unknown is treated as ongoing.
pub fn parse_series_status(raw: &str) -> SeriesStatus {
    match raw {
        "ENDED" => SeriesStatus::Completed,
        "ONGOING" | "ABANDONED" | "HIATUS" => SeriesStatus::Ongoing,
        _ => SeriesStatus::Ongoing,
    }
}

/// Parses a server timestamp. Values without an offset are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

/// Thumbnail URL of a series.
pub fn series_thumbnail(api_base: &str, series_id: &str) -> String {
    format!("{}/series/{}/thumbnail", api_base, segment(series_id))
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|s| !s.is_empty()).cloned()
}

fn series_id(raw: &RawSeries) -> Result<&str> {
    raw.id
        .as_deref()
        .ok_or_else(|| Error::mapping("series", "id"))
}

fn series_title(raw: &RawSeries) -> Result<&str> {
    raw.metadata
        .as_ref()
        .and_then(|m| m.title.as_deref())
        .ok_or_else(|| Error::mapping("series", "metadata.title"))
}

fn tag_section(id: &str, label: &str, raw: &[String]) -> TagSection {
    TagSection {
        id: id.to_string(),
        label: label.to_string(),
        tags: raw
            .iter()
            .map(|tag| Tag {
                id: tag.clone(),
                label: tag.clone(),
            })
            .collect(),
    }
}

/// Maps a series record to a [`Series`].
///
/// # Errors
///
/// * [`Error::Mapping`] - If `id` or `metadata.title` is missing
pub fn map_series(raw: &RawSeries, api_base: &str) -> Result<Series> {
    let id = series_id(raw)?;
    let title = series_title(raw)?;

    let empty_meta = RawSeriesMetadata::default();
    let metadata = raw.metadata.as_ref().unwrap_or(&empty_meta);
    let empty_books = RawBooksMetadata::default();
    let books = raw.books_metadata.as_ref().unwrap_or(&empty_books);

    // Only writers and pencillers are credited, other roles are dropped.
    let mut authors = Vec::new();
    let mut artists = Vec::new();
    for entry in &books.authors {
        match entry.role.as_str() {
            "writer" => authors.push(entry.name.as_str()),
            "penciller" => artists.push(entry.name.as_str()),
            _ => {}
        }
    }

    Ok(Series {
        id: id.to_string(),
        titles: vec![title.to_string()],
        image: series_thumbnail(api_base, id),
        status: parse_series_status(metadata.status.as_deref().unwrap_or_default()),
        lang_flag: non_empty(metadata.language.as_ref()),
        author: authors.join(", "),
        artist: artists.join(", "),
        description: non_empty(metadata.summary.as_ref()).or_else(|| non_empty(books.summary.as_ref())),
        tags: vec![
            tag_section("0", "genres", &metadata.genres),
            tag_section("1", "tags", &metadata.tags),
        ],
        last_update: metadata.last_modified.as_deref().and_then(parse_timestamp),
    })
}

/// Maps a book record to a [`Chapter`] of `series_id`.
///
/// # Errors
///
/// * [`Error::Mapping`] - If `id` or `metadata.numberSort` is missing
pub fn map_chapter(raw: &RawBook, series_id: &str) -> Result<Chapter> {
    let id = raw.id.as_deref().ok_or_else(|| Error::mapping("book", "id"))?;
    let metadata = raw
        .metadata
        .as_ref()
        .ok_or_else(|| Error::mapping("book", "metadata"))?;
    let number = metadata
        .number_sort
        .ok_or_else(|| Error::mapping("book", "metadata.numberSort"))?;

    let name = format!(
        "{} - {} ({})",
        metadata.number.as_deref().unwrap_or_default(),
        metadata.title.as_deref().unwrap_or_default(),
        raw.size.as_deref().unwrap_or_default()
    );

    Ok(Chapter {
        id: id.to_string(),
        series_id: series_id.to_string(),
        number,
        name,
        lang_code: CHAPTER_LANGUAGE,
        time: raw.file_last_modified.as_deref().and_then(parse_timestamp),
    })
}

/// URL of one page image, asking for a conversion when the media type is
/// not directly displayable.
pub fn page_url(api_base: &str, chapter_id: &str, page: &RawPage) -> Result<String> {
    let number = page.number.ok_or_else(|| Error::mapping("page", "number"))?;
    let url = format!(
        "{}/books/{}/pages/{}",
        api_base,
        segment(chapter_id),
        number
    );

    let supported = page
        .media_type
        .as_deref()
        .is_some_and(|media_type| SUPPORTED_IMAGE_TYPES.contains(&media_type));

    if supported {
        Ok(url)
    } else {
        Ok(format!("{}?convert={}", url, CONVERSION_FORMAT))
    }
}

/// Maps the page list of a book to a [`ChapterDetail`].
///
/// # Errors
///
/// * [`Error::Mapping`] - If a page has no `number`
pub fn map_chapter_detail(
    series_id: &str,
    chapter_id: &str,
    pages: &[RawPage],
    reading_direction: Option<&str>,
    api_base: &str,
) -> Result<ChapterDetail> {
    let pages = pages
        .iter()
        .map(|page| page_url(api_base, chapter_id, page))
        .collect::<Result<Vec<_>>>()?;

    Ok(ChapterDetail {
        id: chapter_id.to_string(),
        series_id: series_id.to_string(),
        pages,
        long_strip: reading_direction.is_some_and(|dir| LONG_STRIP_DIRECTIONS.contains(&dir)),
    })
}

/// Maps a series record to a listing [`Tile`].
///
/// # Errors
///
/// * [`Error::Mapping`] - If `id` or `metadata.title` is missing
pub fn map_tile(raw: &RawSeries, api_base: &str) -> Result<Tile> {
    let id = series_id(raw)?;
    let title = series_title(raw)?;

    Ok(Tile {
        id: id.to_string(),
        title: title.to_string(),
        image: series_thumbnail(api_base, id),
        subtitle: format!("id: {}", id),
    })
}

/// Maps a page of series records to tiles.
///
/// Records that fail to map are logged and skipped; their siblings are kept.
pub fn map_tiles(raws: &[RawSeries], api_base: &str) -> Vec<Tile> {
    raws.iter()
        .filter_map(|raw| match map_tile(raw, api_base) {
            Ok(tile) => Some(tile),
            Err(e) => {
                tracing::warn!(id = ?raw.id, error = %e, "skipping series tile");
                None
            }
        })
        .collect()
}

/// Identifier and modification time of an update-feed entry.
///
/// # Errors
///
/// * [`Error::Mapping`] - If `id` or a parseable `metadata.lastModified` is missing
pub fn feed_entry(raw: &RawSeries) -> Result<(&str, DateTime<Utc>)> {
    let id = series_id(raw)?;
    let modified = raw
        .metadata
        .as_ref()
        .and_then(|m| m.last_modified.as_deref())
        .and_then(parse_timestamp)
        .ok_or_else(|| Error::mapping("series", "metadata.lastModified"))?;
    Ok((id, modified))
}
