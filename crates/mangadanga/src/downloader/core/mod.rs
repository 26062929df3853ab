//! Core types used throughout the downloader system
//!
//! This module contains the fundamental types that all other modules depend on:
//! chapter ordering keys, the chapter map, per-chapter jobs and fetched pages.

pub mod archive;
pub mod error;
pub mod files;
pub mod http;
pub mod metrics;
pub mod progress;

// Re-export main types for convenience
pub use error::{DownloadError, Result, ErrorSeverity, ErrorScope, FileOperation, ScrapeStep};
pub use metrics::{DownloadMetrics, DownloadMetricsSnapshot};
pub use progress::{
    ProgressEvent, ProgressCallback, ProgressReporter, IntoProgressCallback, RunStatus,
    ConsoleProgressReporter, NullProgressReporter, CompositeProgressReporter,
};

use scraper::Html;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

/// Keep only ASCII digits and `.` from `text`
pub fn strip_non_numeric(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect()
}

/// Numeric value of `text` once non-numeric characters are stripped
pub(crate) fn numeric_value(text: &str) -> Option<f64> {
    let digits = strip_non_numeric(text);
    if digits.is_empty() {
        return None;
    }
    digits.parse::<f64>().ok()
}

/// Ordering key of a chapter within a series
///
/// Keeps the identifier exactly as the site printed it (used in file names)
/// next to its numeric value. Comparison, equality and hashing only look at
/// the numeric value, so `"9" < "10"` and `"012" == "12"`.
#[derive(Debug, Clone)]
pub struct ChapterIndex {
    raw: String,
    value: f64,
}

impl ChapterIndex {
    /// Build an index from a raw identifier such as `"12"`, `"10.5"` or `"c012"`
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        match numeric_value(&raw) {
            Some(value) => Ok(Self { raw, value }),
            None => Err(DownloadError::InvalidIndex { raw }),
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

impl PartialEq for ChapterIndex {
    fn eq(&self, other: &Self) -> bool {
        self.value.total_cmp(&other.value).is_eq()
    }
}

impl Eq for ChapterIndex {}

impl PartialOrd for ChapterIndex {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ChapterIndex {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.value.total_cmp(&other.value)
    }
}

impl Hash for ChapterIndex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Stripped input never carries a sign or NaN, so bits agree with total_cmp
        self.value.to_bits().hash(state);
    }
}

impl std::fmt::Display for ChapterIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Insertion-ordered map from chapter index to absolute chapter URL
///
/// Drivers build it in reading order (oldest chapter first). Inserting an
/// index that is already present replaces its URL and keeps its position.
#[derive(Debug, Clone, Default)]
pub struct ChapterMap {
    entries: Vec<(ChapterIndex, String)>,
    positions: HashMap<ChapterIndex, usize>,
}

impl ChapterMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a chapter, returning the URL it replaced if the index was known
    pub fn insert(&mut self, index: ChapterIndex, url: impl Into<String>) -> Option<String> {
        let url = url.into();
        match self.positions.get(&index) {
            Some(&position) => Some(std::mem::replace(&mut self.entries[position].1, url)),
            None => {
                self.positions.insert(index.clone(), self.entries.len());
                self.entries.push((index, url));
                None
            }
        }
    }

    pub fn get(&self, index: &ChapterIndex) -> Option<&str> {
        self.positions
            .get(index)
            .map(|&position| self.entries[position].1.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ChapterIndex, &str)> {
        self.entries.iter().map(|(index, url)| (index, url.as_str()))
    }

    /// Chapters for which `keep` holds, in the same order
    pub fn filter<F>(&self, mut keep: F) -> ChapterMap
    where
        F: FnMut(&ChapterIndex) -> bool,
    {
        self.entries
            .iter()
            .filter(|(index, _)| keep(index))
            .cloned()
            .collect()
    }
}

impl FromIterator<(ChapterIndex, String)> for ChapterMap {
    fn from_iter<I: IntoIterator<Item = (ChapterIndex, String)>>(iter: I) -> Self {
        let mut map = ChapterMap::new();
        for (index, url) in iter {
            map.insert(index, url);
        }
        map
    }
}

impl IntoIterator for ChapterMap {
    type Item = (ChapterIndex, String);
    type IntoIter = std::vec::IntoIter<(ChapterIndex, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// One selected chapter waiting to be downloaded
#[derive(Debug, Clone)]
pub struct ChapterJob {
    pub index: ChapterIndex,
    pub url: String,
    /// Series directory the archive goes into
    pub directory: PathBuf,
}

impl ChapterJob {
    pub fn new(index: ChapterIndex, url: impl Into<String>, directory: impl Into<PathBuf>) -> Self {
        Self {
            index,
            url: url.into(),
            directory: directory.into(),
        }
    }

    /// Where the archive named `filename` ends up
    pub fn archive_path(&self, filename: &str) -> PathBuf {
        self.directory.join(filename)
    }
}

/// A downloaded page image and its place in the chapter
#[derive(Debug, Clone)]
pub struct PageImage {
    /// Zero-based position in reading order
    pub position: usize,
    pub url: String,
    pub bytes: Vec<u8>,
}

/// A fetched HTML page
///
/// Holds the body as text so it can cross await points; call [`html`] to get
/// a parsed tree (which is not `Send`) in a synchronous scope.
///
/// [`html`]: HtmlDocument::html
#[derive(Debug, Clone)]
pub struct HtmlDocument {
    /// Final URL after redirects; relative links resolve against it
    pub url: url::Url,
    pub body: String,
}

impl HtmlDocument {
    pub fn new(url: url::Url, body: impl Into<String>) -> Self {
        Self { url, body: body.into() }
    }

    /// Build a document from a URL string, mostly for fixtures
    pub fn parse(url: &str, body: impl Into<String>) -> Result<Self> {
        let url = url::Url::parse(url).map_err(|e| DownloadError::invalid_url(url, e))?;
        Ok(Self::new(url, body))
    }

    pub fn html(&self) -> Html {
        Html::parse_document(&self.body)
    }

    /// Resolve `href` (absolute, relative or protocol-relative) against this page
    pub fn resolve(&self, href: &str) -> Result<String> {
        self.url
            .join(href.trim())
            .map(|url| url.to_string())
            .map_err(|e| DownloadError::invalid_url(href, e))
    }
}
