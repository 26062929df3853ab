//! Chapter selection strategies
//!
//! A strategy is a predicate over [`ChapterIndex`] deciding whether a chapter
//! is downloaded. Bounds and list entries are compared by numeric value, the
//! same way chapter indices compare with each other.

use crate::downloader::config::SelectionConfig;
use crate::downloader::core::{ChapterIndex, DownloadError, Result, numeric_value};

const SUPPORTED_STRATEGIES: &str = "all, list, range";

/// Which chapters of a series to download
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SelectionStrategy {
    /// Every chapter
    #[default]
    All,
    /// Only chapters whose number is in the list
    List(Vec<ChapterIndex>),
    /// Chapters with `lower <= number <= upper`
    Range { lower: f64, upper: f64 },
}

impl SelectionStrategy {
    /// Build a strategy from its name and parameters
    pub fn select<S: AsRef<str>>(kind: &str, params: &[S]) -> Result<Self> {
        match kind {
            "all" => Ok(SelectionStrategy::All),
            "list" => Self::list(params),
            "range" => match params {
                [lower, upper] => Self::range(lower.as_ref(), upper.as_ref()),
                _ => Err(DownloadError::Configuration {
                    message: format!("range selection takes exactly 2 bounds, got {}", params.len()),
                    field: Some("selection.params".to_string()),
                    suggestion: Some("Pass a lower and an upper chapter number".to_string()),
                }),
            },
            _ => Err(DownloadError::UnknownStrategy {
                kind: kind.to_string(),
                supported: SUPPORTED_STRATEGIES.to_string(),
            }),
        }
    }

    pub fn from_config(config: &SelectionConfig) -> Result<Self> {
        Self::select(&config.strategy, &config.params)
    }

    /// Exact-match selection; entries may carry stray non-numeric characters
    pub fn list<S: AsRef<str>>(chapters: &[S]) -> Result<Self> {
        let chapters = chapters
            .iter()
            .map(|chapter| ChapterIndex::parse(chapter.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(SelectionStrategy::List(chapters))
    }

    /// Inclusive range selection; fails when `lower` is greater than `upper`
    pub fn range(lower: &str, upper: &str) -> Result<Self> {
        let bound = |raw: &str| numeric_value(raw).ok_or_else(|| DownloadError::InvalidIndex { raw: raw.to_string() });
        let lower = bound(lower)?;
        let upper = bound(upper)?;
        if lower > upper {
            return Err(DownloadError::InvalidRange { lower, upper });
        }
        Ok(SelectionStrategy::Range { lower, upper })
    }

    pub fn matches(&self, chapter: &ChapterIndex) -> bool {
        match self {
            SelectionStrategy::All => true,
            SelectionStrategy::List(chapters) => chapters.contains(chapter),
            SelectionStrategy::Range { lower, upper } => {
                *lower <= chapter.value() && chapter.value() <= *upper
            }
        }
    }
}
