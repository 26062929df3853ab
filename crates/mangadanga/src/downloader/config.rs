//! Configuration types for the downloader system

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::downloader::core::{DownloadError, Result};

/// Which chapters to download, in configuration form
///
/// `strategy` is one of `all`, `list` or `range`; `params` holds the chapter
/// numbers for `list` and the two bounds for `range`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionConfig {
    pub strategy: String,
    #[serde(default)]
    pub params: Vec<String>,
}

impl SelectionConfig {
    pub fn all() -> Self {
        Self {
            strategy: "all".to_string(),
            params: Vec::new(),
        }
    }

    pub fn list<I, S>(chapters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            strategy: "list".to_string(),
            params: chapters.into_iter().map(Into::into).collect(),
        }
    }

    pub fn range(lower: impl Into<String>, upper: impl Into<String>) -> Self {
        Self {
            strategy: "range".to_string(),
            params: vec![lower.into(), upper.into()],
        }
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self::all()
    }
}

/// Configuration for one download run
#[derive(Debug, Clone)]
pub struct DownloaderConfig {
    /// Series page to start from
    pub url: String,
    /// Base directory; the series directory is created inside it
    pub path: PathBuf,
    /// Maximum number of chapters downloaded at the same time
    pub threads: usize,
    /// Maximum number of page requests in flight within one chapter
    pub page_concurrency: usize,
    pub selection: SelectionConfig,
    pub timeout: Duration,
    pub user_agent: String,
    /// Extra attempts for recoverable fetch errors; 0 disables retrying
    pub max_retries: usize,
    /// Initial delay between retries (doubles each retry)
    pub retry_delay: Duration,
    /// Maximum retry delay cap
    pub max_retry_delay: Duration,
}

impl DownloaderConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_page_concurrency(mut self, page_concurrency: usize) -> Self {
        self.page_concurrency = page_concurrency;
        self
    }

    pub fn with_selection(mut self, selection: SelectionConfig) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Calculate retry delay for the given attempt using exponential backoff
    pub fn get_retry_delay(&self, attempt: usize) -> Duration {
        let delay = (self.retry_delay.as_millis() as u64).saturating_mul(2_u64.saturating_pow(attempt as u32));
        Duration::from_millis(delay.min(self.max_retry_delay.as_millis() as u64))
    }

    /// Reject settings that cannot produce a run
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(config_error("url must not be empty", "url", "Pass the URL of a series page"));
        }
        if self.threads == 0 {
            return Err(config_error("threads must be at least 1", "threads", "Use 1 for sequential downloads"));
        }
        if self.page_concurrency == 0 {
            return Err(config_error(
                "page_concurrency must be at least 1",
                "page_concurrency",
                "Use 1 to fetch pages one at a time",
            ));
        }
        if self.timeout.is_zero() {
            return Err(config_error("timeout must be greater than zero", "timeout", "The default is 30 seconds"));
        }
        Ok(())
    }
}

fn config_error(message: &str, field: &str, suggestion: &str) -> DownloadError {
    DownloadError::Configuration {
        message: message.to_string(),
        field: Some(field.to_string()),
        suggestion: Some(suggestion.to_string()),
    }
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            path: PathBuf::from("."),
            threads: 1,
            page_concurrency: 4,
            selection: SelectionConfig::default(),
            timeout: Duration::from_secs(30),
            user_agent: "Mozilla/5.0".to_string(),
            max_retries: 0,
            retry_delay: Duration::from_millis(500),
            max_retry_delay: Duration::from_secs(10),
        }
    }
}
