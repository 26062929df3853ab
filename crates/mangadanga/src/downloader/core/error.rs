//! Error types for the downloader with context and recovery information

use std::error::Error;
use std::path::PathBuf;
use thiserror::Error;

/// Every way a download run or a single chapter can fail
#[derive(Error, Debug)]
pub enum DownloadError {
    /// No registered driver serves the URL's domain
    #[error("'{url}' is not covered by any driver (valid domain names: {})", .supported_domains.join(", "))]
    UrlWithoutCoverage {
        url: String,
        supported_domains: Vec<String>,
    },

    /// URL parsing errors with helpful suggestions
    #[error("Invalid URL '{url}': {suggestion}")]
    InvalidUrl {
        url: String,
        suggestion: String,
        #[source]
        source: url::ParseError,
    },

    /// Transport-level failure (connection refused, reset, body decoding)
    #[error("HTTP request to '{url}' failed")]
    HttpRequest {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status
    #[error("HTTP request to '{url}' returned status {status}")]
    HttpStatus {
        url: String,
        status: u16,
    },

    /// Network timeout with retry suggestion
    #[error("Request to '{url}' timed out after {duration_secs}s (try increasing timeout or check network)")]
    NetworkTimeout {
        url: String,
        duration_secs: u64,
    },

    /// The series page carries no title node
    #[error("Could not find a title on '{url}' (selector '{selector}')")]
    MissingTitle {
        url: String,
        selector: String,
    },

    /// Expected markup was not present on a scraped page
    #[error("Failed to scrape {step} from '{url}': {detail}")]
    Scrape {
        step: ScrapeStep,
        url: String,
        detail: String,
    },

    /// A chapter identifier holds no usable number
    #[error("Invalid chapter index '{raw}': no numeric value left after stripping non-numeric characters")]
    InvalidIndex {
        raw: String,
    },

    /// Range selection with inverted bounds
    #[error("Invalid range pattern. '{lower}' is greater than '{upper}'")]
    InvalidRange {
        lower: f64,
        upper: f64,
    },

    /// Selection strategy name that is not known
    #[error("Unknown chapter selection strategy '{kind}' (supported: {supported})")]
    UnknownStrategy {
        kind: String,
        supported: String,
    },

    /// Configuration errors
    #[error("Invalid configuration: {message}")]
    Configuration {
        message: String,
        field: Option<String>,
        suggestion: Option<String>,
    },

    /// File system I/O errors with file context
    #[error("Failed {operation} '{path}'")]
    FileSystem {
        path: PathBuf,
        operation: FileOperation,
        #[source]
        source: std::io::Error,
    },

    /// Writing the chapter archive failed
    #[error("Failed to write archive '{path}'")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// A single chapter failed; the run carries on with its siblings
    #[error("Chapter {index} failed: {source}")]
    Chapter {
        index: String,
        #[source]
        source: Box<DownloadError>,
    },

    /// A task or driver call panicked, or a spawned task was aborted
    #[error("Task failed: {reason}")]
    TaskFailed {
        reason: String,
    },
}

/// Which extraction step a scrape error came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapeStep {
    ChapterList,
    ChapterIndex,
    ChapterTitle,
    PageSelector,
    PageImages,
}

impl std::fmt::Display for ScrapeStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScrapeStep::ChapterList => write!(f, "chapter list"),
            ScrapeStep::ChapterIndex => write!(f, "chapter index"),
            ScrapeStep::ChapterTitle => write!(f, "chapter title"),
            ScrapeStep::PageSelector => write!(f, "page selector"),
            ScrapeStep::PageImages => write!(f, "page images"),
        }
    }
}

/// Types of file operations for error context
#[derive(Debug, Clone, PartialEq)]
pub enum FileOperation {
    Write,
    Delete,
    Move,
    CreateDir,
}

impl std::fmt::Display for FileOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileOperation::Write => write!(f, "writing"),
            FileOperation::Delete => write!(f, "deleting"),
            FileOperation::Move => write!(f, "moving"),
            FileOperation::CreateDir => write!(f, "creating directory"),
        }
    }
}

/// How far an error reaches
///
/// `Run` errors abort the whole download, `Chapter` errors only the chapter
/// they were raised for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorScope {
    Run,
    Chapter,
}

pub type Result<T> = std::result::Result<T, DownloadError>;

impl DownloadError {
    pub fn invalid_url(url: impl Into<String>, error: url::ParseError) -> Self {
        let suggestion = match error {
            url::ParseError::EmptyHost => "URL must have a valid hostname",
            url::ParseError::InvalidPort => "Port number must be between 1 and 65535",
            url::ParseError::RelativeUrlWithoutBase => "URL must be absolute (include http:// or https://)",
            _ => "Check URL format and try again",
        }.to_string();

        DownloadError::InvalidUrl {
            url: url.into(),
            suggestion,
            source: error,
        }
    }

    pub fn scrape(step: ScrapeStep, url: impl Into<String>, detail: impl Into<String>) -> Self {
        DownloadError::Scrape {
            step,
            url: url.into(),
            detail: detail.into(),
        }
    }

    /// Whether the error ends the run or only a chapter
    pub fn scope(&self) -> ErrorScope {
        match self {
            DownloadError::Chapter { .. } => ErrorScope::Chapter,
            _ => ErrorScope::Run,
        }
    }

    /// Check if error is recoverable (should retry)
    pub fn is_recoverable(&self) -> bool {
        match self {
            DownloadError::HttpRequest { source, .. } => source.is_connect() || source.is_timeout(),
            DownloadError::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            DownloadError::NetworkTimeout { .. } => true,
            DownloadError::FileSystem { source, .. } => {
                matches!(source.kind(),
                    std::io::ErrorKind::Interrupted |
                    std::io::ErrorKind::TimedOut |
                    std::io::ErrorKind::WouldBlock
                )
            }
            DownloadError::Chapter { source, .. } => source.is_recoverable(),
            DownloadError::UrlWithoutCoverage { .. }
            | DownloadError::InvalidUrl { .. }
            | DownloadError::MissingTitle { .. }
            | DownloadError::Scrape { .. }
            | DownloadError::InvalidIndex { .. }
            | DownloadError::InvalidRange { .. }
            | DownloadError::UnknownStrategy { .. }
            | DownloadError::Configuration { .. }
            | DownloadError::Archive { .. }
            | DownloadError::TaskFailed { .. } => false,
        }
    }

    /// Get error category for metrics and logging
    pub fn category(&self) -> &'static str {
        match self {
            DownloadError::UrlWithoutCoverage { .. } => "url_without_coverage",
            DownloadError::InvalidUrl { .. } => "invalid_url",
            DownloadError::HttpRequest { .. } => "http_request",
            DownloadError::HttpStatus { .. } => "http_status",
            DownloadError::NetworkTimeout { .. } => "network_timeout",
            DownloadError::MissingTitle { .. } => "missing_title",
            DownloadError::Scrape { .. } => "scrape",
            DownloadError::InvalidIndex { .. } => "invalid_index",
            DownloadError::InvalidRange { .. } => "invalid_range",
            DownloadError::UnknownStrategy { .. } => "unknown_strategy",
            DownloadError::Configuration { .. } => "configuration",
            DownloadError::FileSystem { operation: FileOperation::CreateDir, .. } => "directory",
            DownloadError::FileSystem { .. } => "file_system",
            DownloadError::Archive { .. } => "archive",
            DownloadError::Chapter { .. } => "chapter",
            DownloadError::TaskFailed { .. } => "task_failed",
        }
    }

    /// Get severity level for error prioritization
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            DownloadError::HttpRequest { .. }
            | DownloadError::HttpStatus { .. }
            | DownloadError::NetworkTimeout { .. }
            | DownloadError::Scrape { .. } => ErrorSeverity::Medium,
            DownloadError::Chapter { .. } => ErrorSeverity::Low,
            DownloadError::FileSystem { .. } | DownloadError::Archive { .. } => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// Get user-friendly suggestion for resolving the error
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            DownloadError::UrlWithoutCoverage { .. } => {
                Some("Use a series URL from one of the listed domains")
            }
            DownloadError::InvalidUrl { suggestion, .. } => Some(suggestion),
            DownloadError::NetworkTimeout { .. } => {
                Some("Check your internet connection or try increasing the timeout value")
            }
            DownloadError::MissingTitle { .. } | DownloadError::Scrape { .. } => {
                Some("The site layout may have changed; check that the URL points to a series page")
            }
            DownloadError::InvalidRange { .. } => Some("Pass the smaller chapter number first"),
            DownloadError::UnknownStrategy { .. } => Some("Use one of: all, list, range"),
            DownloadError::Configuration { suggestion, .. } => suggestion.as_deref(),
            DownloadError::Chapter { source, .. } => source.suggestion(),
            _ => None,
        }
    }

    /// Message including every cause in the source chain
    pub fn full_message(&self) -> String {
        let mut message = self.to_string();
        let mut source = self.source();
        while let Some(cause) = source {
            let text = cause.to_string();
            if !message.contains(&text) {
                message.push_str(": ");
                message.push_str(&text);
            }
            source = cause.source();
        }
        message
    }

    /// Create a detailed error report for debugging
    pub fn detailed_report(&self) -> String {
        let mut report = format!("Error: {}\n", self);
        report.push_str(&format!("Category: {}\n", self.category()));
        report.push_str(&format!("Severity: {:?}\n", self.severity()));
        report.push_str(&format!("Recoverable: {}\n", self.is_recoverable()));

        if let Some(suggestion) = self.suggestion() {
            report.push_str(&format!("Suggestion: {}\n", suggestion));
        }

        if let Some(source) = self.source() {
            report.push_str(&format!("Root cause: {}\n", source));
        }

        report
    }
}

/// Error severity levels for prioritization
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}
