//! Downloader module
//!
//! This module contains all the download functionality including core types,
//! configuration, chapter selection, site drivers and the orchestrator.

pub mod core;
pub mod config;
pub mod batch;
pub mod drivers;
pub mod orchestrator;
pub mod registry;
pub mod selection;

// Re-export main types for convenience
pub use core::{
    ChapterIndex, ChapterMap, ChapterJob, PageImage, HtmlDocument,
    ProgressCallback, ProgressEvent, ProgressReporter, IntoProgressCallback, RunStatus,
    ConsoleProgressReporter, NullProgressReporter, CompositeProgressReporter,
    DownloadError, Result, ErrorSeverity, ErrorScope, FileOperation, ScrapeStep,
    DownloadMetrics, DownloadMetricsSnapshot,
};
pub use core::files::{sanitize, sanitize_with};
pub use config::{DownloaderConfig, SelectionConfig};
pub use batch::BoundedExecutor;
pub use drivers::{SiteDriver, Page, PageFetcher, Asurascans, Mangadoom, Manganato, Mangatown};
pub use orchestrator::{MangaDownloader, RunReport, RunState, ChapterFailure};
pub use registry::DriverRegistry;
pub use selection::SelectionStrategy;
