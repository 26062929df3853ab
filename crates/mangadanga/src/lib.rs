//! MangaDanga Library
//!
//! Downloads every chapter of a manga series (or a selection of them) from a
//! supported site and stores each chapter as a zip archive of its page
//! images, inside a directory named after the series.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use mangadanga::{
//!     DownloaderConfig, DriverRegistry, MangaDownloader, ProgressEvent, SelectionConfig,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> mangadanga::Result<()> {
//! // Chapters 1 to 10, two chapters at a time
//! let config = DownloaderConfig::new("https://chapmanganato.com/manga-aa951409")
//!     .with_path("/path/to/library")
//!     .with_threads(2)
//!     .with_selection(SelectionConfig::range("1", "10"));
//!
//! // Set up progress callback (optional)
//! let progress_callback = Arc::new(|event: ProgressEvent| match event {
//!     ProgressEvent::ChapterCountKnown { total } => println!("{} chapters selected", total),
//!     ProgressEvent::ChapterFinished { path, .. } => println!("Saved {}", path.display()),
//!     ProgressEvent::ChapterFailed { index, error } => println!("Chapter {} failed: {}", index, error),
//!     ProgressEvent::RunFinished { status, message } => println!("{}: {}", status, message),
//!     _ => {}
//! });
//!
//! // Configuration errors surface here, before any request is made
//! let registry = DriverRegistry::with_default_drivers();
//! let downloader = MangaDownloader::new(config, &registry, Some(progress_callback))?;
//!
//! let report = downloader.download().await;
//! println!("Download result: {:?}", report.status);
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Site drivers**: Manganato, Mangatown, Mangadoom and Asura Scans, plus your own via [`SiteDriver`]
//! - **Chapter selection**: all chapters, an explicit list, or an inclusive range
//! - **Bounded concurrency**: separate limits for chapters and for pages within a chapter
//! - **Atomic archives**: a chapter archive is either complete or absent
//! - **Partial failure**: a broken chapter is reported without stopping the others
//! - **Progress tracking**: lifecycle and per-chapter events through a callback or a channel

pub mod downloader;

// Re-export commonly used types for convenience
pub use downloader::{
    BoundedExecutor, ChapterIndex, ChapterMap, ConsoleProgressReporter, DownloadError,
    DownloaderConfig, DriverRegistry, IntoProgressCallback, MangaDownloader, ProgressCallback,
    ProgressEvent, ProgressReporter, Result, RunReport, RunState, RunStatus, SelectionConfig,
    SelectionStrategy, SiteDriver,
};
