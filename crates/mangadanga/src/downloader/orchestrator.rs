//! Download orchestration
//!
//! [`MangaDownloader`] drives one run through these states:
//!
//! ```text
//! Idle -> FetchingSeries -> CreatingDirectory -> EnumeratingChapters
//!      -> DownloadingChapters -> Completed
//! ```
//!
//! Any error before the chapter fan-out moves the run to `Failed`. Once
//! chapters are downloading, a failing chapter is recorded and reported but
//! never stops its siblings. Every run ends with exactly one
//! [`ProgressEvent::RunFinished`].

use futures::FutureExt;
use reqwest::header::HeaderMap;
use serde::Serialize;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::downloader::batch::BoundedExecutor;
use crate::downloader::config::DownloaderConfig;
use crate::downloader::core::archive::write_chapter_archive;
use crate::downloader::core::files::{ensure_directory, sanitize};
use crate::downloader::core::http::HttpClient;
use crate::downloader::core::{
    ChapterJob, DownloadError, DownloadMetrics, DownloadMetricsSnapshot, PageImage, ProgressCallback,
    ProgressEvent, Result, RunStatus, ScrapeStep,
};
use crate::downloader::drivers::{Page, PageFetcher, SiteDriver};
use crate::downloader::registry::DriverRegistry;
use crate::downloader::selection::SelectionStrategy;

/// Lifecycle of a download run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    FetchingSeries,
    CreatingDirectory,
    EnumeratingChapters,
    DownloadingChapters,
    Completed,
    Failed,
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunState::Idle => write!(f, "idle"),
            RunState::FetchingSeries => write!(f, "fetching series page"),
            RunState::CreatingDirectory => write!(f, "creating directory"),
            RunState::EnumeratingChapters => write!(f, "enumerating chapters"),
            RunState::DownloadingChapters => write!(f, "downloading chapters"),
            RunState::Completed => write!(f, "completed"),
            RunState::Failed => write!(f, "failed"),
        }
    }
}

/// A chapter that could not be archived
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChapterFailure {
    pub index: String,
    pub error: String,
}

/// Outcome of a run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub status: RunStatus,
    /// Empty on success, otherwise what went wrong
    pub message: String,
    pub title: Option<String>,
    pub directory: Option<PathBuf>,
    /// Archives written, in completion order
    pub archives: Vec<PathBuf>,
    pub failures: Vec<ChapterFailure>,
    pub metrics: DownloadMetricsSnapshot,
    pub elapsed_secs: f64,
}

impl RunReport {
    fn new() -> Self {
        Self {
            status: RunStatus::Success,
            message: String::new(),
            title: None,
            directory: None,
            archives: Vec::new(),
            failures: Vec::new(),
            metrics: DownloadMetricsSnapshot::default(),
            elapsed_secs: 0.0,
        }
    }

    /// Status and message from the chapter outcomes
    fn settle(&mut self) {
        if self.failures.is_empty() {
            self.status = RunStatus::Success;
            self.message.clear();
            return;
        }

        self.status = if self.archives.is_empty() {
            RunStatus::Error
        } else {
            RunStatus::Partial
        };
        let total = self.failures.len() + self.archives.len();
        let details = self
            .failures
            .iter()
            .map(|failure| format!("chapter {}: {}", failure.index, failure.error))
            .collect::<Vec<_>>()
            .join("; ");
        self.message = format!("{} of {} chapters failed: {}", self.failures.len(), total, details);
    }
}

/// Text of a panic payload (`&str` or `String`), if it carries one
fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

/// Everything a chapter task needs, shared across tasks
struct ChapterContext {
    driver: Arc<dyn SiteDriver>,
    fetcher: PageFetcher,
    progress: Option<ProgressCallback>,
    metrics: Arc<DownloadMetrics>,
}

impl ChapterContext {
    fn emit(&self, event: ProgressEvent) {
        if let Some(ref callback) = self.progress {
            callback(event);
        }
    }

    async fn download_chapter(&self, job: ChapterJob) -> Result<PathBuf> {
        let chapter = self.fetcher.fetch_document(&job.url).await?;
        let filename = self.driver.chapter_filename(&job.index, &Page::parse(&chapter))?;
        let archive_path = job.archive_path(&filename);
        info!("Downloading chapter: {}", filename);

        let image_urls = self.driver.page_image_urls(&chapter, &self.fetcher).await?;
        if image_urls.is_empty() {
            return Err(DownloadError::scrape(ScrapeStep::PageImages, &job.url, "chapter has no pages"));
        }
        debug!("Chapter {} has {} page(s)", job.index, image_urls.len());

        let pages = self
            .fetcher
            .executor()
            .try_run_ordered(image_urls.into_iter().enumerate().map(|(position, url)| async move {
                let bytes = self.fetcher.fetch_bytes(&url).await?;
                self.metrics.record_page(bytes.len() as u64);
                Ok::<_, DownloadError>(PageImage { position, url, bytes })
            }))
            .await?;

        write_chapter_archive(&archive_path, pages).await?;
        Ok(archive_path)
    }

    fn finish_chapter(&self, index: String, result: Result<PathBuf>) -> std::result::Result<PathBuf, ChapterFailure> {
        match result {
            Ok(path) => {
                self.metrics.record_chapter_completed();
                info!("Finished chapter {}: {}", index, path.display());
                self.emit(ProgressEvent::ChapterFinished {
                    index,
                    path: path.clone(),
                });
                Ok(path)
            }
            Err(error) => {
                self.metrics.record_chapter_failed();
                let message = error.full_message();
                let error = DownloadError::Chapter {
                    index: index.clone(),
                    source: Box::new(error),
                };
                warn!("{}", error);
                self.emit(ProgressEvent::ChapterFailed {
                    index: index.clone(),
                    error: message.clone(),
                });
                Err(ChapterFailure { index, error: message })
            }
        }
    }
}

/// Downloads the selected chapters of one series into zip archives
pub struct MangaDownloader {
    config: DownloaderConfig,
    driver: Arc<dyn SiteDriver>,
    selection: SelectionStrategy,
    client: HttpClient,
    headers: HeaderMap,
    chapter_executor: BoundedExecutor,
    page_executor: BoundedExecutor,
    progress: Option<ProgressCallback>,
    state: Mutex<RunState>,
}

impl std::fmt::Debug for MangaDownloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MangaDownloader")
            .field("url", &self.config.url)
            .field("driver", &self.driver.name())
            .field("selection", &self.selection)
            .field("state", &self.state())
            .finish()
    }
}

impl MangaDownloader {
    /// Create a downloader, picking the driver for the configured URL
    ///
    /// Every configuration problem (bad URL, unknown site, bad selection,
    /// zero concurrency) is reported here, before any network access.
    pub fn new(
        config: DownloaderConfig,
        registry: &DriverRegistry,
        progress: Option<ProgressCallback>,
    ) -> Result<Self> {
        config.validate()?;
        let driver = registry.resolve(&config.url)?;
        Self::with_driver(config, driver, progress)
    }

    /// Create a downloader that uses `driver` regardless of the URL's domain
    pub fn with_driver(
        config: DownloaderConfig,
        driver: Arc<dyn SiteDriver>,
        progress: Option<ProgressCallback>,
    ) -> Result<Self> {
        config.validate()?;
        url::Url::parse(&config.url).map_err(|e| DownloadError::invalid_url(&config.url, e))?;
        let selection = SelectionStrategy::from_config(&config.selection)?;
        let client = HttpClient::from_config(&config)?;
        let headers = HttpClient::header_map(&driver.request_headers())?;

        Ok(Self {
            chapter_executor: BoundedExecutor::new(config.threads)?,
            page_executor: BoundedExecutor::new(config.page_concurrency)?,
            config,
            driver,
            selection,
            client,
            headers,
            progress,
            state: Mutex::new(RunState::Idle),
        })
    }

    pub fn config(&self) -> &DownloaderConfig {
        &self.config
    }

    pub fn driver_name(&self) -> &str {
        self.driver.name()
    }

    pub fn selection(&self) -> &SelectionStrategy {
        &self.selection
    }

    /// Current state of the run
    pub fn state(&self) -> RunState {
        *self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_state(&self, state: RunState) {
        *self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = state;
        debug!("Run state: {}", state);
        self.emit(ProgressEvent::StateChanged { state });
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(ref callback) = self.progress {
            callback(event);
        }
    }

    /// Run the download
    ///
    /// Never fails: problems end up in the returned report and in the final
    /// [`ProgressEvent::RunFinished`] event.
    pub async fn download(&self) -> RunReport {
        let started = Instant::now();
        let metrics = Arc::new(DownloadMetrics::default());
        let mut report = RunReport::new();

        let outcome = AssertUnwindSafe(self.run(&mut report, &metrics))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| {
                Err(DownloadError::TaskFailed {
                    reason: format!("driver panicked: {}", panic_message(panic.as_ref())),
                })
            });

        match outcome {
            Ok(()) => {
                report.settle();
                self.set_state(RunState::Completed);
            }
            Err(e) => {
                error!("Download of {} failed: {}", self.config.url, e.full_message());
                report.status = RunStatus::Error;
                report.message = e.full_message();
                self.set_state(RunState::Failed);
            }
        }

        report.metrics = metrics.snapshot();
        report.elapsed_secs = started.elapsed().as_secs_f64();
        self.emit(ProgressEvent::RunFinished {
            status: report.status,
            message: report.message.clone(),
        });
        report
    }

    async fn run(&self, report: &mut RunReport, metrics: &Arc<DownloadMetrics>) -> Result<()> {
        self.set_state(RunState::FetchingSeries);
        info!("Scraping information for: {}", self.config.url);
        let series = self.client.get_document(&self.config.url, &self.headers).await?;

        self.set_state(RunState::CreatingDirectory);
        let title = self.driver.title(&Page::parse(&series))?;
        info!("Title: {}", title);
        let directory = self.config.path.join(sanitize(&title));
        ensure_directory(&directory).await?;
        report.title = Some(title.clone());
        report.directory = Some(directory.clone());

        self.set_state(RunState::EnumeratingChapters);
        let scrape_started = Instant::now();
        let chapters = self.driver.chapter_map(&Page::parse(&series))?;
        info!(
            "Scraped info for {} chapter(s) in {:.2} seconds",
            chapters.len(),
            scrape_started.elapsed().as_secs_f64()
        );
        let selected = chapters.filter(|index| self.selection.matches(index));
        metrics.record_chapters_selected(selected.len());
        self.emit(ProgressEvent::ChapterCountKnown { total: selected.len() });

        self.set_state(RunState::DownloadingChapters);
        info!("Starting download for: {} ({} chapter(s))", title, selected.len());
        let download_started = Instant::now();
        let jobs = selected
            .into_iter()
            .map(|(index, url)| ChapterJob::new(index, url, directory.clone()));
        for outcome in self.download_chapters(jobs, metrics).await {
            match outcome {
                Ok(path) => report.archives.push(path),
                Err(failure) => report.failures.push(failure),
            }
        }
        info!(
            "Finished downloading: {} in {:.2} seconds",
            title,
            download_started.elapsed().as_secs_f64()
        );
        Ok(())
    }

    /// Fan out one task per chapter, at most `threads` at a time
    async fn download_chapters<I>(
        &self,
        jobs: I,
        metrics: &Arc<DownloadMetrics>,
    ) -> Vec<std::result::Result<PathBuf, ChapterFailure>>
    where
        I: IntoIterator<Item = ChapterJob>,
    {
        let context = Arc::new(ChapterContext {
            driver: self.driver.clone(),
            fetcher: PageFetcher::new(self.client.clone(), self.headers.clone(), self.page_executor),
            progress: self.progress.clone(),
            metrics: metrics.clone(),
        });

        let tasks = jobs.into_iter().map(|job| {
            let context = context.clone();
            async move {
                let index = job.index.raw().to_string();
                context.emit(ProgressEvent::ChapterStarted { index: index.clone() });

                let task_context = context.clone();
                let handle = tokio::spawn(async move { task_context.download_chapter(job).await });
                let result = match handle.await {
                    Ok(result) => result,
                    Err(e) => Err(DownloadError::TaskFailed { reason: e.to_string() }),
                };
                context.finish_chapter(index, result)
            }
        });

        self.chapter_executor.run(tasks).await
    }
}
