//! Progress tracking and reporting for download runs

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;

use crate::downloader::orchestrator::RunState;

/// Progress callback for download runs
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Terminal outcome of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Every selected chapter was archived
    Success,
    /// Some chapters failed, at least one was archived
    Partial,
    /// The run aborted, or every selected chapter failed
    Error,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Success => write!(f, "success"),
            RunStatus::Partial => write!(f, "partial"),
            RunStatus::Error => write!(f, "error"),
        }
    }
}

/// Events emitted during a download run
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    StateChanged {
        state: RunState,
    },
    /// Number of chapters selected for download
    ChapterCountKnown {
        total: usize,
    },
    ChapterStarted {
        index: String,
    },
    ChapterFinished {
        index: String,
        path: PathBuf,
    },
    ChapterFailed {
        index: String,
        error: String,
    },
    /// Always the last event of a run, emitted exactly once
    RunFinished {
        status: RunStatus,
        message: String,
    },
}

/// Trait for progress reporting with more granular control
pub trait ProgressReporter: Send + Sync {
    fn on_state_changed(&self, _state: RunState) {}
    fn on_chapter_count_known(&self, _total: usize) {}
    fn on_chapter_started(&self, _index: &str) {}
    fn on_chapter_finished(&self, _index: &str, _path: &Path) {}
    fn on_chapter_failed(&self, _index: &str, _error: &str) {}
    fn on_run_finished(&self, _status: RunStatus, _message: &str) {}
}

/// Extension trait to convert ProgressReporter to ProgressCallback
pub trait IntoProgressCallback {
    fn into_callback(self) -> ProgressCallback;
}

impl<T: ProgressReporter + 'static> IntoProgressCallback for T {
    fn into_callback(self) -> ProgressCallback {
        Arc::new(move |event| match event {
            ProgressEvent::StateChanged { state } => self.on_state_changed(state),
            ProgressEvent::ChapterCountKnown { total } => self.on_chapter_count_known(total),
            ProgressEvent::ChapterStarted { index } => self.on_chapter_started(&index),
            ProgressEvent::ChapterFinished { index, path } => {
                self.on_chapter_finished(&index, &path);
            }
            ProgressEvent::ChapterFailed { index, error } => {
                self.on_chapter_failed(&index, &error);
            }
            ProgressEvent::RunFinished { status, message } => {
                self.on_run_finished(status, &message);
            }
        })
    }
}

/// Forward every event into a tokio channel
///
/// Useful when the consumer lives on another task (a UI loop, for instance).
/// Events sent after the receiver is dropped are discarded.
pub fn channel() -> (ProgressCallback, mpsc::UnboundedReceiver<ProgressEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let callback: ProgressCallback = Arc::new(move |event| {
        let _ = tx.send(event);
    });
    (callback, rx)
}

/// Simple console progress reporter implementation
#[derive(Debug, Default)]
pub struct ConsoleProgressReporter {
    pub verbose: bool,
    total: AtomicUsize,
    done: AtomicUsize,
}

impl ConsoleProgressReporter {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            ..Self::default()
        }
    }

    fn tick(&self) -> (usize, usize) {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        (done, self.total.load(Ordering::Relaxed))
    }
}

impl ProgressReporter for ConsoleProgressReporter {
    fn on_state_changed(&self, state: RunState) {
        if self.verbose {
            println!("🔄 {}", state);
        }
    }

    fn on_chapter_count_known(&self, total: usize) {
        self.total.store(total, Ordering::Relaxed);
        println!("📚 {} chapter(s) selected", total);
    }

    fn on_chapter_started(&self, index: &str) {
        if self.verbose {
            println!("📥 Downloading chapter {}", index);
        }
    }

    fn on_chapter_finished(&self, _index: &str, path: &Path) {
        let (done, total) = self.tick();
        println!("✅ [{}/{}] {}", done, total, path.display());
    }

    fn on_chapter_failed(&self, index: &str, error: &str) {
        let (done, total) = self.tick();
        eprintln!("❌ [{}/{}] Chapter {}: {}", done, total, index, error);
    }

    fn on_run_finished(&self, status: RunStatus, message: &str) {
        match status {
            RunStatus::Success => println!("🎉 Download finished"),
            RunStatus::Partial => eprintln!("⚠️ Download finished with failures: {}", message),
            RunStatus::Error => eprintln!("❌ Download failed: {}", message),
        }
    }
}

/// Null progress reporter that does nothing
#[derive(Debug, Default)]
pub struct NullProgressReporter;

impl ProgressReporter for NullProgressReporter {}

/// Composite progress reporter that forwards events to multiple reporters
pub struct CompositeProgressReporter {
    reporters: Vec<Box<dyn ProgressReporter>>,
}

impl std::fmt::Debug for CompositeProgressReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeProgressReporter")
            .field("reporters_count", &self.reporters.len())
            .finish()
    }
}

impl CompositeProgressReporter {
    pub fn new() -> Self {
        Self {
            reporters: Vec::new(),
        }
    }

    pub fn add_reporter<R: ProgressReporter + 'static>(mut self, reporter: R) -> Self {
        self.reporters.push(Box::new(reporter));
        self
    }
}

impl Default for CompositeProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for CompositeProgressReporter {
    fn on_state_changed(&self, state: RunState) {
        for reporter in &self.reporters {
            reporter.on_state_changed(state);
        }
    }

    fn on_chapter_count_known(&self, total: usize) {
        for reporter in &self.reporters {
            reporter.on_chapter_count_known(total);
        }
    }

    fn on_chapter_started(&self, index: &str) {
        for reporter in &self.reporters {
            reporter.on_chapter_started(index);
        }
    }

    fn on_chapter_finished(&self, index: &str, path: &Path) {
        for reporter in &self.reporters {
            reporter.on_chapter_finished(index, path);
        }
    }

    fn on_chapter_failed(&self, index: &str, error: &str) {
        for reporter in &self.reporters {
            reporter.on_chapter_failed(index, error);
        }
    }

    fn on_run_finished(&self, status: RunStatus, message: &str) {
        for reporter in &self.reporters {
            reporter.on_run_finished(status, message);
        }
    }
}
