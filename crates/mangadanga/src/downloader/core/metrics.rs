//! Counters for a download run
//!
//! Chapter jobs update these concurrently, so every field is an atomic.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Performance metrics for a download run
#[derive(Debug, Default)]
pub struct DownloadMetrics {
    pub chapters_selected: AtomicU64,
    pub chapters_completed: AtomicU64,
    pub chapters_failed: AtomicU64,
    pub pages_downloaded: AtomicU64,
    pub bytes_downloaded: AtomicU64,
}

impl DownloadMetrics {
    pub fn record_chapters_selected(&self, count: usize) {
        self.chapters_selected.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_chapter_completed(&self) {
        self.chapters_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_chapter_failed(&self) {
        self.chapters_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one page image transfer of `size` bytes
    pub fn record_page(&self, size: u64) {
        self.pages_downloaded.fetch_add(1, Ordering::Relaxed);
        self.bytes_downloaded.fetch_add(size, Ordering::Relaxed);
    }

    /// Get a snapshot of current metrics
    pub fn snapshot(&self) -> DownloadMetricsSnapshot {
        DownloadMetricsSnapshot {
            chapters_selected: self.chapters_selected.load(Ordering::Relaxed),
            chapters_completed: self.chapters_completed.load(Ordering::Relaxed),
            chapters_failed: self.chapters_failed.load(Ordering::Relaxed),
            pages_downloaded: self.pages_downloaded.load(Ordering::Relaxed),
            bytes_downloaded: self.bytes_downloaded.load(Ordering::Relaxed),
        }
    }
}

/// Immutable snapshot of download metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DownloadMetricsSnapshot {
    pub chapters_selected: u64,
    pub chapters_completed: u64,
    pub chapters_failed: u64,
    pub pages_downloaded: u64,
    pub bytes_downloaded: u64,
}

impl DownloadMetricsSnapshot {
    /// Calculate success rate as a fraction (0.0 to 1.0)
    pub fn success_rate(&self) -> f64 {
        if self.chapters_selected == 0 {
            0.0
        } else {
            self.chapters_completed as f64 / self.chapters_selected as f64
        }
    }
}
