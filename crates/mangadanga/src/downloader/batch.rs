//! Bounded concurrency for chapter and page jobs
//!
//! Jobs are plain futures. At most `limit` of them are polled at any time;
//! the rest wait in the source iterator until a slot frees up. Nothing here
//! spawns tasks, so callers decide what runs on its own task.

use futures::stream::{self, StreamExt, TryStreamExt};
use std::future::Future;
use std::num::NonZeroUsize;
use tracing::debug;

use crate::downloader::core::{DownloadError, Result};

/// Runs async jobs with a fixed upper bound on how many are in flight
#[derive(Debug, Clone, Copy)]
pub struct BoundedExecutor {
    limit: NonZeroUsize,
}

impl BoundedExecutor {
    /// Create an executor allowing `limit` concurrent jobs (`limit >= 1`)
    pub fn new(limit: usize) -> Result<Self> {
        let limit = NonZeroUsize::new(limit).ok_or_else(|| DownloadError::Configuration {
            message: "concurrency limit must be at least 1".to_string(),
            field: Some("limit".to_string()),
            suggestion: Some("Use 1 for sequential execution".to_string()),
        })?;
        Ok(Self { limit })
    }

    pub fn limit(&self) -> usize {
        self.limit.get()
    }

    /// Run every job to completion, results in completion order
    ///
    /// A failing job is just a value in `T`; it never cancels its siblings.
    pub async fn run<I, F, T>(&self, jobs: I) -> Vec<T>
    where
        I: IntoIterator<Item = F>,
        F: Future<Output = T>,
    {
        debug!("Running jobs with limit={}", self.limit);
        stream::iter(jobs)
            .buffer_unordered(self.limit.get())
            .collect()
            .await
    }

    /// Run every job to completion, results in submission order
    pub async fn run_ordered<I, F, T>(&self, jobs: I) -> Vec<T>
    where
        I: IntoIterator<Item = F>,
        F: Future<Output = T>,
    {
        stream::iter(jobs)
            .buffered(self.limit.get())
            .collect()
            .await
    }

    /// Run jobs in submission order, stopping at the first error
    ///
    /// Jobs still in flight when an error arrives are dropped and jobs not
    /// yet started never start. Meant for work where one failure makes the
    /// whole batch useless, like the pages of a single chapter.
    pub async fn try_run_ordered<I, F, T, E>(&self, jobs: I) -> std::result::Result<Vec<T>, E>
    where
        I: IntoIterator<Item = F>,
        F: Future<Output = std::result::Result<T, E>>,
    {
        stream::iter(jobs)
            .buffered(self.limit.get())
            .try_collect()
            .await
    }
}
