//! Download transports.
//!
//! This module implements the Strategy pattern for choosing between a plain
//! fetch and a fetch whose progress can be observed.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use super::error::DownloadResult;
use super::http::HttpDownloader;
use super::progress::{ProgressCallback, ProgressHandle, ProgressSink};
use crate::version::VersionedVariant;

/// Strategy for fetching one variant.
pub trait DownloadStrategy: Send + Sync {
    /// Download `variant` to `dest` using `downloader`.
    ///
    /// Returns the number of bytes written.
    fn fetch(
        &self,
        downloader: &HttpDownloader,
        variant: &VersionedVariant,
        dest: &Path,
    ) -> DownloadResult<u64>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Plain synchronous fetch.
#[derive(Debug, Default)]
pub struct SimpleStrategy;

impl SimpleStrategy {
    /// Create a new simple strategy.
    pub fn new() -> Self {
        Self
    }
}

impl DownloadStrategy for SimpleStrategy {
    fn fetch(
        &self,
        downloader: &HttpDownloader,
        variant: &VersionedVariant,
        dest: &Path,
    ) -> DownloadResult<u64> {
        let remote_path = variant.remote_path();
        info!(file = %remote_path, "Downloading file");
        let bytes = downloader.download(&remote_path, dest)?;
        info!(file = %remote_path, bytes, "Finished downloading");
        Ok(bytes)
    }

    fn name(&self) -> &'static str {
        "simple"
    }
}

/// Fetch that reports byte progress to a [`ProgressSink`].
pub struct ProgressStrategy {
    sink: Arc<dyn ProgressSink>,
}

impl ProgressStrategy {
    /// Create a strategy reporting to `sink`.
    pub fn new(sink: Arc<dyn ProgressSink>) -> Self {
        Self { sink }
    }
}

impl std::fmt::Debug for ProgressStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressStrategy").finish_non_exhaustive()
    }
}

impl DownloadStrategy for ProgressStrategy {
    fn fetch(
        &self,
        downloader: &HttpDownloader,
        variant: &VersionedVariant,
        dest: &Path,
    ) -> DownloadResult<u64> {
        let remote_path = variant.remote_path();
        let handle: Arc<dyn ProgressHandle> =
            Arc::from(self.sink.start(&variant.name(), 0));

        let progress_handle = Arc::clone(&handle);
        let callback: ProgressCallback = Box::new(move |downloaded: u64, total: u64| {
            progress_handle.update(downloaded, total);
        });

        let result = downloader.download_with_progress(&remote_path, dest, callback);
        handle.finish();

        let bytes = result?;
        debug!(file = %remote_path, bytes, "Finished downloading");
        Ok(bytes)
    }

    fn name(&self) -> &'static str {
        "progress"
    }
}
