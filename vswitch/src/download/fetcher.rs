//! The download seam used when obtaining a variant.

use std::path::Path;
use std::sync::Arc;

use super::error::DownloadResult;
use super::http::HttpDownloader;
use super::progress::ProgressSink;
use super::strategy::{DownloadStrategy, ProgressStrategy, SimpleStrategy};
use crate::version::VersionedVariant;

/// Places the bytes of a variant at a local path.
pub trait VariantFetcher: Send + Sync {
    /// Download `variant` to `dest`, replacing whatever is there.
    ///
    /// Returns the number of bytes written.
    fn fetch(&self, variant: &VersionedVariant, dest: &Path) -> DownloadResult<u64>;
}

/// Transport selection, driven by the `fast_download` feature toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Plain synchronous fetch.
    Simple,
    /// Fetch with byte progress reporting.
    Progress,
}

impl Transport {
    /// Transport for the `fast_download` toggle.
    pub fn from_fast_download(fast_download: bool) -> Self {
        if fast_download {
            Self::Progress
        } else {
            Self::Simple
        }
    }
}

/// Archive-backed [`VariantFetcher`].
pub struct RemoteFetcher {
    downloader: HttpDownloader,
    strategy: Box<dyn DownloadStrategy>,
}

impl RemoteFetcher {
    /// Create a fetcher with an explicit strategy.
    pub fn new(downloader: HttpDownloader, strategy: Box<dyn DownloadStrategy>) -> Self {
        Self {
            downloader,
            strategy,
        }
    }

    /// Create a fetcher for `transport`, reporting progress to `sink` when
    /// the transport supports it.
    pub fn for_transport(
        downloader: HttpDownloader,
        transport: Transport,
        sink: Arc<dyn ProgressSink>,
    ) -> Self {
        let strategy: Box<dyn DownloadStrategy> = match transport {
            Transport::Simple => Box::new(SimpleStrategy::new()),
            Transport::Progress => Box::new(ProgressStrategy::new(sink)),
        };
        Self::new(downloader, strategy)
    }

    /// Name of the active strategy.
    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }
}

impl VariantFetcher for RemoteFetcher {
    fn fetch(&self, variant: &VersionedVariant, dest: &Path) -> DownloadResult<u64> {
        self.strategy.fetch(&self.downloader, variant, dest)
    }
}
