//! Progress hooks for downloads.
//!
//! The library never renders anything itself. A UI hands a [`ProgressSink`]
//! to the progress transport and receives one [`ProgressHandle`] per
//! transfer.

/// Byte-level progress callback.
///
/// # Arguments
///
/// * `downloaded` - Bytes written so far
/// * `total` - Expected size from `Content-Length` (0 if unknown)
pub type ProgressCallback = Box<dyn Fn(u64, u64) + Send + Sync>;

/// Factory for per-transfer progress handles.
pub trait ProgressSink: Send + Sync {
    /// A transfer labelled `label` of `total` bytes (0 if unknown) started.
    fn start(&self, label: &str, total: u64) -> Box<dyn ProgressHandle>;
}

/// Progress of a single transfer.
pub trait ProgressHandle: Send + Sync {
    /// Record that `downloaded` of `total` bytes have been written.
    fn update(&self, downloaded: u64, total: u64);

    /// The transfer ended, successfully or not.
    fn finish(&self);
}

/// Sink that discards all progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn start(&self, _label: &str, _total: u64) -> Box<dyn ProgressHandle> {
        Box::new(NoProgress)
    }
}

impl ProgressHandle for NoProgress {
    fn update(&self, _downloaded: u64, _total: u64) {}

    fn finish(&self) {}
}
