//! Error types for variant downloads.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for download operations.
pub type DownloadResult<T> = Result<T, DownloadError>;

/// Errors that can occur while downloading a variant.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The request could not be sent or the body could not be read.
    #[error("failed to download {url}: {reason}")]
    Request { url: String, reason: String },

    /// The archive answered with something other than 200.
    #[error("failed to download {url}: status {status}")]
    Status { url: String, status: u16 },

    /// Failed to create the destination directory.
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write the destination file.
    #[error("failed to write {}: {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
