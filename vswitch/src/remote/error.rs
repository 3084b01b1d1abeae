//! Error types for archive access.

use thiserror::Error;

/// Result type for archive operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Transport-level failures talking to the archive.
///
/// All of these are fatal to the batch that triggered them; nothing in the
/// crate retries a failed request.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The HTTP client could not be constructed.
    #[error("failed to create HTTP client: {0}")]
    ClientBuild(String),

    /// The request could not be sent or its body could not be read.
    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    /// The archive answered with an unexpected status.
    #[error("request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    /// The request did not complete in time.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },
}

impl RemoteError {
    /// Map a reqwest failure for `url`, keeping timeouts distinct.
    pub(crate) fn from_reqwest(url: &str, timeout_secs: u64, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
                timeout_secs,
            }
        } else {
            Self::Request {
                url: url.to_string(),
                reason: err.to_string(),
            }
        }
    }
}
