//! Error types for migrations.

use thiserror::Error;

use crate::cache::CacheError;
use crate::checksum::ChecksumError;
use crate::download::DownloadError;
use crate::fanout::WorkerError;
use crate::resolve::ResolveError;
use crate::version::{UnsafePath, VersionError};

/// Result type for migration operations.
pub type MigrateResult<T> = Result<T, MigrateError>;

/// Fatal migration errors.
///
/// Failures while evicting the installed file into the cache are not
/// represented here; they are reported through
/// [`CacheOutcome::Failed`](super::CacheOutcome::Failed) and the migration
/// carries on.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// A version label is not in the version list.
    #[error(transparent)]
    Version(#[from] VersionError),

    /// A tracked path would land outside the installation or cache.
    #[error(transparent)]
    UnsafePath(#[from] UnsafePath),

    /// Resolution against the archive failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// A cached variant could not be moved into place.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Downloading a variant failed.
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Checksum lookup or verification failed.
    #[error(transparent)]
    Checksum(#[from] ChecksumError),

    /// A per-file worker could not be started or died.
    #[error(transparent)]
    Worker(#[from] WorkerError),
}
