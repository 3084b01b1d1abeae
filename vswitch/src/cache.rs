//! Local store of evicted variants.
//!
//! The cache mirrors the installation tree. Each entry is the file a
//! migration replaced, stored under its versioned name:
//!
//! ```text
//! <cache>/bin/app.dll.1.0
//! <cache>/data/world.pak.1.2
//! ```
//!
//! Entries move in when a migration evicts a file and move back out when a
//! later migration needs that exact variant again, so there is at most one
//! physical copy of any variant.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::fsutil::{move_file, MoveMethod};
use crate::version::VersionedVariant;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Errors that can occur while using the cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// A directory sits where a cache entry should be.
    #[error("cache entry {} is a directory", .0.display())]
    EntryIsDirectory(PathBuf),

    /// Filesystem failure on a cache path.
    #[error("cache operation on {} failed: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Directory tree holding evicted variants.
#[derive(Debug, Clone)]
pub struct VariantCache {
    root: PathBuf,
}

impl VariantCache {
    /// Cache rooted at `root`. The directory is created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where `variant` is stored in this cache.
    pub fn entry_path(&self, variant: &VersionedVariant) -> PathBuf {
        variant.cache_path(&self.root)
    }

    /// Path of the cached entry for `variant`, if one exists.
    ///
    /// A directory in place of the entry is an error rather than a miss.
    pub fn lookup(&self, variant: &VersionedVariant) -> CacheResult<Option<PathBuf>> {
        let path = self.entry_path(variant);
        match fs::metadata(&path) {
            Ok(meta) if meta.is_dir() => Err(CacheError::EntryIsDirectory(path)),
            Ok(_) => Ok(Some(path)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::Io { path, source: e }),
        }
    }

    /// Whether a regular-file entry exists for `variant`.
    pub fn contains(&self, variant: &VersionedVariant) -> bool {
        matches!(self.lookup(variant), Ok(Some(_)))
    }

    /// Move the live file at `live_path` into the cache as `variant`.
    ///
    /// An existing entry for the same variant is overwritten.
    pub fn admit(&self, live_path: &Path, variant: &VersionedVariant) -> CacheResult<MoveMethod> {
        let entry = self.entry_path(variant);
        debug!(from = %live_path.display(), to = %entry.display(), "Caching file");
        move_file(live_path, &entry).map_err(|e| CacheError::Io {
            path: live_path.to_path_buf(),
            source: e,
        })
    }

    /// Move the cached entry at `entry` to `destination`.
    pub fn restore(&self, entry: &Path, destination: &Path) -> CacheResult<MoveMethod> {
        debug!(from = %entry.display(), to = %destination.display(), "Restoring from cache");
        move_file(entry, destination).map_err(|e| CacheError::Io {
            path: entry.to_path_buf(),
            source: e,
        })
    }
}
