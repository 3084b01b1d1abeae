//! Seams between the core and the archive.

use crate::version::{TrackedFile, VersionList, VersionedVariant};

use super::error::RemoteResult;

/// Answers whether a variant has been published.
///
/// Implementations must be shareable across the probe fan-out.
pub trait VariantProbe: Send + Sync {
    /// Check whether `variant` exists in the archive.
    ///
    /// `Ok(false)` means "not published"; `Err` means the question could not
    /// be answered and aborts the resolution that asked it.
    fn exists(&self, variant: &VersionedVariant) -> RemoteResult<bool>;
}

/// Source of the three archive manifests.
pub trait ManifestSource: Send + Sync {
    /// The ordered version list.
    fn versions(&self) -> RemoteResult<VersionList>;

    /// The tracked file list.
    fn tracked_files(&self) -> RemoteResult<Vec<TrackedFile>>;

    /// Raw lines of the checksum manifest.
    fn checksum_lines(&self) -> RemoteResult<Vec<String>>;
}
