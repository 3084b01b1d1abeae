//! Placing a target variant into the installation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use super::error::MigrateResult;
use crate::cache::VariantCache;
use crate::checksum::{verify_file, ChecksumError, ChecksumIndex, ChecksumResult};
use crate::download::VariantFetcher;
use crate::version::VersionedVariant;

/// Where the bytes of an obtained variant came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObtainSource {
    /// Moved back from the cache.
    Cache,
    /// Downloaded; nothing was cached.
    Download,
    /// The cached copy failed verification and was replaced by a download.
    Redownload,
}

/// Obtains variants from the cache or the archive.
///
/// With a checksum index attached, every placed file is verified. A cache
/// entry that fails verification is discarded in favour of a fresh
/// download; a download that fails verification is fatal.
pub struct Obtainer {
    cache: VariantCache,
    install_root: PathBuf,
    fetcher: Arc<dyn VariantFetcher>,
    checksums: Option<Arc<ChecksumIndex>>,
}

impl std::fmt::Debug for Obtainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Obtainer")
            .field("cache", &self.cache)
            .field("install_root", &self.install_root)
            .field("verify", &self.checksums.is_some())
            .finish()
    }
}

impl Obtainer {
    /// Create an obtainer without verification.
    pub fn new(
        cache: VariantCache,
        install_root: impl Into<PathBuf>,
        fetcher: Arc<dyn VariantFetcher>,
    ) -> Self {
        Self {
            cache,
            install_root: install_root.into(),
            fetcher,
            checksums: None,
        }
    }

    /// Verify placed files against `index`.
    pub fn with_checksums(mut self, index: Arc<ChecksumIndex>) -> Self {
        self.checksums = Some(index);
        self
    }

    /// Whether placed files are verified.
    pub fn verifies(&self) -> bool {
        self.checksums.is_some()
    }

    /// Load the checksum index now, if verification is on.
    pub fn preload(&self) -> ChecksumResult<()> {
        match &self.checksums {
            Some(index) => index.load(),
            None => Ok(()),
        }
    }

    /// Place `variant` at its installation path.
    pub fn obtain(&self, variant: &VersionedVariant) -> MigrateResult<ObtainSource> {
        let dest = variant.install_path(&self.install_root);

        let entry = match self.cache.lookup(variant) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(variant = %variant, error = %e, "Unusable cache entry, downloading instead");
                None
            }
        };

        let Some(entry) = entry else {
            self.download(variant, &dest)?;
            return Ok(ObtainSource::Download);
        };

        self.cache.restore(&entry, &dest)?;
        match self.verify(variant, &dest) {
            Ok(()) => {
                debug!(variant = %variant, "Restored from cache");
                Ok(ObtainSource::Cache)
            }
            Err(ChecksumError::Mismatch {
                expected, actual, ..
            }) => {
                warn!(
                    variant = %variant,
                    expected = format_args!("{:08X}", expected),
                    actual = format_args!("{:08X}", actual),
                    "Cached file is corrupt, downloading a fresh copy"
                );
                self.download(variant, &dest)?;
                Ok(ObtainSource::Redownload)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn download(&self, variant: &VersionedVariant, dest: &Path) -> MigrateResult<u64> {
        let bytes = self.fetcher.fetch(variant, dest)?;
        self.verify(variant, dest)?;
        debug!(variant = %variant, bytes, "Downloaded");
        Ok(bytes)
    }

    fn verify(&self, variant: &VersionedVariant, path: &Path) -> ChecksumResult<()> {
        let Some(index) = &self.checksums else {
            return Ok(());
        };
        let name = variant.name();
        let expected = index.crc32_for(&name)?;
        verify_file(path, &name, expected)
    }
}
