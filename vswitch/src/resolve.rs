//! Per-file version resolution.
//!
//! A file only has a stored variant for the versions in which it changed.
//! Resolving a file against a target version finds the most recent variant
//! published at or before that target, which is the content the file had
//! in the target version.
//!
//! No local index of published variants is trusted: every candidate version
//! is probed against the archive, all in parallel.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, trace};

use crate::fanout::{fan_out, WorkerError};
use crate::remote::{RemoteError, VariantProbe};
use crate::version::{TrackedFile, VersionError, VersionList, VersionedVariant};

/// Result type for resolution.
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Errors that abort a resolution.
///
/// "No variant exists" is not an error; it is `Ok(None)`.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The target version is not in the version list.
    #[error(transparent)]
    Version(#[from] VersionError),

    /// A probe could not be answered.
    #[error("failed to probe {variant}: {source}")]
    Probe {
        variant: String,
        #[source]
        source: RemoteError,
    },

    /// A probe worker could not be started or died.
    #[error(transparent)]
    Worker(#[from] WorkerError),
}

/// Finds the variant of a file that applies to a version.
#[derive(Clone)]
pub struct Resolver {
    probe: Arc<dyn VariantProbe>,
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver").finish_non_exhaustive()
    }
}

impl Resolver {
    /// Create a resolver probing through `probe`.
    pub fn new(probe: Arc<dyn VariantProbe>) -> Self {
        Self { probe }
    }

    /// Latest published variant of `file` at or before `target`.
    ///
    /// Every version up to `target` is probed concurrently. Once all probes
    /// have answered, candidates are scanned newest first and the first
    /// published one wins. `Ok(None)` means the file has no variant in that
    /// range.
    ///
    /// # Errors
    ///
    /// Fails if `target` is not in `versions`, or as soon as any probe fails.
    /// Results of the other probes are discarded in that case.
    pub fn resolve(
        &self,
        file: &TrackedFile,
        target: &str,
        versions: &VersionList,
    ) -> ResolveResult<Option<VersionedVariant>> {
        let candidates: Vec<VersionedVariant> = versions
            .through(target)?
            .iter()
            .map(|version| file.at(version.as_str()))
            .collect();

        let probe = Arc::clone(&self.probe);
        let published = fan_out(candidates.clone(), move |variant: VersionedVariant| {
            probe
                .exists(&variant)
                .map_err(|source| ResolveError::Probe {
                    variant: variant.name(),
                    source,
                })
        })?;

        let resolved = candidates
            .into_iter()
            .zip(published)
            .rev()
            .find(|(_, exists)| *exists)
            .map(|(variant, _)| variant);

        match &resolved {
            Some(variant) => trace!(
                file = %file,
                version = target,
                resolved = %variant,
                "Resolved file"
            ),
            None => debug!(
                file = %file,
                version = target,
                "No variant exists at or before target version"
            ),
        }

        Ok(resolved)
    }
}
