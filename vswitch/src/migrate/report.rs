//! Summary of a migration batch.

use std::fmt;

use super::engine::{CacheOutcome, FileOutcome};
use super::obtain::ObtainSource;
use crate::version::TrackedFile;

/// Per-outcome counts for a finished batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Files already at the target variant.
    pub unchanged: usize,
    /// Files with no variant at or before the target.
    pub no_variant: usize,
    /// Files excluded by the ignore list.
    pub ignored: usize,
    /// Files restored from the cache.
    pub from_cache: usize,
    /// Files downloaded because the cache had no entry.
    pub downloaded: usize,
    /// Files downloaded because the cached entry was corrupt.
    pub redownloaded: usize,
    /// Evictions that could not be cached.
    pub cache_failures: Vec<(TrackedFile, String)>,
}

impl MigrationReport {
    /// Build a report from per-file outcomes.
    pub fn from_outcomes<'a, I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = (&'a TrackedFile, &'a FileOutcome)>,
    {
        let mut report = Self::default();
        for (file, outcome) in outcomes {
            report.record(file, outcome);
        }
        report
    }

    /// Account for one file.
    pub fn record(&mut self, file: &TrackedFile, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Ignored => self.ignored += 1,
            FileOutcome::Unchanged => self.unchanged += 1,
            FileOutcome::NoVariant => self.no_variant += 1,
            FileOutcome::Migrated { cached, source, .. } => {
                match source {
                    ObtainSource::Cache => self.from_cache += 1,
                    ObtainSource::Download => self.downloaded += 1,
                    ObtainSource::Redownload => self.redownloaded += 1,
                }
                if let CacheOutcome::Failed(reason) = cached {
                    self.cache_failures.push((file.clone(), reason.clone()));
                }
            }
        }
    }

    /// Files whose installed bytes changed.
    pub fn migrated(&self) -> usize {
        self.from_cache + self.downloaded + self.redownloaded
    }

    /// Files looked at.
    pub fn total(&self) -> usize {
        self.migrated() + self.unchanged + self.no_variant + self.ignored
    }

    /// Whether any file was touched.
    pub fn is_noop(&self) -> bool {
        self.migrated() == 0
    }
}

impl fmt::Display for MigrationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} files changed ({} from cache, {} downloaded, {} re-downloaded); \
             {} unchanged, {} without variant, {} ignored",
            self.migrated(),
            self.total(),
            self.from_cache,
            self.downloaded,
            self.redownloaded,
            self.unchanged,
            self.no_variant,
            self.ignored,
        )?;
        if !self.cache_failures.is_empty() {
            write!(f, "; {} could not be cached", self.cache_failures.len())?;
        }
        Ok(())
    }
}
