//! Version sequence and versioned file naming.
//!
//! Versions are opaque labels taken from the remote `versions.txt` manifest.
//! The only ordering that exists between them is their position in that
//! manifest (oldest first), so nothing here parses or compares labels.
//!
//! A [`TrackedFile`] is an installation-relative path as it appears in
//! `files.txt`. Pairing it with a version yields a [`VersionedVariant`], whose
//! name (`<path>.<version>`) addresses the remote object, the checksum
//! manifest entry and the cache entry alike.

mod variant;

pub use variant::{TrackedFile, UnsafePath, VersionedVariant};

use thiserror::Error;

/// Errors raised when a version label does not belong to the sequence.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// The label is not part of the remote version list.
    #[error("unknown version '{0}'")]
    Unknown(String),

    /// The remote version list contained no versions.
    #[error("version list is empty")]
    Empty,
}

/// Result type for version lookups.
pub type VersionResult<T> = Result<T, VersionError>;

/// Totally ordered list of published versions, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VersionList {
    versions: Vec<String>,
}

impl VersionList {
    /// Create a list from labels already in ascending order.
    pub fn new<I, S>(versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            versions: versions.into_iter().map(Into::into).collect(),
        }
    }

    /// Build the list from the newline-delimited manifest body.
    pub fn from_manifest(body: &str) -> Self {
        Self {
            versions: crate::remote::manifest_lines(body),
        }
    }

    /// Number of versions.
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    /// True when no versions are known.
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// All versions, oldest first.
    pub fn as_slice(&self) -> &[String] {
        &self.versions
    }

    /// Iterate over versions, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.versions.iter().map(String::as_str)
    }

    /// Most recent version.
    pub fn latest(&self) -> VersionResult<&str> {
        self.versions
            .last()
            .map(String::as_str)
            .ok_or(VersionError::Empty)
    }

    /// Sequence index of `version`.
    pub fn position(&self, version: &str) -> Option<usize> {
        self.versions.iter().position(|v| v == version)
    }

    /// Whether `version` is part of the sequence.
    pub fn contains(&self, version: &str) -> bool {
        self.position(version).is_some()
    }

    /// Fail with [`VersionError::Unknown`] unless `version` is known.
    pub fn require(&self, version: &str) -> VersionResult<usize> {
        self.position(version)
            .ok_or_else(|| VersionError::Unknown(version.to_string()))
    }

    /// Every version up to and including `target`, oldest first.
    pub fn through(&self, target: &str) -> VersionResult<&[String]> {
        let idx = self.require(target)?;
        Ok(&self.versions[..=idx])
    }

    /// True when `target` is older than the latest published version.
    pub fn is_downgrade(&self, target: &str) -> bool {
        self.versions.last().is_some_and(|latest| latest != target)
    }

    /// Split a versioned name into its file part and version suffix.
    ///
    /// Labels may contain dots, so the longest known version that the name
    /// ends with (preceded by a `.`) wins.
    pub fn split_suffix<'a>(&self, name: &'a str) -> Option<(&'a str, &'a str)> {
        self.versions
            .iter()
            .filter(|v| {
                name.len() > v.len() + 1
                    && name.ends_with(v.as_str())
                    && name.as_bytes()[name.len() - v.len() - 1] == b'.'
            })
            .max_by_key(|v| v.len())
            .map(|v| {
                let split = name.len() - v.len();
                (&name[..split - 1], &name[split..])
            })
    }
}
