//! Tracked files and their per-version variants.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

/// A tracked path that would resolve outside the directory it is joined to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("tracked path '{0}' is not a plain relative path")]
pub struct UnsafePath(pub String);

/// Path of a tracked file relative to the installation root.
///
/// The path is kept exactly as listed in the remote manifest, which may use
/// either `/` or `\` as separator. Conversions to local and wire paths happen
/// on demand.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackedFile(String);

impl TrackedFile {
    /// Create a tracked file from its manifest path.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The path as written in the manifest.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path components, whatever separator the manifest used.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.split(|c: char| c == '/' || c == '\\').filter(|c| !c.is_empty())
    }

    /// The path with `/` separators, as used on the wire and for matching.
    pub fn normalized(&self) -> String {
        self.components().collect::<Vec<_>>().join("/")
    }

    /// Local path relative to the installation root.
    pub fn relative_path(&self) -> PathBuf {
        self.components().collect()
    }

    /// Fail unless the path stays below whatever root it is joined to.
    ///
    /// Rejects empty paths, leading separators, drive or scheme prefixes and
    /// `.`/`..` components.
    pub fn check_relative(&self) -> Result<(), UnsafePath> {
        let unsafe_path = || UnsafePath(self.0.clone());
        if self.0.starts_with(['/', '\\']) {
            return Err(unsafe_path());
        }

        let mut count = 0;
        for component in self.components() {
            if component == "." || component == ".." || component.contains(':') {
                return Err(unsafe_path());
            }
            count += 1;
        }
        if count == 0 {
            return Err(unsafe_path());
        }

        if self
            .relative_path()
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            Ok(())
        } else {
            Err(unsafe_path())
        }
    }

    /// Absolute location of this file under `install_root`.
    pub fn install_path(&self, install_root: &Path) -> PathBuf {
        install_root.join(self.relative_path())
    }

    /// Pair this file with a version.
    pub fn at(&self, version: impl Into<String>) -> VersionedVariant {
        VersionedVariant::new(self.clone(), version)
    }
}

impl fmt::Display for TrackedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrackedFile {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

/// A tracked file as it exists at one particular version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionedVariant {
    file: TrackedFile,
    version: String,
}

impl VersionedVariant {
    /// Create a variant of `file` at `version`.
    pub fn new(file: TrackedFile, version: impl Into<String>) -> Self {
        Self {
            file,
            version: version.into(),
        }
    }

    /// The tracked file.
    pub fn file(&self) -> &TrackedFile {
        &self.file
    }

    /// The version suffix.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// `<path>.<version>` with the manifest's own separators.
    ///
    /// This is the key used in the checksum manifest.
    pub fn name(&self) -> String {
        format!("{}.{}", self.file.as_str(), self.version)
    }

    /// `<path>.<version>` with `/` separators, relative to the archive root.
    pub fn remote_path(&self) -> String {
        format!("{}.{}", self.file.normalized(), self.version)
    }

    /// Location of this variant inside a cache tree rooted at `cache_root`.
    pub fn cache_path(&self, cache_root: &Path) -> PathBuf {
        let mut path = self.file.install_path(cache_root).into_os_string();
        path.push(".");
        path.push(&self.version);
        PathBuf::from(path)
    }

    /// Where the bytes of this variant live once installed.
    pub fn install_path(&self, install_root: &Path) -> PathBuf {
        self.file.install_path(install_root)
    }
}

impl fmt::Display for VersionedVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.file, self.version)
    }
}
