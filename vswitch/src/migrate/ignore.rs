//! Paths that migrations never touch.

use crate::version::TrackedFile;

/// Installation-relative prefixes excluded by default.
///
/// Logs, anti-cheat privacy data, launcher install state, version-control
/// metadata and license files belong to the local installation rather than
/// to any published version.
pub const DEFAULT_IGNORED: &[&str] = &[
    "logs",
    "Support",
    "bin/BattlEye/Privacy",
    "bin/logs",
    "uplay_install.state",
    ".git",
    "LICENSE",
    "README.md",
];

/// Set of path prefixes excluded from caching and overwriting.
///
/// Matching is a plain string prefix test on the `/`-normalised relative
/// path, so `logs` also covers `logs.txt` and `logs/today.log`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreList {
    prefixes: Vec<String>,
}

impl Default for IgnoreList {
    fn default() -> Self {
        Self::new(DEFAULT_IGNORED.iter().copied())
    }
}

impl IgnoreList {
    /// Ignore list over `prefixes`. Either separator may be used.
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            prefixes: prefixes
                .into_iter()
                .map(|p| TrackedFile::new(p.as_ref()).normalized())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// An ignore list that matches nothing.
    pub fn empty() -> Self {
        Self {
            prefixes: Vec::new(),
        }
    }

    /// Whether `file` must be left alone.
    pub fn is_ignored(&self, file: &TrackedFile) -> bool {
        let path = file.normalized();
        self.prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// The normalised prefixes.
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }
}
