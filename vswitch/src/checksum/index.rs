//! Bidirectional filename ↔ CRC32 index.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use tracing::{debug, info};

use super::error::{ChecksumError, ChecksumResult};
use super::sfv::{parse_lines, SfvEntry};
use crate::remote::ManifestSource;

/// Parsed manifest contents.
#[derive(Debug, Default)]
struct Entries {
    /// Normalised name → CRC32.
    by_name: HashMap<String, u32>,
    /// CRC32 → names as written in the manifest, in manifest order.
    by_crc: HashMap<u32, Vec<String>>,
}

impl Entries {
    fn build(entries: Vec<SfvEntry>) -> Self {
        let mut by_name = HashMap::with_capacity(entries.len());
        for entry in &entries {
            // Later lines override earlier ones for the same name.
            by_name.insert(normalize(&entry.filename), entry.crc32);
        }

        let mut by_crc: HashMap<u32, Vec<String>> = HashMap::new();
        for entry in entries {
            if by_name.get(&normalize(&entry.filename)) != Some(&entry.crc32) {
                continue;
            }
            let names = by_crc.entry(entry.crc32).or_default();
            if !names.contains(&entry.filename) {
                names.push(entry.filename);
            }
        }

        Self { by_name, by_crc }
    }
}

/// Index over the archive's checksum manifest.
///
/// The index is populated exactly once, either eagerly with [`load`] or on
/// first lookup. Population is serialised by an init guard, so concurrent
/// first use fetches the manifest a single time. Call [`load`] before any
/// fan-out so a manifest failure surfaces before files are touched.
///
/// Lookups treat `/` and `\` as equivalent. A CRC32 of zero is an ordinary
/// value; absence is reported as an error, never as zero.
///
/// [`load`]: ChecksumIndex::load
pub struct ChecksumIndex {
    source: Option<Arc<dyn ManifestSource>>,
    entries: OnceLock<Entries>,
    init: Mutex<()>,
}

impl std::fmt::Debug for ChecksumIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChecksumIndex")
            .field("loaded", &self.is_loaded())
            .field("entries", &self.entries.get().map(|e| e.by_name.len()))
            .finish()
    }
}

impl ChecksumIndex {
    /// Index that fetches the manifest from `source` on first use.
    pub fn lazy(source: Arc<dyn ManifestSource>) -> Self {
        Self {
            source: Some(source),
            entries: OnceLock::new(),
            init: Mutex::new(()),
        }
    }

    /// Index populated immediately from manifest lines.
    pub fn from_lines<I, S>(lines: I) -> ChecksumResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = OnceLock::new();
        let _ = entries.set(Entries::build(parse_lines(lines)?));
        Ok(Self {
            source: None,
            entries,
            init: Mutex::new(()),
        })
    }

    /// Populate the index if it is not populated yet.
    pub fn load(&self) -> ChecksumResult<()> {
        self.entries().map(|_| ())
    }

    /// Whether the manifest has been loaded.
    pub fn is_loaded(&self) -> bool {
        self.entries.get().is_some()
    }

    /// Number of distinct variant names in the index.
    pub fn len(&self) -> ChecksumResult<usize> {
        Ok(self.entries()?.by_name.len())
    }

    /// True when the manifest lists nothing.
    pub fn is_empty(&self) -> ChecksumResult<bool> {
        Ok(self.len()? == 0)
    }

    /// CRC32 listed for `name` (a versioned filename).
    pub fn crc32_for(&self, name: &str) -> ChecksumResult<u32> {
        self.entries()?
            .by_name
            .get(&normalize(name))
            .copied()
            .ok_or_else(|| ChecksumError::UnknownFile(name.to_string()))
    }

    /// First name listed with `crc32`, as written in the manifest.
    pub fn filename_for(&self, crc32: u32) -> ChecksumResult<String> {
        self.filenames_for(crc32)?
            .into_iter()
            .next()
            .ok_or(ChecksumError::UnknownChecksum(crc32))
    }

    /// Every name listed with `crc32`, in manifest order.
    ///
    /// Identical bytes published under several names share a checksum, so
    /// callers that know which file they hashed should filter this list.
    pub fn filenames_for(&self, crc32: u32) -> ChecksumResult<Vec<String>> {
        Ok(self
            .entries()?
            .by_crc
            .get(&crc32)
            .cloned()
            .unwrap_or_default())
    }

    fn entries(&self) -> ChecksumResult<&Entries> {
        if let Some(entries) = self.entries.get() {
            return Ok(entries);
        }

        let _guard = self.init.lock();
        if let Some(entries) = self.entries.get() {
            return Ok(entries);
        }

        let lines = match &self.source {
            Some(source) => source.checksum_lines()?,
            None => Vec::new(),
        };
        debug!(lines = lines.len(), "Parsing checksum manifest");
        let entries = Entries::build(parse_lines(lines)?);
        info!(entries = entries.by_name.len(), "Loaded checksum index");

        Ok(self.entries.get_or_init(|| entries))
    }
}

fn normalize(name: &str) -> String {
    name.replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{RemoteError, RemoteResult};
    use crate::version::{TrackedFile, VersionList};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    struct CountingSource {
        lines: Vec<String>,
        fetches: AtomicUsize,
        fail: bool,
    }

    impl CountingSource {
        fn new(lines: &[&str]) -> Self {
            Self {
                lines: lines.iter().map(|l| l.to_string()).collect(),
                fetches: AtomicUsize::new(0),
                fail: false,
            }
        }
    }

    impl ManifestSource for CountingSource {
        fn versions(&self) -> RemoteResult<VersionList> {
            Ok(VersionList::default())
        }

        fn tracked_files(&self) -> RemoteResult<Vec<TrackedFile>> {
            Ok(Vec::new())
        }

        fn checksum_lines(&self) -> RemoteResult<Vec<String>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            thread::sleep(std::time::Duration::from_millis(20));
            if self.fail {
                return Err(RemoteError::Status {
                    url: "files.sfv".to_string(),
                    status: 500,
                });
            }
            Ok(self.lines.clone())
        }
    }

    #[test]
    fn test_forward_and_reverse_lookup() {
        let index = ChecksumIndex::from_lines(["bin\\app.dll.1.2 1234"]).unwrap();

        assert_eq!(index.crc32_for("bin\\app.dll.1.2").unwrap(), 0x1234);
        assert_eq!(index.filename_for(0x1234).unwrap(), "bin\\app.dll.1.2");
    }

    #[test]
    fn test_lookup_ignores_separator_style() {
        let index = ChecksumIndex::from_lines(["bin\\app.dll.1.2 1234"]).unwrap();
        assert_eq!(index.crc32_for("bin/app.dll.1.2").unwrap(), 0x1234);
    }

    #[test]
    fn test_missing_entries_are_errors() {
        let index = ChecksumIndex::from_lines(["a.txt.1.0 10"]).unwrap();

        assert!(matches!(
            index.crc32_for("a.txt.1.2"),
            Err(ChecksumError::UnknownFile(_))
        ));
        assert!(matches!(
            index.filename_for(0x11),
            Err(ChecksumError::UnknownChecksum(0x11))
        ));
    }

    #[test]
    fn test_zero_checksum_is_a_real_value() {
        let index = ChecksumIndex::from_lines(["empty.txt.1.0 00000000"]).unwrap();

        assert_eq!(index.crc32_for("empty.txt.1.0").unwrap(), 0);
        assert_eq!(index.filename_for(0).unwrap(), "empty.txt.1.0");
    }

    #[test]
    fn test_shared_checksum_lists_all_names() {
        let index =
            ChecksumIndex::from_lines(["a.txt.1.0 AA", "b.txt.1.0 BB", "a.txt.1.1 AA"]).unwrap();

        assert_eq!(
            index.filenames_for(0xAA).unwrap(),
            vec!["a.txt.1.0".to_string(), "a.txt.1.1".to_string()]
        );
        assert_eq!(index.filename_for(0xAA).unwrap(), "a.txt.1.0");
        assert_eq!(index.len().unwrap(), 3);
    }

    #[test]
    fn test_redefined_name_drops_stale_reverse_entry() {
        let index = ChecksumIndex::from_lines(["a.txt.1.0 AA", "a.txt.1.0 BB"]).unwrap();

        assert_eq!(index.crc32_for("a.txt.1.0").unwrap(), 0xBB);
        assert!(index.filenames_for(0xAA).unwrap().is_empty());
    }

    #[test]
    fn test_lazy_index_loads_once_under_concurrency() {
        let source = Arc::new(CountingSource::new(&["a.txt.1.0 1"]));
        let index = Arc::new(ChecksumIndex::lazy(source.clone()));
        assert!(!index.is_loaded());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let index = Arc::clone(&index);
                thread::spawn(move || index.crc32_for("a.txt.1.0").unwrap())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 1);
        }
        assert!(index.is_loaded());
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_lazy_index_failure_is_retried_on_next_use() {
        let mut failing = CountingSource::new(&["a.txt.1.0 1"]);
        failing.fail = true;
        let source = Arc::new(failing);
        let index = ChecksumIndex::lazy(source.clone());

        assert!(matches!(index.load(), Err(ChecksumError::Manifest(_))));
        assert!(!index.is_loaded());
        assert!(index.load().is_err());
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_malformed_manifest_fails_load() {
        assert!(ChecksumIndex::from_lines(["a.txt.1.0 1", "garbage"]).is_err());
    }
}
