//! Per-file and batch migration.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::error::MigrateResult;
use super::ignore::IgnoreList;
use super::obtain::{ObtainSource, Obtainer};
use super::report::MigrationReport;
use crate::cache::VariantCache;
use crate::checksum::ChecksumIndex;
use crate::download::VariantFetcher;
use crate::fanout::{execute, ProcessingMode};
use crate::remote::VariantProbe;
use crate::resolve::Resolver;
use crate::version::{TrackedFile, VersionList, VersionedVariant};

/// What happened to the file a migration evicted.
///
/// Caching is best effort: a failure here loses the ability to switch back
/// without downloading, but does not stop the migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheOutcome {
    /// The installed variant was moved into the cache.
    Cached,
    /// There was no identifiable installed variant to keep.
    NothingToCache,
    /// Moving the installed variant into the cache failed.
    Failed(String),
}

/// Result of migrating one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// On the ignore list; not inspected.
    Ignored,
    /// Installed and target variants are the same.
    Unchanged,
    /// No variant exists at or before the target version.
    NoVariant,
    /// The target variant was put in place.
    Migrated {
        from: Option<VersionedVariant>,
        to: VersionedVariant,
        cached: CacheOutcome,
        source: ObtainSource,
    },
}

/// Moves tracked files between versions.
///
/// Each file is handled on its own: resolve the installed and target
/// variants, evict the installed one into the cache, then obtain the target
/// one. Concurrent migrations of distinct files never touch the same path.
pub struct MigrationEngine {
    resolver: Resolver,
    obtainer: Obtainer,
    cache: VariantCache,
    install_root: PathBuf,
    ignore: IgnoreList,
}

impl std::fmt::Debug for MigrationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationEngine")
            .field("install_root", &self.install_root)
            .field("cache", &self.cache)
            .field("ignore", &self.ignore)
            .finish_non_exhaustive()
    }
}

impl MigrationEngine {
    /// Create an engine with the default ignore list and no verification.
    ///
    /// # Arguments
    ///
    /// * `probe` - Existence checks against the archive
    /// * `fetcher` - Downloads of variants missing from the cache
    /// * `install_root` - Root of the live installation
    /// * `cache_root` - Root of the variant cache
    pub fn new(
        probe: Arc<dyn VariantProbe>,
        fetcher: Arc<dyn VariantFetcher>,
        install_root: impl Into<PathBuf>,
        cache_root: impl Into<PathBuf>,
    ) -> Self {
        let install_root = install_root.into();
        let cache = VariantCache::new(cache_root);
        Self {
            resolver: Resolver::new(probe),
            obtainer: Obtainer::new(cache.clone(), install_root.clone(), fetcher),
            cache,
            install_root,
            ignore: IgnoreList::default(),
        }
    }

    /// Verify every placed file against `index`.
    pub fn with_checksums(mut self, index: Arc<ChecksumIndex>) -> Self {
        self.obtainer = self.obtainer.with_checksums(index);
        self
    }

    /// Replace the ignore list.
    pub fn with_ignore_list(mut self, ignore: IgnoreList) -> Self {
        self.ignore = ignore;
        self
    }

    /// The resolver used by this engine.
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Root of the live installation.
    pub fn install_root(&self) -> &Path {
        &self.install_root
    }

    /// The variant cache.
    pub fn cache(&self) -> &VariantCache {
        &self.cache
    }

    /// Migrate one file from `current` to `target`.
    ///
    /// # Errors
    ///
    /// Paths that are not plain relative paths, unknown versions, failed
    /// probes and failures to obtain the target variant are fatal. Failure to
    /// cache the installed variant is not; it is reported in the outcome.
    pub fn migrate_file(
        &self,
        file: &TrackedFile,
        current: &str,
        target: &str,
        versions: &VersionList,
    ) -> MigrateResult<FileOutcome> {
        file.check_relative()?;
        if self.ignore.is_ignored(file) {
            debug!(file = %file, "Ignored");
            return Ok(FileOutcome::Ignored);
        }

        versions.require(current)?;
        versions.require(target)?;
        if current == target {
            return Ok(FileOutcome::Unchanged);
        }

        let from = self.resolver.resolve(file, current, versions)?;
        let to = match self.resolver.resolve(file, target, versions)? {
            Some(to) => to,
            None => return Ok(FileOutcome::NoVariant),
        };
        if from.as_ref() == Some(&to) {
            debug!(file = %file, variant = %to, "Already at target variant");
            return Ok(FileOutcome::Unchanged);
        }

        let cached = self.evict(file, from.as_ref());
        let source = self.obtainer.obtain(&to)?;
        info!(
            file = %file,
            from = from.as_ref().map(VersionedVariant::version).unwrap_or("-"),
            to = to.version(),
            source = ?source,
            "Migrated"
        );

        Ok(FileOutcome::Migrated {
            from,
            to,
            cached,
            source,
        })
    }

    /// Migrate every file in `files` from `current` to `target`.
    ///
    /// Both versions, every tracked path and the checksum index are validated
    /// before any file is touched. Files are then migrated according to
    /// `mode`; the first fatal error ends the batch. Files already migrated at
    /// that point stay migrated.
    ///
    /// The checksum index is only loaded here when the engine was built
    /// [`with_checksums`](Self::with_checksums). Callers that also query the
    /// index elsewhere without verification should call
    /// [`ChecksumIndex::load`] themselves before the parallel phase.
    pub fn migrate_all(
        self: &Arc<Self>,
        files: Vec<TrackedFile>,
        current: &str,
        target: &str,
        versions: &VersionList,
        mode: ProcessingMode,
    ) -> MigrateResult<MigrationReport> {
        versions.require(current)?;
        versions.require(target)?;
        for file in &files {
            file.check_relative()?;
        }
        self.obtainer.preload()?;

        info!(
            files = files.len(),
            from = current,
            to = target,
            mode = ?mode,
            verify = self.obtainer.verifies(),
            "Starting migration"
        );

        let engine = Arc::clone(self);
        let current = current.to_string();
        let target = target.to_string();
        let versions = Arc::new(versions.clone());

        let outcomes = execute(mode, files, move |file: TrackedFile| {
            engine
                .migrate_file(&file, &current, &target, &versions)
                .map(|outcome| (file, outcome))
        })?;

        let report = MigrationReport::from_outcomes(outcomes.iter().map(|(f, o)| (f, o)));
        info!(
            migrated = report.migrated(),
            unchanged = report.unchanged,
            cache_failures = report.cache_failures.len(),
            "Migration finished"
        );
        Ok(report)
    }

    /// Move the installed bytes of `file` into the cache as `installed`.
    fn evict(&self, file: &TrackedFile, installed: Option<&VersionedVariant>) -> CacheOutcome {
        let Some(installed) = installed else {
            debug!(file = %file, "Installed variant unknown, nothing to cache");
            return CacheOutcome::NothingToCache;
        };

        let live = file.install_path(&self.install_root);
        match fs::symlink_metadata(&live) {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(file = %file, "Not installed, nothing to cache");
                return CacheOutcome::NothingToCache;
            }
            Err(e) => {
                warn!(file = %file, error = %e, "Could not inspect installed file, not caching");
                return CacheOutcome::Failed(e.to_string());
            }
        }

        match self.cache.admit(&live, installed) {
            Ok(_) => CacheOutcome::Cached,
            Err(e) => {
                warn!(
                    file = %file,
                    variant = %installed,
                    error = %e,
                    "Failed to cache installed file, switching back will need a download"
                );
                CacheOutcome::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::{DownloadError, DownloadResult};
    use crate::migrate::MigrateError;
    use crate::remote::{RemoteError, RemoteResult};
    use crate::resolve::ResolveError;
    use crate::version::VersionError;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// In-memory archive acting as both probe and fetcher.
    #[derive(Default)]
    struct Archive {
        objects: HashMap<String, Vec<u8>>,
        probes: AtomicUsize,
        fetches: AtomicUsize,
        unreachable: bool,
    }

    impl Archive {
        fn with(mut self, name: &str, bytes: &[u8]) -> Self {
            self.objects.insert(name.to_string(), bytes.to_vec());
            self
        }
    }

    impl VariantProbe for Archive {
        fn exists(&self, variant: &VersionedVariant) -> RemoteResult<bool> {
            self.probes.fetch_add(1, Ordering::SeqCst);
            if self.unreachable {
                return Err(RemoteError::Request {
                    url: variant.remote_path(),
                    reason: "connection refused".into(),
                });
            }
            Ok(self.objects.contains_key(&variant.remote_path()))
        }
    }

    impl VariantFetcher for Archive {
        fn fetch(&self, variant: &VersionedVariant, dest: &Path) -> DownloadResult<u64> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            let bytes = self
                .objects
                .get(&variant.remote_path())
                .ok_or_else(|| DownloadError::Status {
                    url: variant.remote_path(),
                    status: 404,
                })?;
            fs::create_dir_all(dest.parent().unwrap()).unwrap();
            fs::write(dest, bytes).unwrap();
            Ok(bytes.len() as u64)
        }
    }

    fn versions() -> VersionList {
        VersionList::new(["1.0", "1.1", "1.2"])
    }

    fn engine(temp: &TempDir, archive: Arc<Archive>) -> MigrationEngine {
        MigrationEngine::new(
            archive.clone(),
            archive,
            temp.path().join("install"),
            temp.path().join("cache"),
        )
    }

    fn install(temp: &TempDir, path: &str, bytes: &[u8]) {
        let full = TrackedFile::new(path).install_path(&temp.path().join("install"));
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, bytes).unwrap();
    }

    fn installed(temp: &TempDir, path: &str) -> Vec<u8> {
        fs::read(TrackedFile::new(path).install_path(&temp.path().join("install"))).unwrap()
    }

    #[test]
    fn test_same_version_is_noop_without_probing() {
        let temp = TempDir::new().unwrap();
        let archive = Arc::new(Archive::default().with("a.txt.1.0", b"v1.0"));
        let engine = engine(&temp, archive.clone());

        let outcome = engine
            .migrate_file(&"a.txt".into(), "1.1", "1.1", &versions())
            .unwrap();

        assert_eq!(outcome, FileOutcome::Unchanged);
        assert_eq!(archive.probes.load(Ordering::SeqCst), 0);
        assert_eq!(archive.fetches.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_same_resolved_variant_is_noop() {
        let temp = TempDir::new().unwrap();
        let archive = Arc::new(Archive::default().with("a.txt.1.0", b"v1.0"));
        let engine = engine(&temp, archive.clone());
        install(&temp, "a.txt", b"v1.0");

        let outcome = engine
            .migrate_file(&"a.txt".into(), "1.0", "1.2", &versions())
            .unwrap();

        assert_eq!(outcome, FileOutcome::Unchanged);
        assert_eq!(installed(&temp, "a.txt"), b"v1.0");
        assert_eq!(archive.fetches.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_migration_caches_installed_and_downloads_target() {
        let temp = TempDir::new().unwrap();
        let archive = Arc::new(
            Archive::default()
                .with("bin/app.dll.1.0", b"v1.0")
                .with("bin/app.dll.1.2", b"v1.2"),
        );
        let engine = engine(&temp, archive);
        install(&temp, "bin/app.dll", b"v1.0");
        let file = TrackedFile::new("bin/app.dll");

        let outcome = engine.migrate_file(&file, "1.1", "1.2", &versions()).unwrap();

        assert_eq!(
            outcome,
            FileOutcome::Migrated {
                from: Some(file.at("1.0")),
                to: file.at("1.2"),
                cached: CacheOutcome::Cached,
                source: ObtainSource::Download,
            }
        );
        assert_eq!(installed(&temp, "bin/app.dll"), b"v1.2");
        assert!(engine.cache().contains(&file.at("1.0")));
    }

    #[test]
    fn test_no_target_variant_leaves_file_alone() {
        let temp = TempDir::new().unwrap();
        let archive = Arc::new(Archive::default().with("a.txt.1.2", b"v1.2"));
        let engine = engine(&temp, archive);
        install(&temp, "a.txt", b"v1.2");

        let outcome = engine
            .migrate_file(&"a.txt".into(), "1.2", "1.1", &versions())
            .unwrap();

        assert_eq!(outcome, FileOutcome::NoVariant);
        assert_eq!(installed(&temp, "a.txt"), b"v1.2");
    }

    #[test]
    fn test_file_new_in_target_has_nothing_to_cache() {
        let temp = TempDir::new().unwrap();
        let archive = Arc::new(Archive::default().with("new.pak.1.2", b"fresh"));
        let engine = engine(&temp, archive);

        let outcome = engine
            .migrate_file(&"new.pak".into(), "1.0", "1.2", &versions())
            .unwrap();

        match outcome {
            FileOutcome::Migrated { from, cached, .. } => {
                assert_eq!(from, None);
                assert_eq!(cached, CacheOutcome::NothingToCache);
            }
            other => panic!("Expected Migrated, got {:?}", other),
        }
        assert_eq!(installed(&temp, "new.pak"), b"fresh");
    }

    #[test]
    fn test_missing_installed_file_has_nothing_to_cache() {
        let temp = TempDir::new().unwrap();
        let archive = Arc::new(
            Archive::default()
                .with("a.txt.1.0", b"v1.0")
                .with("a.txt.1.2", b"v1.2"),
        );
        let engine = engine(&temp, archive);

        let outcome = engine
            .migrate_file(&"a.txt".into(), "1.0", "1.2", &versions())
            .unwrap();

        assert!(matches!(
            outcome,
            FileOutcome::Migrated {
                cached: CacheOutcome::NothingToCache,
                ..
            }
        ));
    }

    #[test]
    fn test_cache_failure_still_places_target() {
        let temp = TempDir::new().unwrap();
        let archive = Arc::new(
            Archive::default()
                .with("a.txt.1.0", b"old")
                .with("a.txt.1.2", b"new"),
        );
        let engine = engine(&temp, archive);
        install(&temp, "a.txt", b"old");
        // A regular file where the cache directory should be.
        fs::write(temp.path().join("cache"), b"not a directory").unwrap();
        let file = TrackedFile::new("a.txt");

        let outcome = engine.migrate_file(&file, "1.0", "1.2", &versions()).unwrap();

        match outcome {
            FileOutcome::Migrated {
                from,
                to,
                cached: CacheOutcome::Failed(_),
                source: ObtainSource::Download,
            } => {
                assert_eq!(from, Some(file.at("1.0")));
                assert_eq!(to, file.at("1.2"));
            }
            other => panic!("Expected Migrated with failed caching, got {:?}", other),
        }
        assert_eq!(installed(&temp, "a.txt"), b"new");
    }

    #[test]
    fn test_cache_failure_is_reported_not_fatal_in_batch() {
        let temp = TempDir::new().unwrap();
        let archive = Arc::new(
            Archive::default()
                .with("a.txt.1.0", b"old")
                .with("a.txt.1.2", b"new"),
        );
        let engine = Arc::new(engine(&temp, archive));
        install(&temp, "a.txt", b"old");
        fs::write(temp.path().join("cache"), b"not a directory").unwrap();

        let report = engine
            .migrate_all(
                vec!["a.txt".into()],
                "1.0",
                "1.2",
                &versions(),
                ProcessingMode::Parallel,
            )
            .unwrap();

        assert_eq!(report.downloaded, 1);
        assert_eq!(report.cache_failures.len(), 1);
        assert_eq!(report.cache_failures[0].0, TrackedFile::new("a.txt"));
        assert_eq!(installed(&temp, "a.txt"), b"new");
    }

    #[test]
    fn test_escaping_path_is_rejected_before_any_work() {
        let temp = TempDir::new().unwrap();
        let archive = Arc::new(
            Archive::default()
                .with("../escaped.txt.1.0", b"old")
                .with("../escaped.txt.1.2", b"new"),
        );
        let engine = engine(&temp, archive.clone());

        let result = engine.migrate_file(&"../escaped.txt".into(), "1.0", "1.2", &versions());

        assert!(matches!(result, Err(MigrateError::UnsafePath(_))));
        assert!(!temp.path().join("escaped.txt").exists());
        assert_eq!(archive.probes.load(Ordering::SeqCst), 0);
        assert_eq!(archive.fetches.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_migrate_all_rejects_unsafe_path_before_touching_files() {
        let temp = TempDir::new().unwrap();
        let archive = Arc::new(
            Archive::default()
                .with("a.txt.1.0", b"old")
                .with("a.txt.1.2", b"new"),
        );
        let engine = Arc::new(engine(&temp, archive.clone()));
        install(&temp, "a.txt", b"old");

        let result = engine.migrate_all(
            vec!["a.txt".into(), "bin\\..\\..\\outside.dll".into()],
            "1.0",
            "1.2",
            &versions(),
            ProcessingMode::Parallel,
        );

        assert!(matches!(result, Err(MigrateError::UnsafePath(_))));
        assert_eq!(installed(&temp, "a.txt"), b"old");
        assert_eq!(archive.probes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_ignored_file_is_never_touched() {
        let temp = TempDir::new().unwrap();
        let archive = Arc::new(
            Archive::default()
                .with("logs/run.log.1.0", b"v1.0")
                .with("logs/run.log.1.2", b"v1.2"),
        );
        let engine = engine(&temp, archive.clone());
        install(&temp, "logs/run.log", b"local log");

        let outcome = engine
            .migrate_file(&"logs/run.log".into(), "1.0", "1.2", &versions())
            .unwrap();

        assert_eq!(outcome, FileOutcome::Ignored);
        assert_eq!(installed(&temp, "logs/run.log"), b"local log");
        assert_eq!(archive.probes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unknown_version_is_error() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp, Arc::new(Archive::default()));

        let result = engine.migrate_file(&"a.txt".into(), "1.0", "9.9", &versions());

        assert!(matches!(
            result,
            Err(MigrateError::Version(VersionError::Unknown(v))) if v == "9.9"
        ));
    }

    #[test]
    fn test_probe_failure_is_fatal() {
        let temp = TempDir::new().unwrap();
        let archive = Arc::new(Archive {
            unreachable: true,
            ..Default::default()
        });
        let engine = engine(&temp, archive);
        install(&temp, "a.txt", b"v1.0");

        let result = engine.migrate_file(&"a.txt".into(), "1.0", "1.2", &versions());

        assert!(matches!(
            result,
            Err(MigrateError::Resolve(ResolveError::Probe { .. }))
        ));
        assert_eq!(installed(&temp, "a.txt"), b"v1.0");
    }

    #[test]
    fn test_migrate_all_reports_counts() {
        let temp = TempDir::new().unwrap();
        let archive = Arc::new(
            Archive::default()
                .with("a.txt.1.0", b"a1.0")
                .with("a.txt.1.2", b"a1.2")
                .with("b.txt.1.0", b"b1.0")
                .with("c.txt.1.2", b"c1.2"),
        );
        let engine = Arc::new(engine(&temp, archive));
        install(&temp, "a.txt", b"a1.0");
        install(&temp, "b.txt", b"b1.0");
        let files: Vec<TrackedFile> =
            vec!["a.txt".into(), "b.txt".into(), "c.txt".into(), "logs/x".into()];

        for mode in [ProcessingMode::Serial, ProcessingMode::Parallel] {
            let report = engine
                .migrate_all(files.clone(), "1.0", "1.0", &versions(), mode)
                .unwrap();
            assert_eq!(report.unchanged, 3);
            assert_eq!(report.ignored, 1);
        }

        let report = engine
            .migrate_all(files, "1.0", "1.2", &versions(), ProcessingMode::Parallel)
            .unwrap();

        assert_eq!(report.downloaded, 2);
        assert_eq!(report.unchanged, 1);
        assert_eq!(report.ignored, 1);
        assert!(report.cache_failures.is_empty());
        assert_eq!(installed(&temp, "a.txt"), b"a1.2");
        assert_eq!(installed(&temp, "c.txt"), b"c1.2");
    }

    #[test]
    fn test_migrate_all_validates_before_touching_files() {
        let temp = TempDir::new().unwrap();
        let archive = Arc::new(Archive::default().with("a.txt.1.2", b"v1.2"));
        let engine = Arc::new(engine(&temp, archive.clone()));

        let result = engine.migrate_all(
            vec!["a.txt".into()],
            "0.1",
            "1.2",
            &versions(),
            ProcessingMode::Parallel,
        );

        assert!(matches!(result, Err(MigrateError::Version(_))));
        assert_eq!(archive.probes.load(Ordering::SeqCst), 0);
    }
}
