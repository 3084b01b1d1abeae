//! Installed-version detection from an on-disk fingerprint.
//!
//! Persisted "current version" state drifts whenever the installation is
//! patched behind our back. The install manifest shipped with every version
//! changes with each release, so its CRC32 identifies the installed version.

use std::path::Path;

use tracing::{debug, info};

use super::crc::file_crc32;
use super::error::{ChecksumError, ChecksumResult};
use super::index::ChecksumIndex;
use crate::version::{TrackedFile, VersionList};

/// Installation manifest hashed to identify the installed version.
pub const INSTALL_MANIFEST: &str = "uplay_install.manifest";

/// Identify the installed version by fingerprinting `manifest`.
///
/// The manifest under `install_root` is hashed and the hash looked up in the
/// checksum index. Only entries naming `manifest` itself are considered; the
/// version suffix of the match is returned.
///
/// # Errors
///
/// Fails when the manifest cannot be read or when no published variant of
/// the manifest has this checksum. The installed version is never guessed.
pub fn detect_installed_version(
    index: &ChecksumIndex,
    install_root: &Path,
    manifest: &TrackedFile,
    versions: &VersionList,
) -> ChecksumResult<String> {
    let path = manifest.install_path(install_root);
    let crc = file_crc32(&path)?;
    debug!(path = %path.display(), crc = format_args!("{:08X}", crc), "Hashed install manifest");

    let wanted = manifest.normalized();
    let version = index
        .filenames_for(crc)?
        .iter()
        .filter_map(|name| versions.split_suffix(name))
        .find(|(file, _)| TrackedFile::new(*file).normalized() == wanted)
        .map(|(_, version)| version.to_string())
        .ok_or_else(|| ChecksumError::UnrecognizedInstall {
            manifest: manifest.to_string(),
            crc,
        })?;

    info!(version = %version, "Detected installed version");
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn versions() -> VersionList {
        VersionList::new(["1.0", "1.1", "1.2"])
    }

    fn install_with_manifest(contents: &[u8]) -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(INSTALL_MANIFEST), contents).unwrap();
        temp
    }

    #[test]
    fn test_detects_version_from_manifest_crc() {
        let install = install_with_manifest(b"manifest for 1.1");
        let crc = crc32fast::hash(b"manifest for 1.1");
        let index = ChecksumIndex::from_lines([
            format!("{}.1.0 {:08X}", INSTALL_MANIFEST, crc32fast::hash(b"manifest for 1.0")),
            format!("{}.1.1 {:08X}", INSTALL_MANIFEST, crc),
        ])
        .unwrap();

        let version = detect_installed_version(
            &index,
            install.path(),
            &TrackedFile::new(INSTALL_MANIFEST),
            &versions(),
        )
        .unwrap();

        assert_eq!(version, "1.1");
    }

    #[test]
    fn test_ignores_other_files_with_same_crc() {
        let install = install_with_manifest(b"shared bytes");
        let crc = crc32fast::hash(b"shared bytes");
        let index = ChecksumIndex::from_lines([
            format!("other.bin.1.0 {:08X}", crc),
            format!("{}.1.2 {:08X}", INSTALL_MANIFEST, crc),
        ])
        .unwrap();

        let version = detect_installed_version(
            &index,
            install.path(),
            &TrackedFile::new(INSTALL_MANIFEST),
            &versions(),
        )
        .unwrap();

        assert_eq!(version, "1.2");
    }

    #[test]
    fn test_unknown_manifest_is_fatal() {
        let install = install_with_manifest(b"patched by someone else");
        let index = ChecksumIndex::from_lines([format!("{}.1.0 1", INSTALL_MANIFEST)]).unwrap();

        let result = detect_installed_version(
            &index,
            install.path(),
            &TrackedFile::new(INSTALL_MANIFEST),
            &versions(),
        );

        assert!(matches!(
            result,
            Err(ChecksumError::UnrecognizedInstall { .. })
        ));
    }

    #[test]
    fn test_missing_manifest_is_read_error() {
        let install = TempDir::new().unwrap();
        let index = ChecksumIndex::from_lines(Vec::<String>::new()).unwrap();

        let result = detect_installed_version(
            &index,
            install.path(),
            &TrackedFile::new(INSTALL_MANIFEST),
            &versions(),
        );

        assert!(matches!(result, Err(ChecksumError::ReadFailed { .. })));
    }
}
