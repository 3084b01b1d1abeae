//! Filesystem move with a cross-device fallback.
//!
//! The cache and the installation usually live on the same volume, where a
//! rename is instant. When they don't, the rename is refused and the file
//! is copied and the source removed instead.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::{debug, warn};

/// How a [`move_file`] call was carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveMethod {
    /// Atomic rename on one filesystem.
    Renamed,
    /// Streamed copy followed by removal of the source.
    Copied,
    /// Streamed copy; the source could not be removed and is left behind.
    CopiedSourceKept,
}

/// Move `source` to `destination`, creating parent directories as needed.
///
/// A rename is attempted first. If the platform reports that the two paths
/// are on different devices, the file is copied and the source deleted.
/// Failure to delete the source after a successful copy is logged but not
/// reported: the destination is already correct. Any other rename error is
/// returned unchanged.
pub fn move_file(source: &Path, destination: &Path) -> io::Result<MoveMethod> {
    move_with(
        source,
        destination,
        |from: &Path, to: &Path| fs::rename(from, to),
        |path: &Path| fs::remove_file(path),
    )
}

fn move_with<R, D>(
    source: &Path,
    destination: &Path,
    rename: R,
    remove: D,
) -> io::Result<MoveMethod>
where
    R: Fn(&Path, &Path) -> io::Result<()>,
    D: Fn(&Path) -> io::Result<()>,
{
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }

    match rename(source, destination) {
        Ok(()) => Ok(MoveMethod::Renamed),
        Err(e) if is_cross_device(&e) => {
            debug!(
                source = %source.display(),
                destination = %destination.display(),
                "Rename crosses devices, copying instead"
            );
            copy_then_remove_with(source, destination, remove)
        }
        Err(e) => Err(e),
    }
}

/// Copy `source` to `destination` and remove `source`.
pub fn copy_then_remove(source: &Path, destination: &Path) -> io::Result<MoveMethod> {
    copy_then_remove_with(source, destination, |path: &Path| fs::remove_file(path))
}

fn copy_then_remove_with<D>(source: &Path, destination: &Path, remove: D) -> io::Result<MoveMethod>
where
    D: Fn(&Path) -> io::Result<()>,
{
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }

    {
        let mut reader = BufReader::new(File::open(source)?);
        let mut writer = BufWriter::new(File::create(destination)?);
        io::copy(&mut reader, &mut writer)?;
        writer.flush()?;
    }

    match remove(source) {
        Ok(()) => Ok(MoveMethod::Copied),
        Err(e) => {
            warn!(
                source = %source.display(),
                error = %e,
                "Copied file but could not remove the original"
            );
            Ok(MoveMethod::CopiedSourceKept)
        }
    }
}

/// Whether `err` means "rename cannot cross filesystems".
///
/// The portable error kind is checked first; the raw platform code covers
/// errors built from an OS code the standard library does not classify.
pub fn is_cross_device(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::CrossesDevices
        || err.raw_os_error().is_some_and(cross_device_code)
}

#[cfg(unix)]
fn cross_device_code(code: i32) -> bool {
    code == libc::EXDEV
}

#[cfg(windows)]
fn cross_device_code(code: i32) -> bool {
    // ERROR_NOT_SAME_DEVICE
    code == 0x11
}

#[cfg(not(any(unix, windows)))]
fn cross_device_code(_code: i32) -> bool {
    false
}
