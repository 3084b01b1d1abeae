//! CRC32 calculation for file verification.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crc32fast::Hasher;

use super::error::{ChecksumError, ChecksumResult};

/// Buffer size for reading files during checksum calculation (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Calculate the CRC32 (IEEE) of a file.
pub fn file_crc32(path: &Path) -> ChecksumResult<u32> {
    let read_failed = |e: io::Error| ChecksumError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    };

    let mut file = File::open(path).map_err(read_failed)?;
    let mut hasher = Hasher::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        let bytes_read = match file.read(&mut buffer) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(read_failed(e)),
        };

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize())
}

/// Verify that the file at `path` has CRC32 `expected`.
///
/// `name` only labels the error.
pub fn verify_file(path: &Path, name: &str, expected: u32) -> ChecksumResult<()> {
    let actual = file_crc32(path)?;
    if actual != expected {
        return Err(ChecksumError::Mismatch {
            name: name.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}
