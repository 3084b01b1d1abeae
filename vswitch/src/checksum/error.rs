//! Error types for checksum operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::remote::RemoteError;

/// Result type for checksum operations.
pub type ChecksumResult<T> = Result<T, ChecksumError>;

/// Errors that can occur while computing or looking up checksums.
#[derive(Debug, Error)]
pub enum ChecksumError {
    /// Failed to read a file being hashed.
    #[error("failed to read {}: {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A manifest line could not be parsed.
    #[error("malformed checksum line {line_no}: {line:?} ({reason})")]
    Malformed {
        line_no: usize,
        line: String,
        reason: String,
    },

    /// The manifest could not be fetched.
    #[error("failed to load checksum manifest: {0}")]
    Manifest(#[from] RemoteError),

    /// No checksum is listed for the named variant.
    #[error("could not find CRC32 for file: {0}")]
    UnknownFile(String),

    /// No variant is listed with this checksum.
    #[error("could not find a file with CRC32 {0:08X}")]
    UnknownChecksum(u32),

    /// A file's CRC32 does not match the manifest.
    #[error("checksum mismatch for {name}: expected {expected:08X}, got {actual:08X}")]
    Mismatch {
        name: String,
        expected: u32,
        actual: u32,
    },

    /// The installed manifest file matches no published version.
    #[error("installed {manifest} (CRC32 {crc:08X}) does not match any known version")]
    UnrecognizedInstall { manifest: String, crc: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_display_uses_hex() {
        let err = ChecksumError::Mismatch {
            name: "a.txt.1.0".to_string(),
            expected: 0x1234,
            actual: 0xABCDEF01,
        };
        assert_eq!(
            err.to_string(),
            "checksum mismatch for a.txt.1.0: expected 00001234, got ABCDEF01"
        );
    }
}
