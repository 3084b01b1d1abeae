//! CRC32 integrity checks and the checksum index.
//!
//! The archive publishes an SFV manifest listing the CRC32 of every variant.
//! It serves two purposes:
//!
//! - verifying bytes restored from the cache or freshly downloaded
//! - identifying the installed version from the CRC32 of a well-known file
//!
//! CRC values in the manifest are hexadecimal, as in any SFV file.

mod crc;
mod error;
mod fingerprint;
mod index;
mod sfv;

pub use crc::{file_crc32, verify_file};
pub use error::{ChecksumError, ChecksumResult};
pub use fingerprint::{detect_installed_version, INSTALL_MANIFEST};
pub use index::ChecksumIndex;
pub use sfv::{parse_line, parse_lines, SfvEntry};
