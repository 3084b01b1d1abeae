//! Access to the remote version archive.
//!
//! The archive is a plain HTTP file server protected by Basic auth. It
//! publishes three manifests at its root and one object per variant:
//!
//! ```text
//! versions.txt          ordered version labels, oldest first
//! files.txt             installation-relative paths of tracked files
//! files.sfv             CRC32 of every published variant
//! <path>.<version>      bytes of one variant
//! ```
//!
//! The rest of the crate talks to the archive through the traits in this
//! module so resolution and migration can be exercised without a network.

mod client;
mod credentials;
mod error;
mod manifest;
mod traits;

pub use client::{ArchiveClient, DEFAULT_ARCHIVE_URL};
pub use credentials::Credentials;
pub use error::{RemoteError, RemoteResult};
pub use manifest::{manifest_lines, CHECKSUMS_MANIFEST, FILES_MANIFEST, VERSIONS_MANIFEST};
pub use traits::{ManifestSource, VariantProbe};
