//! vswitch - switch an installation between published versions
//!
//! A remote archive stores every tracked file of an installation once per
//! version in which it changed. This library resolves which stored variant
//! each file needs for a target version, keeps the variants it replaces in a
//! local cache, and fetches the rest from the archive with optional CRC32
//! verification.
//!
//! # Modules
//!
//! - [`version`]: version list and variant naming
//! - [`remote`]: archive client, manifests and existence probes
//! - [`resolve`]: per-file version resolution
//! - [`download`]: variant downloads and progress reporting
//! - [`checksum`]: SFV checksum index and installed-version detection
//! - [`cache`]: local store of evicted variants
//! - [`migrate`]: per-file and batch migrations
//! - [`fanout`]: fail-fast concurrent execution
//! - [`fsutil`]: cross-device safe moves
//! - [`config`]: persistent settings

pub mod cache;
pub mod checksum;
pub mod config;
pub mod download;
pub mod fanout;
pub mod fsutil;
pub mod migrate;
pub mod remote;
pub mod resolve;
pub mod version;

#[cfg(test)]
mod testutil;
