//! Manifest names and line splitting.

/// Ordered version list.
pub const VERSIONS_MANIFEST: &str = "versions.txt";

/// Tracked file list.
pub const FILES_MANIFEST: &str = "files.txt";

/// SFV checksum manifest.
pub const CHECKSUMS_MANIFEST: &str = "files.sfv";

/// Split a manifest body into its non-blank lines.
///
/// CRLF is normalised to LF before splitting and each line is trimmed.
pub fn manifest_lines(body: &str) -> Vec<String> {
    body.replace("\r\n", "\n")
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
