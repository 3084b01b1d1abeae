//! SFV manifest parsing.
//!
//! Each meaningful line is `<versioned-filename><whitespace><crc32-hex>`.
//! Blank lines and lines starting with `;` are comments. Filenames cannot
//! contain whitespace, and a line with more than two fields is malformed.

use super::error::{ChecksumError, ChecksumResult};

/// One manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SfvEntry {
    /// Versioned filename as written in the manifest.
    pub filename: String,
    /// CRC32 of the variant.
    pub crc32: u32,
}

/// Parse a single line; `Ok(None)` for blank and comment lines.
///
/// `line_no` is 1-based and only used for error reporting.
pub fn parse_line(line_no: usize, line: &str) -> ChecksumResult<Option<SfvEntry>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with(';') {
        return Ok(None);
    }

    let malformed = |reason: &str| ChecksumError::Malformed {
        line_no,
        line: line.to_string(),
        reason: reason.to_string(),
    };

    let mut fields = line.split_whitespace();
    let (filename, value) = match (fields.next(), fields.next()) {
        (Some(filename), Some(value)) => (filename, value),
        _ => return Err(malformed("expected '<filename> <crc32>'")),
    };
    if fields.next().is_some() {
        return Err(malformed("unexpected fields after the CRC32"));
    }

    let crc32 = u32::from_str_radix(value, 16)
        .map_err(|e| malformed(&format!("invalid CRC32: {}", e)))?;

    Ok(Some(SfvEntry {
        filename: filename.to_string(),
        crc32,
    }))
}

/// Parse every line of a manifest, failing on the first malformed one.
pub fn parse_lines<I, S>(lines: I) -> ChecksumResult<Vec<SfvEntry>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut entries = Vec::new();
    for (idx, line) in lines.into_iter().enumerate() {
        if let Some(entry) = parse_line(idx + 1, line.as_ref())? {
            entries.push(entry);
        }
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_hex() {
        let entry = parse_line(1, "bin\\app.dll.1.2 1234").unwrap().unwrap();
        assert_eq!(entry.filename, "bin\\app.dll.1.2");
        assert_eq!(entry.crc32, 0x1234);
    }

    #[test]
    fn test_parse_line_multiple_spaces_and_case() {
        let entry = parse_line(1, "  data/world.pak.1.0    DeadBeef ").unwrap().unwrap();
        assert_eq!(entry.filename, "data/world.pak.1.0");
        assert_eq!(entry.crc32, 0xDEAD_BEEF);
    }

    #[test]
    fn test_extra_fields_are_malformed() {
        match parse_line(4, "a.txt.1.0 12 34") {
            Err(ChecksumError::Malformed { line_no, reason, .. }) => {
                assert_eq!(line_no, 4);
                assert!(reason.contains("unexpected fields"));
            }
            other => panic!("Expected Malformed error, got {:?}", other),
        }
        assert!(parse_line(1, "Support/Read Me.txt.1.0 0000ABCD").is_err());
    }

    #[test]
    fn test_comments_and_blank_lines_skipped() {
        assert_eq!(parse_line(1, "; generated by tool").unwrap(), None);
        assert_eq!(parse_line(2, "   ").unwrap(), None);
    }

    #[test]
    fn test_malformed_lines_report_line_number() {
        match parse_line(7, "no-checksum-here") {
            Err(ChecksumError::Malformed { line_no, .. }) => assert_eq!(line_no, 7),
            other => panic!("Expected Malformed error, got {:?}", other),
        }
        assert!(parse_line(3, "a.txt.1.0 xyz").is_err());
        assert!(parse_line(3, "a.txt.1.0 1FFFFFFFF").is_err());
    }

    #[test]
    fn test_parse_lines() {
        let entries = parse_lines(["; header", "", "a.txt.1.0 1", "a.txt.1.2 ff"]).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].crc32, 255);

        match parse_lines(["a.txt.1.0 1", "broken"]) {
            Err(ChecksumError::Malformed { line_no, .. }) => assert_eq!(line_no, 2),
            other => panic!("Expected Malformed error, got {:?}", other),
        }
    }
}
