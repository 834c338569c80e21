//! MD5 checksum utilities for dataset verification
//!
//! The upstream checksum manifest publishes MD5 digests, so that is the only
//! algorithm supported here. Digests are rendered as lower-case hex and
//! compared case-insensitively.

use crate::error::{CommonError, Result};
use std::io::Read;
use std::path::Path;

/// Compute MD5 checksum of bytes
pub fn compute_md5(data: &[u8]) -> String {
    format!("{:x}", md5::compute(data))
}

/// Compute MD5 checksum of any readable source, 8 KiB at a time
pub fn compute_md5_reader<R: Read>(reader: &mut R) -> Result<String> {
    let mut context = md5::Context::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        context.consume(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", context.compute()))
}

/// Compute MD5 checksum of a file
pub fn compute_file_md5(path: impl AsRef<Path>) -> Result<String> {
    let mut file = std::fs::File::open(path)?;
    compute_md5_reader(&mut file)
}

/// Compare two hex digests ignoring case and surrounding whitespace
pub fn digests_match(actual: &str, expected: &str) -> bool {
    actual.trim().eq_ignore_ascii_case(expected.trim())
}

/// Verify a file against an expected digest
///
/// Returns `Ok(())` on match and [`CommonError::ChecksumMismatch`] otherwise.
pub fn verify_file_md5(path: impl AsRef<Path>, expected: &str) -> Result<()> {
    let path = path.as_ref();
    let actual = compute_file_md5(path)?;
    if digests_match(&actual, expected) {
        Ok(())
    } else {
        Err(CommonError::ChecksumMismatch {
            file: path.display().to_string(),
            expected: expected.trim().to_string(),
            actual,
        })
    }
}
