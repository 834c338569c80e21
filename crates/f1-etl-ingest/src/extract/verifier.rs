//! Integrity verification of local dataset files

use crate::config::MissingChecksumPolicy;
use f1_etl_common::checksum::{compute_file_md5, digests_match};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, warn};

/// Why a file is (re-)downloaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadReason {
    /// No local file
    Missing,
    /// Local digest differs from the manifest, or the file is unreadable
    Mismatch,
    /// No expected digest and the policy says re-download
    Unverified,
    /// Verification was bypassed by the caller
    Forced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Local file is current
    Keep,
    Download(DownloadReason),
}

impl Decision {
    pub fn is_download(self) -> bool {
        matches!(self, Decision::Download(_))
    }
}

/// Decide whether `path` has to be fetched again
///
/// A missing file is always downloaded. An existing file is kept only when
/// its MD5 matches `expected`, or when there is no expected digest and the
/// policy is [`MissingChecksumPolicy::TrustLocal`].
pub fn decide(path: &Path, expected: Option<&str>, policy: MissingChecksumPolicy) -> Decision {
    if !path.is_file() {
        return Decision::Download(DownloadReason::Missing);
    }

    let Some(expected) = expected else {
        return match policy {
            MissingChecksumPolicy::Redownload => Decision::Download(DownloadReason::Unverified),
            MissingChecksumPolicy::TrustLocal => Decision::Keep,
        };
    };

    match compute_file_md5(path) {
        Ok(actual) if digests_match(&actual, expected) => {
            debug!(path = %path.display(), digest = %actual, "Checksum matches");
            Decision::Keep
        },
        Ok(actual) => {
            debug!(path = %path.display(), expected, actual = %actual, "Checksum mismatch");
            Decision::Download(DownloadReason::Mismatch)
        },
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not read local file, treating as stale");
            Decision::Download(DownloadReason::Mismatch)
        },
    }
}

/// True when `path` is missing or its MD5 differs from `expected`
pub fn needs_download(path: &Path, expected: &str) -> bool {
    decide(path, Some(expected), MissingChecksumPolicy::Redownload).is_download()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const HELLO_MD5: &str = "6cd3556deb0da54bca060b4c39479839";

    fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_missing_file_needs_download() {
        let dir = TempDir::new().unwrap();
        assert!(needs_download(&dir.path().join("drivers.csv"), HELLO_MD5));
    }

    #[test]
    fn test_matching_file_is_kept_on_repeated_calls() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "drivers.csv", "Hello, world!");
        for _ in 0..3 {
            assert!(!needs_download(&path, HELLO_MD5));
        }
    }

    #[test]
    fn test_digest_comparison_ignores_case() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "drivers.csv", "Hello, world!");
        assert!(!needs_download(&path, &HELLO_MD5.to_uppercase()));
    }

    #[test]
    fn test_mismatch_needs_download() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "drivers.csv", "Hello, world?");
        assert_eq!(
            decide(&path, Some(HELLO_MD5), MissingChecksumPolicy::Redownload),
            Decision::Download(DownloadReason::Mismatch)
        );
    }

    #[test]
    fn test_missing_digest_follows_policy() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "races.csv", "raceId\n1\n");
        assert_eq!(
            decide(&path, None, MissingChecksumPolicy::Redownload),
            Decision::Download(DownloadReason::Unverified)
        );
        assert_eq!(decide(&path, None, MissingChecksumPolicy::TrustLocal), Decision::Keep);
    }

    #[test]
    fn test_missing_file_ignores_trust_local() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            decide(&dir.path().join("races.csv"), None, MissingChecksumPolicy::TrustLocal),
            Decision::Download(DownloadReason::Missing)
        );
    }
}
