//! Extraction: download the datasets, skipping files whose checksum already
//! matches the published manifest

pub mod acquirer;
pub mod fetcher;
pub mod manifest;
pub mod verifier;

pub use acquirer::{AcquireOutcome, AcquireReport, Acquirer, VerificationStatus};
pub use fetcher::Fetcher;
pub use manifest::{ChecksumManifest, DatasetManifest, ManifestError};
pub use verifier::{decide, needs_download, Decision, DownloadReason};
