//! Dataset acquisition across the whole manifest

use super::fetcher::Fetcher;
use super::manifest::{ChecksumManifest, DatasetManifest};
use super::verifier::{decide, Decision, DownloadReason};
use crate::config::{ExtractConfig, MissingChecksumPolicy};
use crate::dataset::Dataset;
use crate::error::{FetchError, PipelineError};
use f1_etl_common::checksum::verify_file_md5;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Result of acquiring one dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AcquireOutcome {
    /// Local copy matched the manifest; no request was made
    Skipped { path: PathBuf },
    Downloaded { path: PathBuf, reason: DownloadReason },
    Failed { error: FetchError },
}

impl AcquireOutcome {
    /// Local path, when the dataset is available
    pub fn path(&self) -> Option<&Path> {
        match self {
            AcquireOutcome::Skipped { path } | AcquireOutcome::Downloaded { path, .. } => {
                Some(path)
            },
            AcquireOutcome::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, AcquireOutcome::Failed { .. })
    }
}

/// What verification data the run had
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VerificationStatus {
    /// Caller asked to skip verification
    Forced,
    Available { entries: usize },
    Unavailable { reason: String },
}

/// One outcome per manifest entry, in manifest order
#[derive(Debug, Clone, Serialize)]
pub struct AcquireReport {
    pub verification: VerificationStatus,
    pub outcomes: Vec<(Dataset, AcquireOutcome)>,
}

impl AcquireReport {
    pub fn get(&self, dataset: Dataset) -> Option<&AcquireOutcome> {
        self.outcomes
            .iter()
            .find(|(d, _)| *d == dataset)
            .map(|(_, outcome)| outcome)
    }

    /// Datasets that failed, or whose reported file is gone from disk
    pub fn unavailable(&self) -> Vec<Dataset> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| !outcome.path().is_some_and(Path::is_file))
            .map(|(dataset, _)| *dataset)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.unavailable().is_empty()
    }
}

/// Drives [`Fetcher`] and the integrity verifier over a dataset manifest
pub struct Acquirer {
    fetcher: Fetcher,
    config: ExtractConfig,
}

impl Acquirer {
    pub fn new(config: ExtractConfig) -> Result<Self, PipelineError> {
        let fetcher = Fetcher::new(config.show_progress)?;
        Ok(Self::with_fetcher(fetcher, config))
    }

    pub fn with_fetcher(fetcher: Fetcher, config: ExtractConfig) -> Self {
        Self { fetcher, config }
    }

    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Acquire every dataset of the configured manifest
    pub async fn acquire_all(&self, force: bool) -> Result<AcquireReport, PipelineError> {
        let manifest = self.config.manifest();
        let checksum_url = self.config.checksum_manifest_url();
        self.acquire(&manifest, &checksum_url, force).await
    }

    /// Make every manifest entry available locally
    ///
    /// Entries are handled independently: a failed download is recorded and
    /// the next entry is still attempted. Only an unusable extraction
    /// directory is an error.
    pub async fn acquire(
        &self,
        manifest: &DatasetManifest,
        checksum_url: &str,
        force: bool,
    ) -> Result<AcquireReport, PipelineError> {
        let extract_dir = &self.config.extract_dir;
        tokio::fs::create_dir_all(extract_dir)
            .await
            .map_err(|source| PipelineError::ExtractDir {
                path: extract_dir.display().to_string(),
                source,
            })?;

        let (checksums, verification) = if force {
            info!("Forced extraction, skipping checksum verification");
            (None, VerificationStatus::Forced)
        } else {
            self.load_checksums(checksum_url).await
        };

        // Without verification data nothing local can be trusted, whatever the policy
        let policy = match verification {
            VerificationStatus::Unavailable { .. } => MissingChecksumPolicy::Redownload,
            _ => self.config.missing_checksum_policy,
        };

        let mut outcomes = Vec::with_capacity(manifest.len());
        for (dataset, url) in manifest.entries() {
            let outcome = self
                .acquire_one(*dataset, url, checksums.as_ref(), policy, force)
                .await;
            outcomes.push((*dataset, outcome));
        }

        Ok(AcquireReport {
            verification,
            outcomes,
        })
    }

    async fn load_checksums(
        &self,
        checksum_url: &str,
    ) -> (Option<ChecksumManifest>, VerificationStatus) {
        info!(url = checksum_url, "Fetching checksum manifest");

        let body = match self
            .fetcher
            .fetch_text(checksum_url, self.config.manifest_timeout())
            .await
        {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "Checksum manifest unavailable, every dataset will be downloaded");
                return (None, VerificationStatus::Unavailable { reason: e.to_string() });
            },
        };

        match ChecksumManifest::parse(&body) {
            Ok(checksums) => {
                let entries = checksums.len();
                info!(entries, "Checksum manifest loaded");
                (Some(checksums), VerificationStatus::Available { entries })
            },
            Err(e) => {
                warn!(error = %e, "Checksum manifest unparsable, every dataset will be downloaded");
                (None, VerificationStatus::Unavailable { reason: e.to_string() })
            },
        }
    }

    async fn acquire_one(
        &self,
        dataset: Dataset,
        url: &str,
        checksums: Option<&ChecksumManifest>,
        policy: MissingChecksumPolicy,
        force: bool,
    ) -> AcquireOutcome {
        let dest = self.config.local_path(dataset);

        let file_name = dataset.file_name();
        let expected = checksums.and_then(|c| c.get(&file_name));

        let decision = if force {
            Decision::Download(DownloadReason::Forced)
        } else {
            decide(&dest, expected, policy)
        };

        let reason = match decision {
            Decision::Keep => {
                info!(dataset = %dataset, path = %dest.display(), "Local file is current, skipping download");
                return AcquireOutcome::Skipped { path: dest };
            },
            Decision::Download(reason) => reason,
        };

        match self
            .fetcher
            .fetch(url, &dest, self.config.dataset_timeout())
            .await
        {
            Ok(path) => {
                info!(dataset = %dataset, ?reason, "Dataset downloaded");
                // A stale upstream manifest is not fatal; the next run downloads again
                if let Some(expected) = expected {
                    if let Err(e) = verify_file_md5(&path, expected) {
                        warn!(dataset = %dataset, error = %e, "Downloaded file does not match the published checksum");
                    }
                }
                AcquireOutcome::Downloaded { path, reason }
            },
            Err(error) => {
                warn!(dataset = %dataset, error = %error, "Dataset download failed");
                AcquireOutcome::Failed { error }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_lists_failed_and_vanished_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let present = dir.path().join("constructors.csv");
        std::fs::write(&present, "constructorId,name\n").unwrap();

        let report = AcquireReport {
            verification: VerificationStatus::Forced,
            outcomes: vec![
                (Dataset::Constructors, AcquireOutcome::Skipped { path: present }),
                (
                    Dataset::Drivers,
                    AcquireOutcome::Downloaded {
                        path: dir.path().join("drivers.csv"),
                        reason: DownloadReason::Forced,
                    },
                ),
                (
                    Dataset::Races,
                    AcquireOutcome::Failed {
                        error: FetchError::HttpStatus {
                            url: "http://x/races.csv".to_string(),
                            status: 500,
                        },
                    },
                ),
            ],
        };

        assert_eq!(report.unavailable(), vec![Dataset::Drivers, Dataset::Races]);
        assert!(!report.is_complete());
        assert!(report.get(Dataset::Races).unwrap().is_failed());
        assert!(report.get(Dataset::Results).is_none());
    }
}
