//! Integration tests for dataset acquisition against a mock upstream
//!
//! Covers:
//! - checksum manifest unavailable or unparsable: everything is downloaded
//! - an odd digest only affects its own file
//! - matching local file: skipped without a request
//! - stale local file: replaced
//! - one failing dataset does not stop the others
//! - forced extraction bypasses verification

use f1_etl_common::checksum::compute_md5;
use f1_etl_ingest::config::{ExtractConfig, MissingChecksumPolicy};
use f1_etl_ingest::extract::{AcquireOutcome, Acquirer, DownloadReason, VerificationStatus};
use f1_etl_ingest::{Dataset, FetchError};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MANIFEST_PATH: &str = "/arquivos_hash_md5sum.csv";

fn body(dataset: Dataset) -> String {
    match dataset {
        Dataset::Constructors => "constructorId,constructorRef,name\n1,mclaren,McLaren\n".to_string(),
        Dataset::Drivers => "driverId,forename,surname\n44,Lewis,Hamilton\n".to_string(),
        Dataset::Races => "raceId,year,name,date\n1,2009,Australian Grand Prix,2009-03-29\n".to_string(),
        Dataset::Results => {
            "resultId,raceId,driverId,constructorId,positionOrder,points,fastestLapTime\n\
             1,1,44,1,1,10,1:27.452\n"
                .to_string()
        },
    }
}

fn checksum_manifest() -> String {
    let mut manifest = String::from("arquivo,md5\n");
    for dataset in Dataset::ALL {
        manifest.push_str(&format!("{},{}\n", dataset.file_name(), compute_md5(body(dataset).as_bytes())));
    }
    manifest
}

fn config(server: &MockServer, dir: &TempDir) -> ExtractConfig {
    ExtractConfig {
        extract_dir: dir.path().join("extraction"),
        source_base_url: server.uri(),
        dataset_timeout_secs: 5,
        manifest_timeout_secs: 5,
        ..ExtractConfig::default()
    }
}

async fn mount_dataset(server: &MockServer, dataset: Dataset, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/{}", dataset.file_name())))
        .respond_with(ResponseTemplate::new(200).set_body_string(body(dataset)))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn mount_manifest(server: &MockServer, response: ResponseTemplate, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(MANIFEST_PATH))
        .respond_with(response)
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_manifest_failure_downloads_everything() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = config(&server, &dir);

    // A perfectly good local copy is still replaced when nothing can be verified
    std::fs::create_dir_all(&config.extract_dir).unwrap();
    std::fs::write(config.local_path(Dataset::Drivers), body(Dataset::Drivers)).unwrap();

    mount_manifest(&server, ResponseTemplate::new(500), 1).await;
    for dataset in Dataset::ALL {
        mount_dataset(&server, dataset, 1).await;
    }

    let acquirer = Acquirer::new(config.clone()).unwrap();
    let report = acquirer.acquire_all(false).await.unwrap();

    assert!(matches!(report.verification, VerificationStatus::Unavailable { .. }));
    assert_eq!(report.outcomes.len(), 4);
    for (dataset, outcome) in &report.outcomes {
        assert!(
            matches!(outcome, AcquireOutcome::Downloaded { .. }),
            "{dataset} was {outcome:?}"
        );
    }
    assert_eq!(
        report.get(Dataset::Drivers),
        Some(&AcquireOutcome::Downloaded {
            path: config.local_path(Dataset::Drivers),
            reason: DownloadReason::Unverified,
        })
    );
    assert!(report.is_complete());
}

#[tokio::test]
async fn test_manifest_failure_overrides_trust_local() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = ExtractConfig {
        missing_checksum_policy: MissingChecksumPolicy::TrustLocal,
        ..config(&server, &dir)
    };
    std::fs::create_dir_all(&config.extract_dir).unwrap();
    std::fs::write(config.local_path(Dataset::Races), body(Dataset::Races)).unwrap();

    mount_manifest(&server, ResponseTemplate::new(404), 1).await;
    for dataset in Dataset::ALL {
        mount_dataset(&server, dataset, 1).await;
    }

    let report = Acquirer::new(config).unwrap().acquire_all(false).await.unwrap();
    assert!(report.outcomes.iter().all(|(_, o)| matches!(o, AcquireOutcome::Downloaded { .. })));
}

#[tokio::test]
async fn test_unparsable_manifest_downloads_everything() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = config(&server, &dir);

    std::fs::create_dir_all(&config.extract_dir).unwrap();
    std::fs::write(config.local_path(Dataset::Constructors), body(Dataset::Constructors)).unwrap();

    let garbage = format!(
        "arquivo,md5\nconstructors.csv,{}\n<html>maintenance</html>\n",
        compute_md5(body(Dataset::Constructors).as_bytes())
    );
    mount_manifest(&server, ResponseTemplate::new(200).set_body_string(garbage), 1).await;
    for dataset in Dataset::ALL {
        mount_dataset(&server, dataset, 1).await;
    }

    let report = Acquirer::new(config).unwrap().acquire_all(false).await.unwrap();

    match &report.verification {
        VerificationStatus::Unavailable { reason } => assert!(reason.contains("line 3"), "{reason}"),
        other => panic!("expected unavailable verification, got {other:?}"),
    }
    assert!(report.outcomes.iter().all(|(_, o)| matches!(o, AcquireOutcome::Downloaded { .. })));
    assert!(matches!(
        report.get(Dataset::Constructors),
        Some(AcquireOutcome::Downloaded {
            reason: DownloadReason::Unverified,
            ..
        })
    ));
}

#[tokio::test]
async fn test_odd_digest_only_affects_its_own_file() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = config(&server, &dir);

    std::fs::create_dir_all(&config.extract_dir).unwrap();
    let drivers_path = config.local_path(Dataset::Drivers);
    std::fs::write(&drivers_path, body(Dataset::Drivers)).unwrap();
    std::fs::write(config.local_path(Dataset::Results), body(Dataset::Results)).unwrap();

    let manifest = format!(
        "arquivo,md5\ndrivers.csv,{}\nresults.csv,abc123\n",
        compute_md5(body(Dataset::Drivers).as_bytes())
    );
    mount_manifest(&server, ResponseTemplate::new(200).set_body_string(manifest), 1).await;
    mount_dataset(&server, Dataset::Constructors, 1).await;
    mount_dataset(&server, Dataset::Drivers, 0).await;
    mount_dataset(&server, Dataset::Races, 1).await;
    mount_dataset(&server, Dataset::Results, 1).await;

    let report = Acquirer::new(config).unwrap().acquire_all(false).await.unwrap();

    assert_eq!(report.verification, VerificationStatus::Available { entries: 2 });
    assert_eq!(
        report.get(Dataset::Drivers),
        Some(&AcquireOutcome::Skipped { path: drivers_path })
    );
    assert!(matches!(
        report.get(Dataset::Results),
        Some(AcquireOutcome::Downloaded {
            reason: DownloadReason::Mismatch,
            ..
        })
    ));
    assert!(report.is_complete());
}

#[tokio::test]
async fn test_matching_local_file_is_skipped() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = config(&server, &dir);

    std::fs::create_dir_all(&config.extract_dir).unwrap();
    let drivers_path = config.local_path(Dataset::Drivers);
    std::fs::write(&drivers_path, body(Dataset::Drivers)).unwrap();

    mount_manifest(&server, ResponseTemplate::new(200).set_body_string(checksum_manifest()), 1).await;
    mount_dataset(&server, Dataset::Constructors, 1).await;
    mount_dataset(&server, Dataset::Drivers, 0).await;
    mount_dataset(&server, Dataset::Races, 1).await;
    mount_dataset(&server, Dataset::Results, 1).await;

    let report = Acquirer::new(config).unwrap().acquire_all(false).await.unwrap();

    assert_eq!(report.verification, VerificationStatus::Available { entries: 4 });
    assert_eq!(
        report.get(Dataset::Drivers),
        Some(&AcquireOutcome::Skipped { path: drivers_path })
    );
    assert_eq!(
        report.get(Dataset::Races).and_then(|o| o.path()).map(|p| p.is_file()),
        Some(true)
    );

    let order: Vec<_> = report.outcomes.iter().map(|(d, _)| *d).collect();
    assert_eq!(order, Dataset::ALL);
}

#[tokio::test]
async fn test_stale_local_file_is_replaced() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = config(&server, &dir);

    std::fs::create_dir_all(&config.extract_dir).unwrap();
    let results_path = config.local_path(Dataset::Results);
    std::fs::write(&results_path, "resultId\n").unwrap();

    mount_manifest(&server, ResponseTemplate::new(200).set_body_string(checksum_manifest()), 1).await;
    for dataset in Dataset::ALL {
        mount_dataset(&server, dataset, 1).await;
    }

    let report = Acquirer::new(config).unwrap().acquire_all(false).await.unwrap();

    assert!(matches!(
        report.get(Dataset::Results),
        Some(AcquireOutcome::Downloaded {
            reason: DownloadReason::Mismatch,
            ..
        })
    ));
    assert_eq!(std::fs::read_to_string(results_path).unwrap(), body(Dataset::Results));
}

#[tokio::test]
async fn test_one_failure_does_not_stop_the_batch() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = config(&server, &dir);

    mount_manifest(&server, ResponseTemplate::new(200).set_body_string(checksum_manifest()), 1).await;
    mount_dataset(&server, Dataset::Constructors, 1).await;
    mount_dataset(&server, Dataset::Drivers, 1).await;
    Mock::given(method("GET"))
        .and(path("/races.csv"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;
    mount_dataset(&server, Dataset::Results, 1).await;

    let report = Acquirer::new(config).unwrap().acquire_all(false).await.unwrap();

    assert!(matches!(
        report.get(Dataset::Races),
        Some(AcquireOutcome::Failed {
            error: FetchError::HttpStatus { status: 503, .. }
        })
    ));
    assert!(matches!(report.get(Dataset::Results), Some(AcquireOutcome::Downloaded { .. })));
    assert_eq!(report.unavailable(), vec![Dataset::Races]);
}

#[tokio::test]
async fn test_force_skips_verification() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = config(&server, &dir);

    std::fs::create_dir_all(&config.extract_dir).unwrap();
    std::fs::write(config.local_path(Dataset::Drivers), body(Dataset::Drivers)).unwrap();

    mount_manifest(&server, ResponseTemplate::new(200).set_body_string(checksum_manifest()), 0).await;
    for dataset in Dataset::ALL {
        mount_dataset(&server, dataset, 1).await;
    }

    let report = Acquirer::new(config).unwrap().acquire_all(true).await.unwrap();

    assert_eq!(report.verification, VerificationStatus::Forced);
    assert!(report.outcomes.iter().all(|(_, o)| matches!(
        o,
        AcquireOutcome::Downloaded {
            reason: DownloadReason::Forced,
            ..
        }
    )));
}

#[tokio::test]
async fn test_unusable_extract_dir_is_an_error() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "file").unwrap();

    let config = ExtractConfig {
        extract_dir: blocker.join("extraction"),
        ..config(&server, &dir)
    };

    let result = Acquirer::new(config).unwrap().acquire_all(false).await;
    assert!(matches!(result, Err(f1_etl_ingest::PipelineError::ExtractDir { .. })));
}
