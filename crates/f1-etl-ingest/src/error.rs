//! Error taxonomy for the ingest pipeline
//!
//! Fetch, schema and database errors are recorded per dataset or per table
//! and carried in the run report, so they are `Clone` + `Serialize` and hold
//! rendered messages rather than the underlying driver errors.
//! [`PipelineError`] covers what ends a run.

use crate::config::DatabaseBackend;
use crate::dataset::Dataset;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Why a single HTTP download failed
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FetchError {
    #[error("Timed out after {timeout_ms}ms fetching {url}")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("HTTP status {status} fetching {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Network error fetching {url}: {message}")]
    Network { url: String, message: String },

    #[error("Unexpected error fetching {url}: {message}")]
    Unexpected { url: String, message: String },
}

impl FetchError {
    /// Classify a reqwest error
    pub fn from_reqwest(url: &str, timeout: Duration, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            }
        } else if let Some(status) = err.status() {
            FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            }
        } else if err.is_connect() || err.is_request() || err.is_body() {
            FetchError::Network {
                url: url.to_string(),
                message: err.to_string(),
            }
        } else {
            FetchError::unexpected(url, err)
        }
    }

    pub fn unexpected(url: &str, err: impl std::fmt::Display) -> Self {
        FetchError::Unexpected {
            url: url.to_string(),
            message: err.to_string(),
        }
    }

    pub fn url(&self) -> &str {
        match self {
            FetchError::Timeout { url, .. }
            | FetchError::HttpStatus { url, .. }
            | FetchError::Network { url, .. }
            | FetchError::Unexpected { url, .. } => url,
        }
    }
}

/// Why a dataset could not be turned into normalized records
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchemaError {
    #[error("Dataset '{dataset}' is missing required columns: {}", columns.join(", "))]
    MissingColumns { dataset: Dataset, columns: Vec<String> },

    #[error("Dataset '{dataset}' row {row}: column '{column}' has value '{value}', expected {expected}")]
    TypeCoercion {
        dataset: Dataset,
        row: usize,
        column: String,
        value: String,
        expected: &'static str,
    },

    #[error("Failed to read dataset '{dataset}' from {path}: {message}")]
    Read {
        dataset: Dataset,
        path: String,
        message: String,
    },
}

impl SchemaError {
    pub fn dataset(&self) -> Dataset {
        match self {
            SchemaError::MissingColumns { dataset, .. }
            | SchemaError::TypeCoercion { dataset, .. }
            | SchemaError::Read { dataset, .. } => *dataset,
        }
    }
}

/// Database failures, split by whether a connection was ever established
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DatabaseError {
    #[error("Failed to connect to {backend} database: {message}")]
    Connection {
        backend: DatabaseBackend,
        message: String,
    },

    #[error("Statement failed ({operation}): {message}")]
    Statement { operation: String, message: String },
}

impl DatabaseError {
    pub fn connection(backend: DatabaseBackend, err: impl std::fmt::Display) -> Self {
        DatabaseError::Connection {
            backend,
            message: err.to_string(),
        }
    }

    pub fn statement(operation: impl Into<String>, err: impl std::fmt::Display) -> Self {
        DatabaseError::Statement {
            operation: operation.into(),
            message: err.to_string(),
        }
    }
}

/// Failures that end a pipeline run
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Required datasets are unavailable: {}", join_datasets(.0))]
    MissingDatasets(Vec<Dataset>),

    #[error("Extraction directory '{path}' is unusable: {source}")]
    ExtractDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Truncation of '{0}' failed and the truncate policy is abort")]
    TruncateAborted(Dataset),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn join_datasets(datasets: &[Dataset]) -> String {
    datasets
        .iter()
        .map(|d| d.name())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_message_lists_columns() {
        let err = SchemaError::MissingColumns {
            dataset: Dataset::Races,
            columns: vec!["year".to_string(), "date".to_string()],
        };
        assert_eq!(err.to_string(), "Dataset 'races' is missing required columns: year, date");
        assert_eq!(err.dataset(), Dataset::Races);
    }

    #[test]
    fn test_missing_datasets_message() {
        let err = PipelineError::MissingDatasets(vec![Dataset::Drivers, Dataset::Results]);
        assert_eq!(err.to_string(), "Required datasets are unavailable: drivers, results");
    }

    #[test]
    fn test_fetch_error_serializes_with_kind_tag() {
        let err = FetchError::HttpStatus {
            url: "http://example.com/drivers.csv".to_string(),
            status: 404,
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "http_status");
        assert_eq!(json["status"], 404);
        assert_eq!(err.url(), "http://example.com/drivers.csv");
    }
}
