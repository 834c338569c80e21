//! Error types for the F1 ETL CLI
//!
//! Messages are user-facing and say what to check next.

use f1_etl_ingest::{DatabaseError, PipelineError};
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    /// Environment settings are missing or invalid
    #[error("Configuration error: {0}. Check your environment variables or .env file.")]
    Config(String),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Database error: {0}. Check DB_TYPE, DB_HOST, DB_PORT, DB_NAME and credentials.")]
    Database(#[from] DatabaseError),

    /// The run ended in the aborted state
    #[error("Pipeline aborted: {0}")]
    Aborted(String),

    /// Some datasets could not be downloaded
    #[error("Extraction incomplete, unavailable datasets: {}. Check your network connection and F1_SOURCE_BASE_URL, then retry.", .0.join(", "))]
    Incomplete(Vec<String>),

    #[error("Interactive prompt failed: {0}")]
    Prompt(#[from] inquire::InquireError),

    #[error("File operation failed: {0}. Check file permissions and disk space.")]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
