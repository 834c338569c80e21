//! Environment-derived configuration
//!
//! The only place that reads the process environment. Everything below it
//! receives explicit config structs.
//!
//! | Variable | Default |
//! |---|---|
//! | `DATABASE_URL` | unset; overrides the `DB_*` parts |
//! | `DB_TYPE` | `postgresql` (`mysql`, `sqlite`) |
//! | `DB_HOST` / `DB_PORT` | `localhost` / backend default port |
//! | `DB_NAME` | `formula1_db` (file path for SQLite) |
//! | `DB_USER` / `DB_PASSWORD` | unset |
//! | `DB_MAX_CONNECTIONS` / `DB_CONNECT_TIMEOUT` | `5` / `10` |
//! | `F1_EXTRACT_DIR` | `./extraction` |
//! | `F1_SOURCE_BASE_URL` | upstream repository |
//! | `F1_DATASET_TIMEOUT` / `F1_MANIFEST_TIMEOUT` | `30` / `10` |
//! | `RUNTIME_VERSION`, `DB_PRODUCT_NAME`, `DB_PRODUCT_VERSION` | `unspecified` |

use crate::error::{CliError, Result};
use f1_etl_ingest::config::{
    DatabaseBackend, DatabaseConfig, DatabaseTarget, EnvironmentInfo, ExtractConfig,
    PipelineConfig, DEFAULT_DATASET_TIMEOUT_SECS, DEFAULT_DB_CONNECT_TIMEOUT_SECS, DEFAULT_DB_HOST,
    DEFAULT_DB_MAX_CONNECTIONS, DEFAULT_DB_NAME, DEFAULT_EXTRACT_DIR, DEFAULT_MANIFEST_TIMEOUT_SECS,
    DEFAULT_SOURCE_BASE_URL, UNSPECIFIED,
};
use std::path::PathBuf;
use std::str::FromStr;

/// Resolved settings for one CLI invocation
#[derive(Debug, Clone)]
pub struct Config {
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Load configuration from the environment and `.env`
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any variable source
    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        let extract = ExtractConfig {
            extract_dir: PathBuf::from(var("F1_EXTRACT_DIR").unwrap_or_else(|| DEFAULT_EXTRACT_DIR.to_string())),
            source_base_url: var("F1_SOURCE_BASE_URL").unwrap_or_else(|| DEFAULT_SOURCE_BASE_URL.to_string()),
            dataset_timeout_secs: parse_number("F1_DATASET_TIMEOUT", var("F1_DATASET_TIMEOUT"))?
                .unwrap_or(DEFAULT_DATASET_TIMEOUT_SECS),
            manifest_timeout_secs: parse_number("F1_MANIFEST_TIMEOUT", var("F1_MANIFEST_TIMEOUT"))?
                .unwrap_or(DEFAULT_MANIFEST_TIMEOUT_SECS),
            ..ExtractConfig::default()
        };

        let url = var("DATABASE_URL");
        let backend = match var("DB_TYPE") {
            Some(db_type) => db_type.parse::<DatabaseBackend>().map_err(CliError::config)?,
            None => url
                .as_deref()
                .and_then(backend_from_url)
                .unwrap_or_default(),
        };

        let target = match url {
            Some(url) => DatabaseTarget::Url(url),
            None => DatabaseTarget::Parts {
                host: var("DB_HOST").unwrap_or_else(|| DEFAULT_DB_HOST.to_string()),
                port: parse_number("DB_PORT", var("DB_PORT"))?.unwrap_or_else(|| backend.default_port()),
                name: var("DB_NAME").unwrap_or_else(|| DEFAULT_DB_NAME.to_string()),
                user: var("DB_USER"),
                password: var("DB_PASSWORD"),
            },
        };

        let database = DatabaseConfig {
            backend,
            target,
            max_connections: parse_number("DB_MAX_CONNECTIONS", var("DB_MAX_CONNECTIONS"))?
                .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS),
            connect_timeout_secs: parse_number("DB_CONNECT_TIMEOUT", var("DB_CONNECT_TIMEOUT"))?
                .unwrap_or(DEFAULT_DB_CONNECT_TIMEOUT_SECS),
        };

        let environment = EnvironmentInfo {
            runtime_version: var("RUNTIME_VERSION").unwrap_or_else(|| UNSPECIFIED.to_string()),
            db_product_name: var("DB_PRODUCT_NAME").unwrap_or_else(|| UNSPECIFIED.to_string()),
            db_product_version: var("DB_PRODUCT_VERSION").unwrap_or_else(|| UNSPECIFIED.to_string()),
        };

        let pipeline = PipelineConfig {
            extract,
            database,
            environment,
            ..PipelineConfig::default()
        };

        let config = Config { pipeline };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.pipeline
            .validate()
            .map_err(|e| CliError::config(e.to_string()))
    }

    /// Apply the global `--extract-dir` flag
    pub fn with_extract_dir(mut self, dir: Option<PathBuf>) -> Self {
        if let Some(dir) = dir {
            self.pipeline.extract.extract_dir = dir;
        }
        self
    }
}

/// Parse an optional numeric variable; a value that does not parse is a config error
fn parse_number<T: FromStr>(key: &str, value: Option<String>) -> Result<Option<T>> {
    value
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|_| CliError::config(format!("{} '{}' is not a valid number", key, raw)))
        })
        .transpose()
}

fn backend_from_url(url: &str) -> Option<DatabaseBackend> {
    let scheme = url.split(':').next()?;
    scheme.parse().ok()
}
