//! Component configuration
//!
//! Every component receives its settings through one of these structs. Nothing
//! in this crate reads the environment; the CLI assembles a
//! [`PipelineConfig`] once at startup.

use crate::dataset::Dataset;
use crate::extract::manifest::DatasetManifest;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// Extraction Constants
// ============================================================================

/// Upstream repository hosting the datasets and the checksum manifest.
pub const DEFAULT_SOURCE_BASE_URL: &str = "https://github.com/CaioSobreira/dti_arquivos/raw/main";

/// File name of the checksum manifest under the source base URL.
pub const CHECKSUM_MANIFEST_FILE: &str = "arquivos_hash_md5sum.csv";

/// Default local directory for downloaded datasets.
pub const DEFAULT_EXTRACT_DIR: &str = "./extraction";

/// Default timeout for one dataset download in seconds.
pub const DEFAULT_DATASET_TIMEOUT_SECS: u64 = 30;

/// Default timeout for the checksum manifest request in seconds.
pub const DEFAULT_MANIFEST_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// Database Constants
// ============================================================================

pub const DEFAULT_DB_HOST: &str = "localhost";

pub const DEFAULT_DB_PORT: u16 = 5432;

pub const DEFAULT_DB_NAME: &str = "formula1_db";

pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

pub const DEFAULT_DB_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Rows per multi-row INSERT statement.
pub const DEFAULT_INSERT_CHUNK_SIZE: usize = 500;

/// Placeholder for informational fields that were not provided.
pub const UNSPECIFIED: &str = "unspecified";

// ============================================================================
// Extraction
// ============================================================================

/// What to do with an existing local file when the checksum manifest has no
/// digest for it (or could not be fetched at all)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingChecksumPolicy {
    /// Treat the file as stale and download it again
    #[default]
    Redownload,
    /// Keep whatever is on disk
    TrustLocal,
}

impl std::str::FromStr for MissingChecksumPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "redownload" => Ok(MissingChecksumPolicy::Redownload),
            "trust-local" | "trust_local" => Ok(MissingChecksumPolicy::TrustLocal),
            _ => Err(format!("Invalid missing checksum policy: {}", s)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExtractConfig {
    pub extract_dir: PathBuf,
    /// Base URL under which `<name>.csv` and the checksum manifest live
    pub source_base_url: String,
    pub dataset_timeout_secs: u64,
    pub manifest_timeout_secs: u64,
    pub missing_checksum_policy: MissingChecksumPolicy,
    /// Draw a terminal progress bar per download
    pub show_progress: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            extract_dir: PathBuf::from(DEFAULT_EXTRACT_DIR),
            source_base_url: DEFAULT_SOURCE_BASE_URL.to_string(),
            dataset_timeout_secs: DEFAULT_DATASET_TIMEOUT_SECS,
            manifest_timeout_secs: DEFAULT_MANIFEST_TIMEOUT_SECS,
            missing_checksum_policy: MissingChecksumPolicy::default(),
            show_progress: false,
        }
    }
}

impl ExtractConfig {
    fn base_url(&self) -> &str {
        self.source_base_url.trim_end_matches('/')
    }

    /// The fixed dataset manifest rooted at `source_base_url`
    pub fn manifest(&self) -> DatasetManifest {
        DatasetManifest::from_base_url(self.base_url())
    }

    pub fn checksum_manifest_url(&self) -> String {
        format!("{}/{}", self.base_url(), CHECKSUM_MANIFEST_FILE)
    }

    /// Local path of a dataset inside the extraction directory
    pub fn local_path(&self, dataset: Dataset) -> PathBuf {
        self.extract_dir.join(dataset.file_name())
    }

    pub fn dataset_timeout(&self) -> Duration {
        Duration::from_secs(self.dataset_timeout_secs)
    }

    pub fn manifest_timeout(&self) -> Duration {
        Duration::from_secs(self.manifest_timeout_secs)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.source_base_url.trim().is_empty() {
            anyhow::bail!("Source base URL cannot be empty");
        }

        if self.dataset_timeout_secs == 0 || self.manifest_timeout_secs == 0 {
            anyhow::bail!("Download timeouts must be greater than 0");
        }

        Ok(())
    }
}

// ============================================================================
// Database
// ============================================================================

/// Supported destination backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    #[default]
    Postgres,
    MySql,
    Sqlite,
}

impl DatabaseBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            DatabaseBackend::Postgres => "postgresql",
            DatabaseBackend::MySql => "mysql",
            DatabaseBackend::Sqlite => "sqlite",
        }
    }

    pub fn default_port(self) -> u16 {
        match self {
            DatabaseBackend::Postgres => DEFAULT_DB_PORT,
            DatabaseBackend::MySql => 3306,
            DatabaseBackend::Sqlite => 0,
        }
    }
}

impl std::fmt::Display for DatabaseBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DatabaseBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgresql" | "postgres" => Ok(DatabaseBackend::Postgres),
            "mysql" => Ok(DatabaseBackend::MySql),
            "sqlite" => Ok(DatabaseBackend::Sqlite),
            _ => Err(format!(
                "Unsupported database type '{}' (expected postgresql, mysql or sqlite)",
                s
            )),
        }
    }
}

/// Where to connect
#[derive(Clone)]
pub enum DatabaseTarget {
    /// A full connection URL, used as given
    Url(String),
    /// Individual connection parameters; for SQLite `name` is the file path
    Parts {
        host: String,
        port: u16,
        name: String,
        user: Option<String>,
        password: Option<String>,
    },
}

impl std::fmt::Debug for DatabaseTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseTarget::Url(_) => f.write_str("Url(<redacted>)"),
            DatabaseTarget::Parts {
                host,
                port,
                name,
                user,
                password,
            } => f
                .debug_struct("Parts")
                .field("host", host)
                .field("port", port)
                .field("name", name)
                .field("user", user)
                .field("password", &password.as_ref().map(|_| "<redacted>"))
                .finish(),
        }
    }
}

impl DatabaseTarget {
    /// Location without credentials, for log and console output
    pub fn display_name(&self) -> String {
        match self {
            DatabaseTarget::Url(url) => match (url.split_once("://"), url.rsplit_once('@')) {
                (Some((scheme, _)), Some((_, rest))) => format!("{}://{}", scheme, rest),
                _ => url.clone(),
            },
            DatabaseTarget::Parts { host, name, .. } if host.is_empty() => name.clone(),
            DatabaseTarget::Parts { host, port, name, .. } => format!("{}:{}/{}", host, port, name),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    pub target: DatabaseTarget,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: DatabaseBackend::Postgres,
            target: DatabaseTarget::Parts {
                host: DEFAULT_DB_HOST.to_string(),
                port: DEFAULT_DB_PORT,
                name: DEFAULT_DB_NAME.to_string(),
                user: None,
                password: None,
            },
            max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            connect_timeout_secs: DEFAULT_DB_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl DatabaseConfig {
    /// SQLite database at `path`, created if missing
    pub fn sqlite(path: impl Into<String>) -> Self {
        Self {
            backend: DatabaseBackend::Sqlite,
            target: DatabaseTarget::Parts {
                host: String::new(),
                port: 0,
                name: path.into(),
                user: None,
                password: None,
            },
            ..Self::default()
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_connections == 0 {
            anyhow::bail!("Database max_connections must be greater than 0");
        }

        match &self.target {
            DatabaseTarget::Url(url) if url.trim().is_empty() => {
                anyhow::bail!("Database URL cannot be empty");
            },
            DatabaseTarget::Parts { name, .. } if name.trim().is_empty() => {
                anyhow::bail!("Database name cannot be empty");
            },
            DatabaseTarget::Parts { host, .. }
                if self.backend != DatabaseBackend::Sqlite && host.trim().is_empty() =>
            {
                anyhow::bail!("Database host cannot be empty for {}", self.backend);
            },
            _ => {},
        }

        Ok(())
    }
}

// ============================================================================
// Transform & Load
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformOptions {
    /// Reject sentinel or non-numeric `points` instead of defaulting to 0
    pub strict_points: bool,
}

/// Reaction to a table that could not be cleared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TruncatePolicy {
    /// Log, keep clearing the remaining tables, then load
    #[default]
    BestEffort,
    /// Stop at the first failure and skip the load phase
    Abort,
}

#[derive(Debug, Clone)]
pub struct LoadConfig {
    pub truncate_policy: TruncatePolicy,
    pub chunk_size: usize,
    /// Issue `CREATE TABLE IF NOT EXISTS` before clearing the tables
    pub create_schema: bool,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            truncate_policy: TruncatePolicy::default(),
            chunk_size: DEFAULT_INSERT_CHUNK_SIZE,
            create_schema: false,
        }
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Informational runtime details echoed in the run report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentInfo {
    pub runtime_version: String,
    pub db_product_name: String,
    pub db_product_version: String,
}

impl Default for EnvironmentInfo {
    fn default() -> Self {
        Self {
            runtime_version: UNSPECIFIED.to_string(),
            db_product_name: UNSPECIFIED.to_string(),
            db_product_version: UNSPECIFIED.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub extract: ExtractConfig,
    pub database: DatabaseConfig,
    pub transform: TransformOptions,
    pub load: LoadConfig,
    pub environment: EnvironmentInfo,
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.extract.validate()?;
        self.database.validate()?;

        if self.load.chunk_size == 0 {
            anyhow::bail!("Insert chunk size must be greater than 0");
        }

        Ok(())
    }
}

/// Builder for [`PipelineConfig`]
#[derive(Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn extract_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.extract.extract_dir = dir.into();
        self
    }

    pub fn source_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.extract.source_base_url = url.into();
        self
    }

    pub fn dataset_timeout_secs(mut self, secs: u64) -> Self {
        self.config.extract.dataset_timeout_secs = secs;
        self
    }

    pub fn manifest_timeout_secs(mut self, secs: u64) -> Self {
        self.config.extract.manifest_timeout_secs = secs;
        self
    }

    pub fn missing_checksum_policy(mut self, policy: MissingChecksumPolicy) -> Self {
        self.config.extract.missing_checksum_policy = policy;
        self
    }

    pub fn show_progress(mut self, show: bool) -> Self {
        self.config.extract.show_progress = show;
        self
    }

    pub fn database(mut self, database: DatabaseConfig) -> Self {
        self.config.database = database;
        self
    }

    pub fn strict_points(mut self, strict: bool) -> Self {
        self.config.transform.strict_points = strict;
        self
    }

    pub fn truncate_policy(mut self, policy: TruncatePolicy) -> Self {
        self.config.load.truncate_policy = policy;
        self
    }

    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.load.chunk_size = size;
        self
    }

    pub fn create_schema(mut self, create: bool) -> Self {
        self.config.load.create_schema = create;
        self
    }

    pub fn environment(mut self, environment: EnvironmentInfo) -> Self {
        self.config.environment = environment;
        self
    }

    pub fn build(self) -> PipelineConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_urls() {
        let config = ExtractConfig::default();
        assert_eq!(
            config.checksum_manifest_url(),
            "https://github.com/CaioSobreira/dti_arquivos/raw/main/arquivos_hash_md5sum.csv"
        );
        assert_eq!(config.dataset_timeout(), Duration::from_secs(30));
        assert_eq!(config.manifest_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_trailing_slash_is_ignored() {
        let config = ExtractConfig {
            source_base_url: "http://mirror.local/f1/".to_string(),
            ..ExtractConfig::default()
        };
        assert_eq!(config.checksum_manifest_url(), "http://mirror.local/f1/arquivos_hash_md5sum.csv");
        assert_eq!(
            config.manifest().url(Dataset::Races),
            Some("http://mirror.local/f1/races.csv")
        );
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("postgresql".parse::<DatabaseBackend>().unwrap(), DatabaseBackend::Postgres);
        assert_eq!("Postgres".parse::<DatabaseBackend>().unwrap(), DatabaseBackend::Postgres);
        assert_eq!("mysql".parse::<DatabaseBackend>().unwrap(), DatabaseBackend::MySql);
        assert_eq!("sqlite".parse::<DatabaseBackend>().unwrap(), DatabaseBackend::Sqlite);
        assert!("oracle".parse::<DatabaseBackend>().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_chunk_size() {
        let config = PipelineConfig::builder().chunk_size(0).build();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_sqlite_path() {
        let config = DatabaseConfig::sqlite("");
        assert!(config.validate().is_err());
        assert!(DatabaseConfig::sqlite("f1.db").validate().is_ok());
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = DatabaseConfig {
            target: DatabaseTarget::Parts {
                host: "db".to_string(),
                port: 5432,
                name: "f1".to_string(),
                user: Some("etl".to_string()),
                password: Some("hunter2".to_string()),
            },
            ..DatabaseConfig::default()
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_display_name_hides_credentials() {
        let url = DatabaseTarget::Url("postgres://etl:hunter2@db:5432/f1".to_string());
        assert_eq!(url.display_name(), "postgres://db:5432/f1");

        let sqlite = DatabaseConfig::sqlite("/tmp/f1.db").target;
        assert_eq!(sqlite.display_name(), "/tmp/f1.db");

        assert_eq!(DatabaseConfig::default().target.display_name(), "localhost:5432/formula1_db");
    }
}
