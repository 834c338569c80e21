//! CLI command implementations
//!
//! Each subcommand has its own module with a `run` function.

pub mod explore;
pub mod extract;
pub mod init_db;
pub mod run;

use crate::config::Config;
use crate::progress;
use f1_etl_ingest::config::{MissingChecksumPolicy, PipelineConfig};

/// Pipeline settings shared by every command that downloads datasets
pub(crate) fn pipeline_config(config: Config, trust_local: bool, quiet: bool) -> PipelineConfig {
    let mut pipeline = config.pipeline;
    pipeline.extract.show_progress = !quiet && progress::is_interactive();
    if trust_local {
        pipeline.extract.missing_checksum_policy = MissingChecksumPolicy::TrustLocal;
    }
    pipeline
}
