//! `f1-etl run` command implementation

use super::pipeline_config;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::summary;
use colored::Colorize;
use f1_etl_ingest::config::TruncatePolicy;
use f1_etl_ingest::pipeline::Pipeline;

/// Flags of the `run` subcommand
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub force: bool,
    pub init_db: bool,
    pub json: bool,
    pub trust_local: bool,
    pub strict_points: bool,
    pub truncate_policy: TruncatePolicy,
}

/// Run the full pipeline; an aborted run is reported and returned as an error
pub async fn run(config: Config, options: RunOptions) -> Result<()> {
    let mut pipeline_config = pipeline_config(config, options.trust_local, options.json);
    pipeline_config.transform.strict_points = options.strict_points;
    pipeline_config.load.truncate_policy = options.truncate_policy;
    pipeline_config.load.create_schema = options.init_db;

    let pipeline = Pipeline::new(pipeline_config)?;

    if !options.json {
        println!(
            "{} Loading Formula 1 datasets into {} ({})",
            "→".cyan(),
            pipeline.config().database.backend,
            pipeline.config().database.target.display_name()
        );
    }

    let report = pipeline.run(options.force).await;

    if options.json {
        summary::print_json(&report)?;
    } else {
        summary::print_report(&report);
    }

    if report.is_done() {
        Ok(())
    } else {
        Err(CliError::Aborted(
            report
                .abort_reason
                .unwrap_or_else(|| "no reason recorded".to_string()),
        ))
    }
}
