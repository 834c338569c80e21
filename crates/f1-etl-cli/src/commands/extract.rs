//! `f1-etl extract` command implementation
//!
//! Downloads the datasets, reusing local files that match the checksum manifest.

use super::pipeline_config;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::summary;
use colored::Colorize;
use f1_etl_ingest::pipeline::Pipeline;

pub async fn run(config: Config, force: bool, trust_local: bool) -> Result<()> {
    let pipeline = Pipeline::new(pipeline_config(config, trust_local, false))?;

    println!(
        "{} Extracting datasets into {}",
        "→".cyan(),
        pipeline.config().extract.extract_dir.display()
    );

    let report = pipeline.extract(force).await?;
    summary::print_acquisition(&report);

    let unavailable = report.unavailable();
    if !unavailable.is_empty() {
        return Err(CliError::Incomplete(
            unavailable.iter().map(|d| d.name().to_string()).collect(),
        ));
    }

    println!("{} All {} datasets available", "✓".green(), report.outcomes.len());
    Ok(())
}
