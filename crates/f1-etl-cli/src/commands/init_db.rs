//! `f1-etl init-db` command implementation

use crate::config::Config;
use crate::error::Result;
use crate::progress;
use colored::Colorize;
use f1_etl_ingest::load::Engine;
use f1_etl_ingest::Dataset;

/// Create the four destination tables if they do not exist
pub async fn run(config: Config) -> Result<()> {
    let database = &config.pipeline.database;
    let spinner = progress::create_spinner(&format!("Connecting to {}...", database.backend));

    let engine = match Engine::connect(database).await {
        Ok(engine) => engine,
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e.into());
        },
    };

    spinner.set_message("Creating tables...");
    let created = engine.create_schema().await;
    engine.close().await;
    spinner.finish_and_clear();
    created?;

    for dataset in Dataset::ALL {
        println!("{} Table {} ready", "✓".green(), dataset.table_name().cyan());
    }
    Ok(())
}
