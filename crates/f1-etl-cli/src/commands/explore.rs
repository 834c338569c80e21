//! `f1-etl explore` command implementation
//!
//! Makes sure the datasets are on disk, then lets the user pick a dataset in
//! raw or transformed form and prints its profile.

use super::pipeline_config;
use crate::config::Config;
use crate::error::Result;
use crate::profile::Profile;
use crate::{progress, summary};
use colored::Colorize;
use f1_etl_ingest::extract::AcquireReport;
use f1_etl_ingest::pipeline::Pipeline;
use f1_etl_ingest::transform::{read_dataset, transform};
use f1_etl_ingest::Dataset;
use inquire::Select;
use std::fmt;

/// One entry of the exploration menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Raw(Dataset),
    Transformed(Dataset),
    Exit,
}

impl Choice {
    /// Menu entries: raw and transformed for every dataset, then exit
    pub fn menu() -> Vec<Choice> {
        Dataset::ALL
            .iter()
            .flat_map(|&d| [Choice::Raw(d), Choice::Transformed(d)])
            .chain(std::iter::once(Choice::Exit))
            .collect()
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::Raw(d) => write!(f, "{} (raw)", d),
            Choice::Transformed(d) => write!(f, "{} (transformed)", d),
            Choice::Exit => f.write_str("Exit"),
        }
    }
}

pub async fn run(config: Config) -> Result<()> {
    let pipeline = Pipeline::new(pipeline_config(config, false, false))?;

    // Exploration continues with whatever could be downloaded
    println!("{} Checking local datasets...", "→".cyan());
    let acquisition = pipeline.extract(false).await?;
    summary::print_acquisition(&acquisition);

    loop {
        println!();
        let selection = Select::new("Select a dataset to explore:", Choice::menu())
            .with_page_size(15)
            .prompt();

        let choice = match selection {
            Ok(Choice::Exit) | Err(_) => break,
            Ok(choice) => choice,
        };

        match profile(&pipeline, &acquisition, choice) {
            Ok(profile) => profile.render(),
            Err(message) => println!("{} {}", "✗".red(), message),
        }
    }

    Ok(())
}

fn profile(
    pipeline: &Pipeline,
    acquisition: &AcquireReport,
    choice: Choice,
) -> std::result::Result<Profile, String> {
    let (dataset, transformed) = match choice {
        Choice::Raw(d) => (d, false),
        Choice::Transformed(d) => (d, true),
        Choice::Exit => return Err("nothing selected".to_string()),
    };

    let path = acquisition
        .get(dataset)
        .and_then(|o| o.path())
        .filter(|p| p.is_file())
        .ok_or_else(|| format!("{} is not available locally, run 'f1-etl extract'", dataset.file_name()))?;

    let spinner = progress::create_spinner(&format!("Reading {}...", dataset.file_name()));
    let raw = read_dataset(dataset, path);
    spinner.finish_and_clear();
    let raw = raw.map_err(|e| e.to_string())?;

    if !transformed {
        return Ok(Profile::of_raw(&raw));
    }

    transform(&raw, &pipeline.config().transform)
        .map(|normalized| Profile::of_normalized(&normalized))
        .map_err(|e| e.to_string())
}
