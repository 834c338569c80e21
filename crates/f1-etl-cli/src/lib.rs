//! F1 ETL CLI Library
//!
//! Command-line front end for the Formula 1 ETL pipeline.
//!
//! # Overview
//!
//! - **Extraction**: download and verify the CSV datasets (`f1-etl extract`)
//! - **Full run**: extract, transform and load into the database (`f1-etl run`)
//! - **Schema bootstrap**: create the destination tables (`f1-etl init-db`)
//! - **Exploration**: inspect raw and transformed datasets (`f1-etl explore`)
//!
//! Settings come from the environment (and a `.env` file), see [`config`].

pub mod commands;
pub mod config;
pub mod error;
pub mod profile;
pub mod progress;
pub mod summary;

// Re-export commonly used types
pub use config::Config;
pub use error::{CliError, Result};

use clap::{Parser, Subcommand, ValueEnum};
use f1_etl_ingest::config::TruncatePolicy;
use std::path::PathBuf;

/// F1 ETL - load Formula 1 datasets into a relational database
#[derive(Parser, Debug)]
#[command(name = "f1-etl")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory for downloaded datasets (overrides F1_EXTRACT_DIR)
    #[arg(long, global = true)]
    pub extract_dir: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download the datasets, skipping files that match the checksum manifest
    Extract {
        /// Download every dataset without checking local copies
        #[arg(short, long)]
        force: bool,

        /// Keep local files that have no published checksum
        #[arg(long)]
        trust_local: bool,
    },

    /// Run the full extract, transform and load pipeline
    Run {
        /// Download every dataset without checking local copies
        #[arg(short, long)]
        force: bool,

        /// Create the destination tables before loading
        #[arg(long)]
        init_db: bool,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,

        /// Keep local files that have no published checksum
        #[arg(long)]
        trust_local: bool,

        /// Fail the results dataset on missing or non-numeric points instead of using 0
        #[arg(long)]
        strict_points: bool,

        /// What to do when a table cannot be cleared
        #[arg(long, value_enum, default_value_t = TruncatePolicyArg::BestEffort)]
        truncate_policy: TruncatePolicyArg,
    },

    /// Interactively explore raw and transformed datasets
    Explore,

    /// Create the destination tables if they do not exist
    InitDb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TruncatePolicyArg {
    /// Report the failure and keep going
    BestEffort,
    /// Stop before loading anything
    Abort,
}

impl From<TruncatePolicyArg> for TruncatePolicy {
    fn from(arg: TruncatePolicyArg) -> Self {
        match arg {
            TruncatePolicyArg::BestEffort => TruncatePolicy::BestEffort,
            TruncatePolicyArg::Abort => TruncatePolicy::Abort,
        }
    }
}
