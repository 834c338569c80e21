//! F1 ETL CLI - Main entry point

use clap::Parser;
use f1_etl_cli::commands::run::RunOptions;
use f1_etl_cli::{Cli, Commands, Config};
use f1_etl_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    // Parse command-line arguments (usage errors exit with code 2)
    let cli = Cli::parse();

    // Verbose mode logs debug to console, otherwise warnings only
    let log_config = LogConfig::builder()
        .level(if cli.verbose { LogLevel::Debug } else { LogLevel::Warn })
        .output(LogOutput::Console)
        .log_file_prefix("f1-etl")
        .build();

    // Environment variables take precedence
    let log_config = log_config.clone().with_env_overrides().unwrap_or(log_config);

    // Keep the file writer guard alive until exit; the CLI works without logging
    let _guard = init_logging(&log_config).ok().flatten();

    let result = execute_command(cli).await;

    if let Err(e) = result {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Execute the CLI command
async fn execute_command(cli: Cli) -> f1_etl_cli::Result<()> {
    let config = Config::load()?.with_extract_dir(cli.extract_dir);

    match cli.command {
        Commands::Extract { force, trust_local } => {
            f1_etl_cli::commands::extract::run(config, force, trust_local).await
        },

        Commands::Run {
            force,
            init_db,
            json,
            trust_local,
            strict_points,
            truncate_policy,
        } => {
            let options = RunOptions {
                force,
                init_db,
                json,
                trust_local,
                strict_points,
                truncate_policy: truncate_policy.into(),
            };
            f1_etl_cli::commands::run::run(config, options).await
        },

        Commands::Explore => f1_etl_cli::commands::explore::run(config).await,

        Commands::InitDb => f1_etl_cli::commands::init_db::run(config).await,
    }
}
