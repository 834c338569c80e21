//! Human-readable and JSON rendering of run results

use crate::error::Result;
use crate::progress::{format_bytes, format_elapsed};
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use f1_etl_ingest::extract::{AcquireOutcome, AcquireReport, DownloadReason, VerificationStatus};
use f1_etl_ingest::load::{LoadOutcome, LoadReport, TruncateOutcome};
use f1_etl_ingest::pipeline::{PipelineReport, Stage, TransformOutcome};
use f1_etl_ingest::Dataset;
use serde::Serialize;
use std::path::Path;

/// Print any serializable value as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_acquisition(report: &AcquireReport) {
    match &report.verification {
        VerificationStatus::Forced => {
            println!("{} Checksum verification skipped (--force)", "→".cyan());
        },
        VerificationStatus::Available { entries } => {
            println!("{} Checksum manifest loaded ({} entries)", "✓".green(), entries);
        },
        VerificationStatus::Unavailable { reason } => {
            println!(
                "{} Checksum manifest unavailable, downloading everything: {}",
                "!".yellow(),
                reason
            );
        },
    }

    for (dataset, outcome) in &report.outcomes {
        match outcome {
            AcquireOutcome::Skipped { path } => {
                println!("{} {} (verified, {})", "✓".green(), dataset.file_name(), file_size(path));
            },
            AcquireOutcome::Downloaded { path, reason } => {
                println!(
                    "{} {} ({}, {})",
                    "↓".cyan(),
                    dataset.file_name(),
                    download_reason(*reason),
                    file_size(path)
                );
            },
            AcquireOutcome::Failed { error } => {
                println!("{} {}: {}", "✗".red(), dataset.file_name(), error);
            },
        }
    }
}

pub fn print_report(report: &PipelineReport) {
    if let Some(acquisition) = &report.acquisition {
        println!();
        println!("{}", "Extraction".bold());
        print_acquisition(acquisition);
    }

    if !report.transforms.is_empty() {
        println!();
        println!("{}", "Transformation".bold());
        println!("{}", transform_table(&report.transforms));
    }

    if let Some(load) = &report.load {
        println!();
        println!("{}", "Load".bold());
        println!("{}", load_table(load));
    }

    println!();
    match report.stage {
        Stage::Done => {
            let rows = report.load.as_ref().map(LoadReport::rows_loaded).unwrap_or(0);
            let line = format!(
                "Pipeline finished: {} rows loaded in {}",
                rows,
                format_elapsed(report.elapsed_ms)
            );
            if report.load.as_ref().is_some_and(LoadReport::has_failures) || has_transform_failures(report) {
                println!("{} {} (with failures, see above)", "!".yellow(), line);
            } else {
                println!("{} {}", "✓".green(), line);
            }
        },
        _ => {
            println!(
                "{} Pipeline aborted: {}",
                "✗".red(),
                report.abort_reason.as_deref().unwrap_or("unknown reason")
            );
        },
    }
}

fn has_transform_failures(report: &PipelineReport) -> bool {
    report
        .transforms
        .iter()
        .any(|(_, outcome)| matches!(outcome, TransformOutcome::Failed { .. }))
}

pub fn transform_table(transforms: &[(Dataset, TransformOutcome)]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["Dataset", "Status", "Rows", "Detail"]);

    for (dataset, outcome) in transforms {
        match outcome {
            TransformOutcome::Transformed { rows } => {
                table.add_row(vec![dataset.name().to_string(), "ok".to_string(), rows.to_string(), String::new()]);
            },
            TransformOutcome::Failed { error } => {
                table.add_row(vec![dataset.name().to_string(), "failed".to_string(), "-".to_string(), error.to_string()]);
            },
        }
    }
    table
}

pub fn load_table(load: &LoadReport) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["Table", "Truncate", "Load", "Rows"]);

    for entry in &load.tables {
        let truncate = match &entry.truncate {
            TruncateOutcome::Cleared => "cleared".to_string(),
            TruncateOutcome::Failed { error } => format!("failed: {}", error),
            TruncateOutcome::NotAttempted => "not attempted".to_string(),
        };
        let (status, rows) = match &entry.load {
            LoadOutcome::Loaded { rows } => ("loaded".to_string(), rows.to_string()),
            LoadOutcome::Empty => ("empty".to_string(), "0".to_string()),
            LoadOutcome::Absent => ("no data".to_string(), "-".to_string()),
            LoadOutcome::Failed { error } => (format!("failed: {}", error), "-".to_string()),
            LoadOutcome::Skipped => ("skipped".to_string(), "-".to_string()),
        };
        table.add_row(vec![entry.table.table_name().to_string(), truncate, status, rows]);
    }
    table
}

fn file_size(path: &Path) -> String {
    std::fs::metadata(path)
        .map(|m| format_bytes(m.len()))
        .unwrap_or_else(|_| "missing".to_string())
}

fn download_reason(reason: DownloadReason) -> &'static str {
    match reason {
        DownloadReason::Missing => "new",
        DownloadReason::Mismatch => "checksum mismatch",
        DownloadReason::Unverified => "unverified",
        DownloadReason::Forced => "forced",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use f1_etl_ingest::load::TableReport;
    use f1_etl_ingest::{DatabaseError, SchemaError};

    #[test]
    fn test_transform_table_lists_failures() {
        let transforms = vec![
            (Dataset::Constructors, TransformOutcome::Transformed { rows: 211 }),
            (
                Dataset::Races,
                TransformOutcome::Failed {
                    error: SchemaError::MissingColumns {
                        dataset: Dataset::Races,
                        columns: vec!["year".to_string()],
                    },
                },
            ),
        ];

        let rendered = transform_table(&transforms).to_string();
        assert!(rendered.contains("constructors"));
        assert!(rendered.contains("211"));
        assert!(rendered.contains("failed"));
        assert!(rendered.contains("year"));
    }

    #[test]
    fn test_load_table_shows_each_outcome() {
        let load = LoadReport {
            tables: vec![
                TableReport {
                    table: Dataset::Constructors,
                    truncate: TruncateOutcome::Cleared,
                    load: LoadOutcome::Loaded { rows: 12 },
                },
                TableReport {
                    table: Dataset::Results,
                    truncate: TruncateOutcome::Cleared,
                    load: LoadOutcome::Failed {
                        error: DatabaseError::statement("insert into results", "FOREIGN KEY constraint failed"),
                    },
                },
            ],
            aborted: false,
        };

        let rendered = load_table(&load).to_string();
        assert!(rendered.contains("loaded"));
        assert!(rendered.contains("12"));
        assert!(rendered.contains("FOREIGN KEY"));
    }

    #[test]
    fn test_download_reason_labels() {
        assert_eq!(download_reason(DownloadReason::Mismatch), "checksum mismatch");
        assert_eq!(download_reason(DownloadReason::Missing), "new");
    }
}
