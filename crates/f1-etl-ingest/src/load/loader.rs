//! Full-refresh load: clear every destination table, then repopulate it

use super::engine::Engine;
use crate::config::{LoadConfig, TruncatePolicy};
use crate::dataset::Dataset;
use crate::error::DatabaseError;
use crate::transform::NormalizedDataset;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TruncateOutcome {
    Cleared,
    Failed { error: DatabaseError },
    /// An earlier failure stopped the truncate phase
    NotAttempted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoadOutcome {
    Loaded { rows: u64 },
    /// Dataset transformed to zero records
    Empty,
    /// No normalized dataset was supplied; the table stays empty
    Absent,
    Failed { error: DatabaseError },
    /// The load phase did not run
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableReport {
    pub table: Dataset,
    pub truncate: TruncateOutcome,
    pub load: LoadOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// One entry per table, in load order
    pub tables: Vec<TableReport>,
    /// Set when the truncate policy stopped the run before loading
    pub aborted: bool,
}

impl LoadReport {
    pub fn table(&self, dataset: Dataset) -> Option<&TableReport> {
        self.tables.iter().find(|t| t.table == dataset)
    }

    pub fn rows_loaded(&self) -> u64 {
        self.tables
            .iter()
            .map(|t| match t.load {
                LoadOutcome::Loaded { rows } => rows,
                _ => 0,
            })
            .sum()
    }

    pub fn has_failures(&self) -> bool {
        self.tables.iter().any(|t| {
            matches!(t.truncate, TruncateOutcome::Failed { .. })
                || matches!(t.load, LoadOutcome::Failed { .. })
        })
    }
}

pub struct Loader<'a> {
    engine: &'a Engine,
    config: &'a LoadConfig,
}

impl<'a> Loader<'a> {
    pub fn new(engine: &'a Engine, config: &'a LoadConfig) -> Self {
        Self { engine, config }
    }

    /// Clear `tables` most-dependent first, then load them referent first
    ///
    /// `tables` is given in dependency (load) order. Every table gets its own
    /// transaction, so one failed table never undoes another.
    pub async fn reset_and_load(
        &self,
        tables: &[Dataset],
        datasets: &BTreeMap<Dataset, NormalizedDataset>,
    ) -> LoadReport {
        let mut truncated: BTreeMap<Dataset, TruncateOutcome> = BTreeMap::new();
        let mut aborted = false;

        for &table in tables.iter().rev() {
            if aborted {
                truncated.insert(table, TruncateOutcome::NotAttempted);
                continue;
            }

            let outcome = match self.engine.truncate(table).await {
                Ok(()) => {
                    info!(table = %table, "Table cleared");
                    TruncateOutcome::Cleared
                },
                Err(error) => {
                    warn!(table = %table, error = %error, "Failed to clear table");
                    if self.config.truncate_policy == TruncatePolicy::Abort {
                        error!(table = %table, "Truncate policy is abort, skipping load");
                        aborted = true;
                    }
                    TruncateOutcome::Failed { error }
                },
            };
            truncated.insert(table, outcome);
        }

        let mut reports = Vec::with_capacity(tables.len());
        for &table in tables {
            let truncate = truncated
                .remove(&table)
                .unwrap_or(TruncateOutcome::NotAttempted);
            let load = if aborted {
                LoadOutcome::Skipped
            } else {
                self.load_table(table, datasets.get(&table)).await
            };

            reports.push(TableReport {
                table,
                truncate,
                load,
            });
        }

        LoadReport {
            tables: reports,
            aborted,
        }
    }

    async fn load_table(&self, table: Dataset, dataset: Option<&NormalizedDataset>) -> LoadOutcome {
        let Some(dataset) = dataset else {
            warn!(table = %table, "No data for table, leaving it empty");
            return LoadOutcome::Absent;
        };

        if dataset.is_empty() {
            info!(table = %table, "Dataset is empty, nothing to insert");
            return LoadOutcome::Empty;
        }

        let rows = dataset.field_rows();
        match self
            .engine
            .insert_rows(table, &rows, self.config.chunk_size)
            .await
        {
            Ok(rows) => {
                info!(table = %table, rows, "Table loaded");
                LoadOutcome::Loaded { rows }
            },
            Err(error) => {
                warn!(table = %table, error = %error, "Table load failed, rolled back");
                LoadOutcome::Failed { error }
            },
        }
    }
}
