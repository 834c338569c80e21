//! Pipeline orchestration
//!
//! A run moves through `Extracting -> Transforming -> Loading -> Done`.
//! Missing inputs after extraction, an unreachable database or an aborted
//! truncate phase end the run in `Aborted` instead. Every run produces a
//! [`PipelineReport`], whether or not it finished.

use crate::config::{EnvironmentInfo, PipelineConfig};
use crate::dataset::Dataset;
use crate::error::{PipelineError, SchemaError};
use crate::extract::{AcquireReport, Acquirer};
use crate::load::{Engine, LoadReport, Loader, TruncateOutcome};
use crate::transform::{read_dataset, transform, NormalizedDataset};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Extracting,
    Transforming,
    Loading,
    Done,
    Aborted,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Extracting => "extracting",
            Stage::Transforming => "transforming",
            Stage::Loading => "loading",
            Stage::Done => "done",
            Stage::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransformOutcome {
    Transformed { rows: usize },
    Failed { error: SchemaError },
}

/// Summary of one pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    /// Final state: `Done` or `Aborted`
    pub stage: Stage,
    pub abort_reason: Option<String>,
    pub acquisition: Option<AcquireReport>,
    pub transforms: Vec<(Dataset, TransformOutcome)>,
    pub load: Option<LoadReport>,
    pub elapsed_ms: u64,
    pub environment: EnvironmentInfo,
    #[serde(skip)]
    started: Option<Instant>,
}

impl PipelineReport {
    fn start(environment: &EnvironmentInfo) -> Self {
        Self {
            stage: Stage::Extracting,
            abort_reason: None,
            acquisition: None,
            transforms: Vec::new(),
            load: None,
            elapsed_ms: 0,
            environment: environment.clone(),
            started: Some(Instant::now()),
        }
    }

    fn enter(&mut self, stage: Stage) {
        info!(stage = %stage, "Pipeline stage");
        self.stage = stage;
    }

    fn abort(mut self, reason: PipelineError) -> Self {
        error!(stage = %self.stage, error = %reason, "Pipeline aborted");
        self.stage = Stage::Aborted;
        self.abort_reason = Some(reason.to_string());
        self.finish()
    }

    fn finish(mut self) -> Self {
        if self.stage != Stage::Aborted {
            self.stage = Stage::Done;
        }
        self.elapsed_ms = self
            .started
            .map(|s| s.elapsed().as_millis() as u64)
            .unwrap_or_default();
        info!(stage = %self.stage, elapsed_ms = self.elapsed_ms, "Pipeline finished");
        self
    }

    pub fn is_done(&self) -> bool {
        self.stage == Stage::Done
    }

    pub fn transform_outcome(&self, dataset: Dataset) -> Option<&TransformOutcome> {
        self.transforms
            .iter()
            .find(|(d, _)| *d == dataset)
            .map(|(_, outcome)| outcome)
    }
}

pub struct Pipeline {
    config: PipelineConfig,
    acquirer: Acquirer,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        config
            .validate()
            .map_err(|e| PipelineError::Config(e.to_string()))?;
        let acquirer = Acquirer::new(config.extract.clone())?;
        Ok(Self { config, acquirer })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run only the extraction stage
    pub async fn extract(&self, force: bool) -> Result<AcquireReport, PipelineError> {
        info!(extract_dir = %self.config.extract.extract_dir.display(), force, "Extracting datasets");
        self.acquirer.acquire_all(force).await
    }

    /// Read and normalize every acquired dataset
    ///
    /// A dataset that cannot be read or transformed is reported and left out
    /// of the returned map.
    pub fn transform_all(
        &self,
        acquisition: &AcquireReport,
    ) -> (BTreeMap<Dataset, NormalizedDataset>, Vec<(Dataset, TransformOutcome)>) {
        let mut datasets = BTreeMap::new();
        let mut outcomes = Vec::with_capacity(Dataset::ALL.len());

        for dataset in Dataset::ALL {
            let path = acquisition
                .get(dataset)
                .and_then(|o| o.path())
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| self.config.extract.local_path(dataset));

            let result = read_dataset(dataset, &path)
                .and_then(|raw| transform(&raw, &self.config.transform));

            match result {
                Ok(normalized) => {
                    let rows = normalized.len();
                    info!(dataset = %dataset, rows, "Dataset transformed");
                    outcomes.push((dataset, TransformOutcome::Transformed { rows }));
                    datasets.insert(dataset, normalized);
                },
                Err(error) => {
                    warn!(dataset = %dataset, error = %error, "Dataset transform failed, it will not be loaded");
                    outcomes.push((dataset, TransformOutcome::Failed { error }));
                },
            }
        }

        (datasets, outcomes)
    }

    /// Full run against the configured database
    pub async fn run(&self, force: bool) -> PipelineReport {
        let (report, datasets) = match self.extract_and_transform(force).await {
            Ok(staged) => staged,
            Err(report) => return report,
        };

        let engine = match Engine::connect(&self.config.database).await {
            Ok(engine) => engine,
            Err(e) => return report.abort(e.into()),
        };

        let report = self.load(report, &engine, &datasets).await;
        engine.close().await;
        report
    }

    /// Full run against an already connected engine
    pub async fn run_with_engine(&self, engine: &Engine, force: bool) -> PipelineReport {
        match self.extract_and_transform(force).await {
            Ok((report, datasets)) => self.load(report, engine, &datasets).await,
            Err(report) => report,
        }
    }

    async fn extract_and_transform(
        &self,
        force: bool,
    ) -> Result<(PipelineReport, BTreeMap<Dataset, NormalizedDataset>), PipelineReport> {
        let mut report = PipelineReport::start(&self.config.environment);
        report.enter(Stage::Extracting);

        let acquisition = match self.extract(force).await {
            Ok(acquisition) => acquisition,
            Err(e) => return Err(report.abort(e)),
        };

        let unavailable = acquisition.unavailable();
        report.acquisition = Some(acquisition);
        if !unavailable.is_empty() {
            return Err(report.abort(PipelineError::MissingDatasets(unavailable)));
        }

        report.enter(Stage::Transforming);
        let (datasets, outcomes) = match report.acquisition.as_ref() {
            Some(acquisition) => self.transform_all(acquisition),
            None => (BTreeMap::new(), Vec::new()),
        };
        report.transforms = outcomes;

        Ok((report, datasets))
    }

    async fn load(
        &self,
        mut report: PipelineReport,
        engine: &Engine,
        datasets: &BTreeMap<Dataset, NormalizedDataset>,
    ) -> PipelineReport {
        report.enter(Stage::Loading);

        if self.config.load.create_schema {
            if let Err(e) = engine.create_schema().await {
                return report.abort(e.into());
            }
        }

        let load = Loader::new(engine, &self.config.load)
            .reset_and_load(&Dataset::ALL, datasets)
            .await;

        let truncate_abort = load
            .aborted
            .then(|| {
                load.tables
                    .iter()
                    .rev()
                    .find(|t| matches!(t.truncate, TruncateOutcome::Failed { .. }))
                    .map(|t| t.table)
            })
            .flatten();
        report.load = Some(load);

        match truncate_abort {
            Some(table) => report.abort(PipelineError::TruncateAborted(table)),
            None => report.finish(),
        }
    }
}
