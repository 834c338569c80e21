//! F1 ETL Ingest Library
//!
//! Extract, transform and load the Formula 1 reference datasets
//! (constructors, drivers, races, results) into a relational database.
//!
//! # Stages
//!
//! - **extract**: download each CSV unless a local copy already matches the
//!   published MD5 checksum manifest
//! - **transform**: validate each file against a declared schema and coerce
//!   rows into typed records
//! - **load**: clear the destination tables in dependency order and bulk
//!   insert the new rows
//! - **pipeline**: sequence the three stages and report per-dataset and
//!   per-table outcomes
//!
//! # Example
//!
//! ```no_run
//! use f1_etl_ingest::config::PipelineConfig;
//! use f1_etl_ingest::pipeline::Pipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pipeline = Pipeline::new(PipelineConfig::default())?;
//!     let report = pipeline.run(false).await;
//!     println!("finished in stage {}", report.stage);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod extract;
pub mod load;
pub mod pipeline;
pub mod transform;

// Re-export commonly used types
pub use dataset::Dataset;
pub use error::{DatabaseError, FetchError, PipelineError, SchemaError};
