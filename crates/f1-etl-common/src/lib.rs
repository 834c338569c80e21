//! F1 ETL Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared utilities for the F1 ETL workspace.
//!
//! # Overview
//!
//! - **Checksums**: MD5 digests used to decide whether a local dataset is stale
//! - **Logging**: one place to configure the `tracing` subscriber for every binary
//! - **Errors**: the small error type shared by the helpers above
//!
//! # Example
//!
//! ```no_run
//! use f1_etl_common::checksum::compute_file_md5;
//!
//! fn main() -> f1_etl_common::Result<()> {
//!     let digest = compute_file_md5("extraction/drivers.csv")?;
//!     println!("drivers.csv md5: {}", digest);
//!     Ok(())
//! }
//! ```

pub mod checksum;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{CommonError, Result};
