//! Loading normalized datasets into the destination database

pub mod ddl;
pub mod engine;
pub mod loader;

pub use engine::Engine;
pub use loader::{LoadOutcome, LoadReport, Loader, TableReport, TruncateOutcome};
