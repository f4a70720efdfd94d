//! Search, download, resize, and store: one linear batch run.

pub mod cli;
pub mod config;
pub mod error;
pub mod harvest;

pub use config::HarvestConfig;
pub use error::PipelineError;
pub use harvest::{harvest, run, RunSummary};
