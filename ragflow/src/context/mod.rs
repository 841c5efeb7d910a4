//! Pipeline contexts.
//!
//! This module provides:
//! - [`RunState`]: status, error and step history of a run
//! - [`PipelineContext`]: the trait the executor drives
//! - [`IngestionContext`] and [`QueryContext`]: the two typed contexts

mod ingestion;
mod query;
mod state;

#[cfg(test)]
mod context_tests;

pub use ingestion::IngestionContext;
pub use query::{Citation, QueryContext};
pub use state::{PipelineContext, RunState};
