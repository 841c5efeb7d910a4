//! Pipeline lifecycle events.
//!
//! The executor reports every run through an [`EventSink`] handed to it at
//! construction. Event names are fixed:
//!
//! | Event | Data |
//! |-------|------|
//! | `pipeline.started` | `run_id`, `pipeline`, `steps` |
//! | `step.started` | `run_id`, `step`, `kind` |
//! | `step.completed` | `run_id`, `step`, `kind`, `duration_ms` |
//! | `step.failed` | `run_id`, `step`, `kind`, `duration_ms`, `error`, `propagated` |
//! | `pipeline.completed` | `run_id`, `pipeline`, `duration_ms` |
//! | `pipeline.failed` | `run_id`, `pipeline`, `duration_ms`, `error` |

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};

/// A pipeline run started.
pub const PIPELINE_STARTED: &str = "pipeline.started";
/// A step is about to run.
pub const STEP_STARTED: &str = "step.started";
/// A step finished without failing the run.
pub const STEP_COMPLETED: &str = "step.completed";
/// A step failed the run, by outcome or by error.
pub const STEP_FAILED: &str = "step.failed";
/// A run finished with every step completed.
pub const PIPELINE_COMPLETED: &str = "pipeline.completed";
/// A run finished failed.
pub const PIPELINE_FAILED: &str = "pipeline.failed";
