//! Core domain model types for ragflow.
//!
//! This module contains the fundamental types used throughout the framework:
//! - Pipeline status and step kind enums
//! - Step outcomes reported to the executor
//! - Per-step execution records

mod output;
mod record;
mod status;

pub use output::StepOutcome;
pub use record::{StepRecord, StepRecordStatus};
pub use status::{PipelineStatus, StepKind};
