//! Pipeline building and execution.
//!
//! This module provides:
//! - [`Step`]: the unit of work, with [`FnStep`] for closures
//! - [`PipelineExecutor`]: sequential, fail-fast execution with events
//! - [`PipelineBuilder`]: validated assembly of executors

mod builder;
mod executor;
mod step;


pub use builder::PipelineBuilder;
pub use executor::PipelineExecutor;
pub use step::{FnStep, Step};
