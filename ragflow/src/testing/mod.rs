//! Testing utilities for ragflow pipelines.
//!
//! This module provides:
//! - Mock steps that count, record or fail
//! - Deterministic embedding and LLM collaborators
//! - Assertions over context status and history

mod assertions;
mod collaborators;
mod mocks;

pub use assertions::{assert_completed, assert_failed, assert_failed_with, assert_history};
pub use collaborators::{HashEmbeddingModel, StaticLlm};
pub use mocks::{FailingStep, MockStep, RecordingStep};
