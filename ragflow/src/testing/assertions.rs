//! Test assertions for pipeline contexts.

use crate::context::PipelineContext;
use crate::core::PipelineStatus;

/// Asserts that the run completed without error.
pub fn assert_completed<C: PipelineContext>(ctx: &C) {
    assert_eq!(
        ctx.status(),
        PipelineStatus::Completed,
        "Expected a completed run, got {:?} (error: {:?})",
        ctx.status(),
        ctx.error()
    );
    assert!(ctx.error().is_none(), "Completed run carries an error: {:?}", ctx.error());
}

/// Asserts that the run failed.
pub fn assert_failed<C: PipelineContext>(ctx: &C) {
    assert_eq!(
        ctx.status(),
        PipelineStatus::Failed,
        "Expected a failed run, got {:?}",
        ctx.status()
    );
    assert!(
        ctx.error().is_some_and(|e| !e.is_empty()),
        "Failed run has no error message"
    );
}

/// Asserts that the run failed with exactly `message`.
pub fn assert_failed_with<C: PipelineContext>(ctx: &C, message: &str) {
    assert_failed(ctx);
    assert_eq!(ctx.error(), Some(message), "Unexpected failure message");
}

/// Asserts the names of the steps recorded in the run history, in order.
pub fn assert_history<C: PipelineContext>(ctx: &C, expected: &[&str]) {
    let names: Vec<&str> = ctx
        .state()
        .history()
        .iter()
        .map(|r| r.name.as_str())
        .collect();
    assert_eq!(names, expected, "Unexpected step history");
}
