//! Sequential pipeline executor.

use super::Step;
use crate::context::PipelineContext;
use crate::core::{StepOutcome, StepRecord};
use crate::errors::StepError;
use crate::events::{
    EventSink, NoOpEventSink, PIPELINE_COMPLETED, PIPELINE_FAILED, PIPELINE_STARTED,
    STEP_COMPLETED, STEP_FAILED, STEP_STARTED,
};
use chrono::Utc;
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, info_span, warn, Instrument};

/// Runs an ordered list of steps against one context.
///
/// Execution follows `Pending -> Running -> {Completed | Failed}`:
/// - the context is marked running on entry
/// - steps run one at a time, in order, while the context is not failed
/// - [`StepOutcome::Fail`] marks the context failed and stops the run
/// - an `Err` marks the context failed with the error's message and is
///   returned to the caller
/// - a context still running after the last step is marked completed
///
/// Failed steps are never retried.
pub struct PipelineExecutor<C: PipelineContext> {
    name: String,
    steps: Vec<Arc<dyn Step<C>>>,
    sink: Arc<dyn EventSink>,
}

impl<C: PipelineContext> fmt::Debug for PipelineExecutor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineExecutor")
            .field("name", &self.name)
            .field("steps", &self.step_names())
            .field("sink", &self.sink)
            .finish()
    }
}

impl<C: PipelineContext> Clone for PipelineExecutor<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            steps: self.steps.clone(),
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<C: PipelineContext> PipelineExecutor<C> {
    /// Creates an executor that discards events.
    #[must_use]
    pub fn new(name: impl Into<String>, steps: Vec<Arc<dyn Step<C>>>) -> Self {
        Self {
            name: name.into(),
            steps,
            sink: Arc::new(NoOpEventSink),
        }
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the step names in execution order.
    #[must_use]
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Returns the number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if there are no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Executes every step against `ctx`.
    ///
    /// Returns `Ok` for both completed runs and runs a step failed by
    /// outcome; inspect `ctx.status()` to tell them apart. A step error is
    /// recorded on the context and returned unchanged.
    pub async fn execute(&self, ctx: &mut C) -> Result<(), StepError> {
        let started = Instant::now();
        ctx.mark_running();
        let run_id = ctx.state().run_id();

        info!(pipeline = %self.name, run_id = %run_id, steps = self.steps.len(), "Pipeline started");
        self.sink
            .emit(
                PIPELINE_STARTED,
                Some(json!({
                    "run_id": run_id.to_string(),
                    "pipeline": self.name,
                    "steps": self.step_names(),
                })),
            )
            .await;

        for step in &self.steps {
            if ctx.is_failed() {
                break;
            }

            let name = step.name();
            let kind = step.kind();
            let span = info_span!("step", pipeline = %self.name, step = %name, kind = %kind, run_id = %run_id);

            self.sink
                .emit(
                    STEP_STARTED,
                    Some(json!({ "run_id": run_id.to_string(), "step": name, "kind": kind })),
                )
                .await;

            let started_at = Utc::now();
            let timer = Instant::now();
            let result = step.run(ctx).instrument(span.clone()).await;
            let duration_ms = elapsed_ms(timer);

            match result {
                Ok(StepOutcome::Continue) if !ctx.is_failed() => {
                    span.in_scope(|| debug!(duration_ms, "Step completed"));
                    ctx.state_mut()
                        .record(StepRecord::completed(name, kind, started_at));
                    self.sink
                        .emit(
                            STEP_COMPLETED,
                            Some(json!({
                                "run_id": run_id.to_string(),
                                "step": name,
                                "kind": kind,
                                "duration_ms": duration_ms,
                            })),
                        )
                        .await;
                }
                Ok(outcome) => {
                    if let StepOutcome::Fail(message) = outcome {
                        ctx.mark_failed(message);
                    }
                    let message = ctx.error().unwrap_or_default().to_string();
                    span.in_scope(|| warn!(error = %message, "Step failed"));
                    ctx.state_mut()
                        .record(StepRecord::failed(name, kind, started_at, message.clone()));
                    self.sink
                        .emit(
                            STEP_FAILED,
                            Some(json!({
                                "run_id": run_id.to_string(),
                                "step": name,
                                "kind": kind,
                                "duration_ms": duration_ms,
                                "error": message,
                                "propagated": false,
                            })),
                        )
                        .await;
                }
                Err(err) => {
                    let message = err.to_string();
                    ctx.state_mut().record_error(message.clone());
                    span.in_scope(|| error!(error = %message, "Step returned an error"));
                    ctx.state_mut()
                        .record(StepRecord::errored(name, kind, started_at, message.clone()));
                    self.sink
                        .emit(
                            STEP_FAILED,
                            Some(json!({
                                "run_id": run_id.to_string(),
                                "step": name,
                                "kind": kind,
                                "duration_ms": duration_ms,
                                "error": message,
                                "propagated": true,
                            })),
                        )
                        .await;
                    self.finish(ctx, started).await;
                    return Err(err);
                }
            }
        }

        ctx.mark_completed();
        self.finish(ctx, started).await;
        Ok(())
    }

    async fn finish(&self, ctx: &C, started: Instant) {
        let run_id = ctx.state().run_id().to_string();
        let duration_ms = elapsed_ms(started);

        if let Some(message) = ctx.error() {
            warn!(pipeline = %self.name, run_id = %run_id, error = %message, duration_ms, "Pipeline failed");
            self.sink
                .emit(
                    PIPELINE_FAILED,
                    Some(json!({
                        "run_id": run_id,
                        "pipeline": self.name,
                        "duration_ms": duration_ms,
                        "error": message,
                    })),
                )
                .await;
        } else {
            info!(pipeline = %self.name, run_id = %run_id, duration_ms, "Pipeline completed");
            self.sink
                .emit(
                    PIPELINE_COMPLETED,
                    Some(json!({
                        "run_id": run_id,
                        "pipeline": self.name,
                        "duration_ms": duration_ms,
                    })),
                )
                .await;
        }
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
