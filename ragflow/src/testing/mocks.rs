//! Mock steps for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

use crate::context::PipelineContext;
use crate::core::{StepKind, StepOutcome};
use crate::errors::StepError;
use crate::pipeline::Step;

/// A step that counts calls and returns a configurable outcome.
#[derive(Debug)]
pub struct MockStep {
    name: String,
    kind: StepKind,
    outcome: Mutex<StepOutcome>,
    call_count: Mutex<usize>,
}

impl MockStep {
    /// Creates a mock step that continues.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: StepKind::Custom,
            outcome: Mutex::new(StepOutcome::Continue),
            call_count: Mutex::new(0),
        }
    }

    /// Sets the reported kind.
    #[must_use]
    pub fn with_kind(mut self, kind: StepKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the outcome to return.
    pub fn set_outcome(&self, outcome: StepOutcome) {
        *self.outcome.lock() = outcome;
    }

    /// Returns the number of times the step ran.
    #[must_use]
    pub fn call_count(&self) -> usize {
        *self.call_count.lock()
    }
}

#[async_trait]
impl<C: PipelineContext> Step<C> for MockStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> StepKind {
        self.kind
    }

    async fn run(&self, _ctx: &mut C) -> Result<StepOutcome, StepError> {
        *self.call_count.lock() += 1;
        Ok(self.outcome.lock().clone())
    }
}

/// A step whose operation always errors.
#[derive(Debug, Clone)]
pub struct FailingStep {
    name: String,
    error: String,
}

impl FailingStep {
    /// Creates a step that returns `error`.
    #[must_use]
    pub fn new(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            error: error.into(),
        }
    }
}

#[async_trait]
impl<C: PipelineContext> Step<C> for FailingStep {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, _ctx: &mut C) -> Result<StepOutcome, StepError> {
        Err(StepError::msg(self.error.clone()))
    }
}

/// A step that appends its name to a shared log when it runs.
#[derive(Debug, Clone)]
pub struct RecordingStep {
    name: String,
    log: Arc<Mutex<Vec<String>>>,
}

impl RecordingStep {
    /// Creates a step writing to `log`.
    #[must_use]
    pub fn new(name: impl Into<String>, log: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            name: name.into(),
            log,
        }
    }

    /// Creates a fresh shared log.
    #[must_use]
    pub fn log() -> Arc<Mutex<Vec<String>>> {
        Arc::new(Mutex::new(Vec::new()))
    }
}

#[async_trait]
impl<C: PipelineContext> Step<C> for RecordingStep {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, _ctx: &mut C) -> Result<StepOutcome, StepError> {
        self.log.lock().push(self.name.clone());
        Ok(StepOutcome::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RunState;

    #[tokio::test]
    async fn test_mock_step_counts_and_returns_outcome() {
        let step = MockStep::new("mock");
        let mut state = RunState::new();

        assert!(Step::<RunState>::run(&step, &mut state).await.unwrap().is_success());
        step.set_outcome(StepOutcome::fail("stop"));
        let outcome = Step::<RunState>::run(&step, &mut state).await.unwrap();

        assert_eq!(outcome.message(), Some("stop"));
        assert_eq!(step.call_count(), 2);
    }

    #[tokio::test]
    async fn test_failing_step_errors() {
        let step = FailingStep::new("bad", "x");
        let err = Step::<RunState>::run(&step, &mut RunState::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "x");
    }

    #[tokio::test]
    async fn test_recording_step_logs_name() {
        let log = RecordingStep::log();
        let step = RecordingStep::new("first", Arc::clone(&log));
        Step::<RunState>::run(&step, &mut RunState::new()).await.unwrap();
        assert_eq!(*log.lock(), vec!["first".to_string()]);
    }
}
