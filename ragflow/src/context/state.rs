//! Run state shared by every pipeline context.

use crate::core::{PipelineStatus, StepRecord};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Error text used when a failure is recorded without a message.
const UNKNOWN_ERROR: &str = "Unknown error";

/// Status, error and step history of one pipeline run.
///
/// `error` is `Some` exactly when `status` is [`PipelineStatus::Failed`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    run_id: Uuid,
    status: PipelineStatus,
    error: Option<String>,
    history: Vec<StepRecord>,
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

impl RunState {
    /// Creates a pending run state with a fresh run id.
    #[must_use]
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            status: PipelineStatus::Pending,
            error: None,
            history: Vec::new(),
        }
    }

    /// Returns the run id.
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Returns the current status.
    #[must_use]
    pub fn status(&self) -> PipelineStatus {
        self.status
    }

    /// Returns the failure message.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns the steps executed in the current run.
    #[must_use]
    pub fn history(&self) -> &[StepRecord] {
        &self.history
    }

    /// Starts a new execution: status becomes `Running`, error and history
    /// are cleared.
    pub fn mark_running(&mut self) {
        self.status = PipelineStatus::Running;
        self.error = None;
        self.history.clear();
    }

    /// Records a failure.
    ///
    /// The first failure of an execution wins; later calls are ignored.
    /// An empty message is replaced so the error is never blank.
    pub fn mark_failed(&mut self, message: impl Into<String>) {
        let message = message.into();
        if self.status == PipelineStatus::Failed {
            debug!(
                run_id = %self.run_id,
                ignored = %message,
                "Run already failed, keeping first error"
            );
            return;
        }

        self.record_error(message);
    }

    /// Records an error that aborts the run.
    ///
    /// Unlike [`mark_failed`](Self::mark_failed), this replaces any failure
    /// recorded earlier in the execution.
    pub fn record_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.status = PipelineStatus::Failed;
        self.error = Some(if message.trim().is_empty() {
            UNKNOWN_ERROR.to_string()
        } else {
            message
        });
    }

    /// Marks a running execution as completed. Any other status is kept.
    pub fn mark_completed(&mut self) {
        if self.status == PipelineStatus::Running {
            self.status = PipelineStatus::Completed;
        }
    }

    /// Appends a step record.
    pub fn record(&mut self, record: StepRecord) {
        self.history.push(record);
    }
}

/// Implemented by every context a pipeline can run against.
pub trait PipelineContext: Send {
    /// Returns the run state.
    fn state(&self) -> &RunState;

    /// Returns the run state mutably.
    fn state_mut(&mut self) -> &mut RunState;

    /// Returns the current status.
    fn status(&self) -> PipelineStatus {
        self.state().status()
    }

    /// Returns the failure message.
    fn error(&self) -> Option<&str> {
        self.state().error()
    }

    /// Returns true if the run failed.
    fn is_failed(&self) -> bool {
        self.status() == PipelineStatus::Failed
    }

    /// Starts a new execution.
    fn mark_running(&mut self) {
        self.state_mut().mark_running();
    }

    /// Records a failure; the first one wins.
    fn mark_failed(&mut self, message: impl Into<String>)
    where
        Self: Sized,
    {
        self.state_mut().mark_failed(message);
    }

    /// Completes a running execution.
    fn mark_completed(&mut self) {
        self.state_mut().mark_completed();
    }
}

impl PipelineContext for RunState {
    fn state(&self) -> &RunState {
        self
    }

    fn state_mut(&mut self) -> &mut RunState {
        self
    }
}
