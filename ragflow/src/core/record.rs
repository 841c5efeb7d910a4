//! Per-step execution records kept on the run state.

use super::StepKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a recorded step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepRecordStatus {
    /// The step finished.
    Completed,
    /// The step refused to run or left the context failed.
    Failed,
    /// The step returned an error.
    Errored,
}

impl fmt::Display for StepRecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
            Self::Errored => write!(f, "errored"),
        }
    }
}

/// One executed step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    /// Step name.
    pub name: String,
    /// Step kind.
    pub kind: StepKind,
    /// How the step ended.
    pub status: StepRecordStatus,
    /// When the step started.
    pub started_at: DateTime<Utc>,
    /// When the step ended.
    pub ended_at: DateTime<Utc>,
    /// Failure or error message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepRecord {
    /// Creates a completed step record ending now.
    #[must_use]
    pub fn completed(name: impl Into<String>, kind: StepKind, started_at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            kind,
            status: StepRecordStatus::Completed,
            started_at,
            ended_at: Utc::now(),
            error: None,
        }
    }

    /// Creates a failed step record ending now.
    #[must_use]
    pub fn failed(
        name: impl Into<String>,
        kind: StepKind,
        started_at: DateTime<Utc>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            status: StepRecordStatus::Failed,
            started_at,
            ended_at: Utc::now(),
            error: Some(error.into()),
        }
    }

    /// Creates a record for a step that returned an error.
    #[must_use]
    pub fn errored(
        name: impl Into<String>,
        kind: StepKind,
        started_at: DateTime<Utc>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            status: StepRecordStatus::Errored,
            ..Self::failed(name, kind, started_at, error)
        }
    }

    /// Returns the duration in milliseconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration_ms(&self) -> f64 {
        (self.ended_at - self.started_at).num_milliseconds() as f64
    }

    /// Returns true if the step completed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.status, StepRecordStatus::Completed)
    }
}
