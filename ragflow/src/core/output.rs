//! What a step reports back to the executor.

use serde::{Deserialize, Serialize};

/// The non-error result of running a step.
///
/// `Fail` is the record-and-continue signal: the step found an unmet
/// precondition, the executor records it on the context and stops the run
/// without raising. Errors that should reach the caller travel as
/// [`crate::errors::StepError`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "message", rename_all = "snake_case")]
pub enum StepOutcome {
    /// The step finished its work.
    Continue,
    /// The step refused to run; the message is recorded on the context.
    Fail(String),
}

impl Default for StepOutcome {
    fn default() -> Self {
        Self::Continue
    }
}

impl StepOutcome {
    /// Creates a failure outcome with a message.
    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self::Fail(message.into())
    }

    /// Returns true if the step finished its work.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Continue)
    }

    /// Returns true if the step refused to run.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Fail(_))
    }

    /// Returns the failure message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Continue => None,
            Self::Fail(message) => Some(message),
        }
    }
}
