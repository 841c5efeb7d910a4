//! Error types for the ragflow framework.
//!
//! Errors fall into four groups:
//! - [`ConfigurationError`]: bad parameters, raised at construction or load time
//! - [`BackendError`]: a collaborator (embedding model, LLM, vector store) failed
//! - [`StepError`]: anything a step propagates to the executor
//! - [`PipelineValidationError`]: a pipeline that cannot be built
//!
//! Unmet step preconditions are not errors; they are reported through
//! [`crate::core::StepOutcome::Fail`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for ragflow operations.
#[derive(Debug, Error)]
pub enum RagflowError {
    /// Invalid configuration.
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),

    /// A pipeline validation error occurred.
    #[error("{0}")]
    Validation(#[from] PipelineValidationError),

    /// A step propagated an error.
    #[error("{0}")]
    Step(#[from] StepError),

    /// A collaborator failed outside of a pipeline run.
    #[error("{0}")]
    Backend(#[from] BackendError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for RagflowError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Invalid or unreadable configuration.
///
/// Always raised before any document is processed; parameters are never
/// silently clamped.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// `chunk_size` must be positive.
    #[error("chunk_size must be greater than 0, got {chunk_size}")]
    InvalidChunkSize {
        /// The rejected value.
        chunk_size: usize,
    },

    /// `chunk_overlap` must be smaller than `chunk_size`.
    #[error("chunk_overlap ({chunk_overlap}) must be less than chunk_size ({chunk_size})")]
    InvalidOverlap {
        /// The rejected overlap.
        chunk_overlap: usize,
        /// The configured chunk size.
        chunk_size: usize,
    },

    /// `max_tokens` must be positive.
    #[error("max_tokens must be greater than 0, got {max_tokens}")]
    InvalidMaxTokens {
        /// The rejected value.
        max_tokens: usize,
    },

    /// The chunking method is not one of the supported names.
    #[error("Unknown chunking method '{method}'. Expected one of: {expected}")]
    UnknownMethod {
        /// The rejected method name.
        method: String,
        /// Comma-separated list of accepted names.
        expected: String,
    },

    /// A required parameter was not provided.
    #[error("Missing required parameter '{0}'")]
    MissingParameter(String),

    /// Any other out-of-range value.
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue {
        /// The configuration field.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A configuration file exists but cannot be read.
    #[error("Failed to read '{path}': {source}")]
    ReadFile {
        /// The file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A configuration file could not be parsed.
    #[error("Failed to parse '{path}': {message}")]
    Parse {
        /// The file path.
        path: PathBuf,
        /// The parser message.
        message: String,
    },
}

impl ConfigurationError {
    /// Creates an invalid-value error.
    #[must_use]
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// A collaborator call failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{backend} error: {message}")]
pub struct BackendError {
    /// Which collaborator failed (e.g. "embedding", "llm", "vector_store").
    pub backend: String,
    /// The error message.
    pub message: String,
    /// Whether the collaborator considers the failure transient.
    pub retryable: bool,
}

impl BackendError {
    /// Creates a new backend error.
    #[must_use]
    pub fn new(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            message: message.into(),
            retryable: false,
        }
    }

    /// Creates an embedding backend error.
    #[must_use]
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::new("embedding", message)
    }

    /// Creates an LLM backend error.
    #[must_use]
    pub fn llm(message: impl Into<String>) -> Self {
        Self::new("llm", message)
    }

    /// Creates a vector store backend error.
    #[must_use]
    pub fn vector_store(message: impl Into<String>) -> Self {
        Self::new("vector_store", message)
    }

    /// Marks the error as retryable.
    #[must_use]
    pub fn retryable(mut self) -> Self {
        self.retryable = true;
        self
    }
}

/// An error propagated by a step.
///
/// The executor records the display string on the context and then returns
/// the same error to the caller.
#[derive(Debug, Error)]
pub enum StepError {
    /// A collaborator failed.
    #[error("{0}")]
    Backend(#[from] BackendError),

    /// The LLM failed to produce an answer.
    #[error("LLM generation failed: {}", .0.message)]
    Generation(#[source] BackendError),

    /// Invalid configuration discovered while running.
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),

    /// Local filesystem failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other error, typically from a user-defined step.
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl StepError {
    /// Creates a step error from a plain message.
    #[must_use]
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Other(anyhow::anyhow!(message.into()))
    }
}

/// Metadata about a validation error for better diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ErrorInfo {
    /// Error code (e.g., "PIPELINE-EMPTY").
    pub code: String,
    /// Short summary of the error.
    pub summary: String,
    /// Hint for fixing the error.
    pub fix_hint: Option<String>,
    /// Additional context key-value pairs.
    #[serde(default)]
    pub context: HashMap<String, String>,
}

impl ErrorInfo {
    /// Creates a new error info.
    #[must_use]
    pub fn new(code: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            summary: summary.into(),
            fix_hint: None,
            context: HashMap::new(),
        }
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }

    /// Adds a single context entry.
    #[must_use]
    pub fn with_context_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

/// Error raised when a pipeline cannot be built.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct PipelineValidationError {
    /// The error message.
    pub message: String,
    /// The steps involved in the error.
    pub steps: Vec<String>,
    /// Optional diagnostic info.
    pub error_info: Option<ErrorInfo>,
}

impl PipelineValidationError {
    /// Creates a new pipeline validation error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            steps: Vec::new(),
            error_info: None,
        }
    }

    /// Sets the steps involved.
    #[must_use]
    pub fn with_steps(mut self, steps: Vec<String>) -> Self {
        self.steps = steps;
        self
    }

    /// Sets the diagnostic info.
    #[must_use]
    pub fn with_error_info(mut self, info: ErrorInfo) -> Self {
        self.error_info = Some(info);
        self
    }
}

/// A specialized Result type for ragflow operations.
pub type Result<T> = std::result::Result<T, RagflowError>;
