//! Pipeline status and step kind enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of work a pipeline step performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Converts a source file into markdown text.
    Load,
    /// Splits loaded text into bounded chunks.
    Chunk,
    /// Embeds every chunk of a document.
    EmbeddingGeneration,
    /// Writes embedded chunks into the vector store.
    Save,
    /// Embeds the user's query.
    QueryEmbedding,
    /// Runs the filtered similarity search.
    Retrieve,
    /// Builds the grounded prompt and calls the LLM.
    Generation,
    /// Any user-defined step.
    Custom,
}

impl Default for StepKind {
    fn default() -> Self {
        Self::Custom
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load => write!(f, "load"),
            Self::Chunk => write!(f, "chunk"),
            Self::EmbeddingGeneration => write!(f, "embedding_generation"),
            Self::Save => write!(f, "save"),
            Self::QueryEmbedding => write!(f, "query_embedding"),
            Self::Retrieve => write!(f, "retrieve"),
            Self::Generation => write!(f, "generation"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

impl StepKind {
    /// Returns true for the steps of the ingestion flow.
    #[must_use]
    pub fn is_ingestion(&self) -> bool {
        matches!(
            self,
            Self::Load | Self::Chunk | Self::EmbeddingGeneration | Self::Save
        )
    }

    /// Returns true for the steps of the query flow.
    #[must_use]
    pub fn is_query(&self) -> bool {
        matches!(self, Self::QueryEmbedding | Self::Retrieve | Self::Generation)
    }
}

/// The lifecycle status of one pipeline run.
///
/// Runs move `Pending -> Running -> {Completed | Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStatus {
    /// The run has not started.
    Pending,
    /// Steps are being executed.
    Running,
    /// Every step finished without failure.
    Completed,
    /// A step failed; no further steps run.
    Failed,
}

impl Default for PipelineStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl PipelineStatus {
    /// Returns true if the status represents a terminal state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Returns true if the run completed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Returns true if the run failed.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed)
    }
}
