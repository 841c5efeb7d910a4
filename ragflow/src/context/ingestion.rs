//! State of one document ingestion.

use super::{PipelineContext, RunState};
use crate::access::DocumentAccess;
use crate::chunking::Chunk;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Context threaded through Load, Chunk, EmbeddingGeneration and Save.
#[derive(Debug, Clone, Default)]
pub struct IngestionContext {
    state: RunState,
    /// The file being ingested.
    pub file_path: PathBuf,
    /// Text produced by the load step.
    pub raw_text: Option<String>,
    /// Markdown file written by the load step.
    pub markdown_path: Option<PathBuf>,
    /// Chunks built by the loader, consumed by the chunk step.
    pub loaded_chunks: Option<Vec<Chunk>>,
    /// Chunks produced by the chunk step.
    pub chunks: Vec<Chunk>,
    /// One embedding per chunk.
    pub vectors: Vec<Vec<f32>>,
    /// Extra metadata copied onto every chunk.
    pub metadata: BTreeMap<String, serde_json::Value>,
    /// Access markings stamped onto every chunk.
    pub access: DocumentAccess,
    /// Ids written by the save step.
    pub stored_ids: Vec<String>,
}

impl IngestionContext {
    /// Creates a context for a file.
    #[must_use]
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            ..Self::default()
        }
    }

    /// Sets the access markings.
    #[must_use]
    pub fn with_access(mut self, access: DocumentAccess) -> Self {
        self.access = access;
        self
    }

    /// Adds an extra metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

impl From<PathBuf> for IngestionContext {
    fn from(file_path: PathBuf) -> Self {
        Self::new(file_path)
    }
}

impl From<&Path> for IngestionContext {
    fn from(file_path: &Path) -> Self {
        Self::new(file_path)
    }
}

impl PipelineContext for IngestionContext {
    fn state(&self) -> &RunState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut RunState {
        &mut self.state
    }
}
