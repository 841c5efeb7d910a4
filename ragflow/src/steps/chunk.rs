//! Chunk step.

use crate::chunking::Chunker;
use crate::context::IngestionContext;
use crate::core::{StepKind, StepOutcome};
use crate::errors::StepError;
use crate::pipeline::Step;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Splits the loaded markdown into chunks and stamps the document's access
/// markings and extra metadata onto each one.
///
/// Chunks already built by the loader are used as they are and only
/// stamped.
#[derive(Debug, Clone)]
pub struct ChunkStep {
    chunker: Arc<dyn Chunker>,
}

impl ChunkStep {
    /// Creates a chunk step.
    #[must_use]
    pub fn new(chunker: Arc<dyn Chunker>) -> Self {
        Self { chunker }
    }
}

#[async_trait]
impl Step<IngestionContext> for ChunkStep {
    fn name(&self) -> &str {
        "chunk"
    }

    fn kind(&self) -> StepKind {
        StepKind::Chunk
    }

    async fn run(&self, ctx: &mut IngestionContext) -> Result<StepOutcome, StepError> {
        let Some(markdown_path) = ctx.markdown_path.as_deref() else {
            return Ok(StepOutcome::fail(
                "Markdown path not set. Load step must run first.",
            ));
        };

        let mut chunks = if let Some(chunks) = ctx.loaded_chunks.take() {
            info!(path = %markdown_path.display(), "Using chunks built by the loader");
            chunks
        } else {
            info!(path = %markdown_path.display(), chunker = self.chunker.name(), "Chunking markdown file");
            self.chunker.chunk_markdown_file(markdown_path).await?
        };

        for chunk in &mut chunks {
            let metadata = &mut chunk.metadata;
            metadata
                .access_tags
                .extend(ctx.access.access_tags.iter().cloned());
            if let Some(role) = &ctx.access.required_role_strict {
                metadata.required_role_strict = Some(role.clone());
            }
            for (key, value) in &ctx.metadata {
                metadata.extra.insert(key.clone(), value.clone());
            }
        }

        info!(chunks = chunks.len(), "Created chunks");
        ctx.chunks = chunks;
        Ok(StepOutcome::Continue)
    }
}
