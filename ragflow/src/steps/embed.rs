//! Embedding generation step.

use crate::context::IngestionContext;
use crate::core::{StepKind, StepOutcome};
use crate::errors::{BackendError, StepError};
use crate::pipeline::Step;
use crate::providers::EmbeddingModel;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Embeds every chunk in batches and records the vectors on the context
/// and on each chunk's metadata.
#[derive(Debug, Clone)]
pub struct EmbeddingGenerationStep {
    model: Arc<dyn EmbeddingModel>,
    batch_size: usize,
}

impl EmbeddingGenerationStep {
    /// Creates the step. A zero batch size is treated as one.
    #[must_use]
    pub fn new(model: Arc<dyn EmbeddingModel>, batch_size: usize) -> Self {
        Self {
            model,
            batch_size: batch_size.max(1),
        }
    }
}

#[async_trait]
impl Step<IngestionContext> for EmbeddingGenerationStep {
    fn name(&self) -> &str {
        "embedding_generation"
    }

    fn kind(&self) -> StepKind {
        StepKind::EmbeddingGeneration
    }

    async fn run(&self, ctx: &mut IngestionContext) -> Result<StepOutcome, StepError> {
        if ctx.chunks.is_empty() {
            return Ok(StepOutcome::fail(
                "No chunks available. Chunk step must run first.",
            ));
        }

        info!(chunks = ctx.chunks.len(), model = self.model.model_name(), "Generating embeddings");

        let mut vectors = Vec::with_capacity(ctx.chunks.len());
        for batch in ctx.chunks.chunks(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            let embedded = self.model.embed_documents(&texts).await?;
            if embedded.len() != texts.len() {
                return Err(BackendError::embedding(format!(
                    "Expected {} embeddings, got {}",
                    texts.len(),
                    embedded.len()
                ))
                .into());
            }
            debug!(batch = texts.len(), "Embedded batch");
            vectors.extend(embedded);
        }

        let model_name = self.model.model_name().to_string();
        for (chunk, vector) in ctx.chunks.iter_mut().zip(&vectors) {
            chunk.metadata.embedding = Some(vector.clone());
            chunk.metadata.embedding_model = Some(model_name.clone());
        }
        ctx.vectors = vectors;

        info!(chunks = ctx.chunks.len(), "Generated embeddings");
        Ok(StepOutcome::Continue)
    }
}
