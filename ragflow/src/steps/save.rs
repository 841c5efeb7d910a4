//! Save step.

use crate::context::IngestionContext;
use crate::core::{StepKind, StepOutcome};
use crate::errors::StepError;
use crate::pipeline::Step;
use crate::providers::VectorStore;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Hex characters of the source digest kept in chunk ids.
const SOURCE_DIGEST_LEN: usize = 16;

/// Returns the store id of chunk `index` of `source`.
///
/// Ids are stable across runs. [`SaveStep`] also clears a document's earlier
/// chunks before writing, so a re-ingested document never keeps stale ones.
#[must_use]
pub fn chunk_id(source: &str, index: usize) -> String {
    let digest = hex::encode(Sha256::digest(source.as_bytes()));
    format!("chunk_{}_{index}", &digest[..SOURCE_DIGEST_LEN])
}

/// Writes embedded chunks to the vector store and persists it.
#[derive(Debug, Clone)]
pub struct SaveStep {
    store: Arc<dyn VectorStore>,
}

impl SaveStep {
    /// Creates a save step.
    #[must_use]
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Step<IngestionContext> for SaveStep {
    fn name(&self) -> &str {
        "save"
    }

    fn kind(&self) -> StepKind {
        StepKind::Save
    }

    async fn run(&self, ctx: &mut IngestionContext) -> Result<StepOutcome, StepError> {
        if ctx.chunks.is_empty() {
            return Ok(StepOutcome::fail(
                "No chunks available. Embedding step must run first.",
            ));
        }

        let embeddings: Option<Vec<Vec<f32>>> = if ctx.vectors.len() == ctx.chunks.len() {
            Some(ctx.vectors.clone())
        } else {
            ctx.chunks
                .iter()
                .map(|c| c.metadata.embedding.clone())
                .collect()
        };
        let Some(embeddings) = embeddings else {
            return Ok(StepOutcome::fail(format!(
                "Expected {} embeddings, found {}. Embedding step must run first.",
                ctx.chunks.len(),
                ctx.vectors.len()
            )));
        };

        let ids: Vec<String> = ctx
            .chunks
            .iter()
            .map(|c| chunk_id(&c.metadata.source, c.metadata.chunk_index))
            .collect();

        let sources: BTreeSet<&str> = ctx
            .chunks
            .iter()
            .map(|c| c.metadata.source.as_str())
            .collect();
        for source in sources {
            let removed = self.store.delete_by_source(source).await?;
            if removed > 0 {
                debug!(source, removed, "Replaced previously stored chunks");
            }
        }

        info!(chunks = ids.len(), "Saving chunks to vector store");
        self.store.add_chunks(&ids, &ctx.chunks, &embeddings).await?;
        self.store.persist().await?;

        info!(chunks = ids.len(), stored = self.store.len(), "Saved chunks");
        ctx.stored_ids = ids;
        Ok(StepOutcome::Continue)
    }
}
