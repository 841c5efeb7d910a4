//! Query embedding step.

use crate::context::QueryContext;
use crate::core::{StepKind, StepOutcome};
use crate::errors::StepError;
use crate::pipeline::Step;
use crate::providers::EmbeddingModel;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Embeds the user's question.
#[derive(Debug, Clone)]
pub struct QueryEmbeddingStep {
    model: Arc<dyn EmbeddingModel>,
}

impl QueryEmbeddingStep {
    /// Creates the step.
    #[must_use]
    pub fn new(model: Arc<dyn EmbeddingModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl Step<QueryContext> for QueryEmbeddingStep {
    fn name(&self) -> &str {
        "query_embedding"
    }

    fn kind(&self) -> StepKind {
        StepKind::QueryEmbedding
    }

    async fn run(&self, ctx: &mut QueryContext) -> Result<StepOutcome, StepError> {
        let query = ctx.user_query.trim();
        if query.is_empty() {
            return Ok(StepOutcome::fail("Query is empty."));
        }

        info!(query = %query, "Generating query embedding");
        let vector = self.model.embed_query(query).await?;
        ctx.query_vector = Some(vector);
        Ok(StepOutcome::Continue)
    }
}
