//! Embedding model interface.

use crate::errors::BackendError;
use async_trait::async_trait;
use std::fmt::Debug;

/// Produces embedding vectors for documents and queries.
///
/// Implementations own their retry policy; callers issue each request once.
#[async_trait]
pub trait EmbeddingModel: Send + Sync + Debug {
    /// Embeds a batch of document texts, one vector per text, in order.
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, BackendError>;

    /// Embeds a single query text.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, BackendError>;

    /// Returns the model identifier recorded on embedded chunks.
    fn model_name(&self) -> &str;
}
