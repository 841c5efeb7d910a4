//! Deterministic stand-ins for the embedding model and the LLM.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::errors::BackendError;
use crate::providers::{EmbeddingModel, Llm};

/// Embeds text as a normalized histogram of its lowercase characters.
///
/// Equal texts get equal vectors and texts sharing words land close
/// together, which is enough for retrieval tests.
#[derive(Debug)]
pub struct HashEmbeddingModel {
    dimensions: usize,
    model: String,
    calls: Mutex<Vec<usize>>,
    error: Option<BackendError>,
    drop_last: bool,
}

impl Default for HashEmbeddingModel {
    fn default() -> Self {
        Self::new(16)
    }
}

impl HashEmbeddingModel {
    /// Creates a model producing vectors of `dimensions` entries.
    #[must_use]
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
            model: "hash-embedding".to_string(),
            calls: Mutex::new(Vec::new()),
            error: None,
            drop_last: false,
        }
    }

    /// Creates a model whose every call fails with `error`.
    #[must_use]
    pub fn failing(error: BackendError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    /// Makes `embed_documents` return one vector too few.
    #[must_use]
    pub fn dropping_last(mut self) -> Self {
        self.drop_last = true;
        self
    }

    /// Returns the batch sizes `embed_documents` was called with.
    #[must_use]
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.calls.lock().clone()
    }

    /// Embeds one text.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for c in text.chars().filter(|c| c.is_alphanumeric()) {
            for lower in c.to_lowercase() {
                vector[lower as usize % self.dimensions] += 1.0;
            }
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }
}

#[async_trait]
impl EmbeddingModel for HashEmbeddingModel {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, BackendError> {
        self.calls.lock().push(texts.len());
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        let mut vectors: Vec<Vec<f32>> = texts.iter().map(|t| self.vector_for(t)).collect();
        if self.drop_last {
            vectors.pop();
        }
        Ok(vectors)
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, BackendError> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        Ok(self.vector_for(text))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Answers every prompt with a fixed response and keeps the prompts.
#[derive(Debug)]
pub struct StaticLlm {
    response: Result<String, BackendError>,
    prompts: Mutex<Vec<String>>,
}

impl StaticLlm {
    /// Creates an LLM that always answers `response`.
    #[must_use]
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: Ok(response.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Creates an LLM that always fails with `error`.
    #[must_use]
    pub fn failing(error: BackendError) -> Self {
        Self {
            response: Err(error),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Returns the prompts received so far.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl Llm for StaticLlm {
    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        self.prompts.lock().push(prompt.to_string());
        self.response.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_embeddings_are_deterministic_and_normalized() {
        let model = HashEmbeddingModel::new(8);
        let a = model.embed_query("Remote work policy").await.unwrap();
        let b = model.embed_query("remote WORK policy").await.unwrap();

        assert_eq!(a, b);
        let norm: f32 = a.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
        assert_eq!(model.embed_query("...").await.unwrap(), vec![0.0; 8]);
    }

    #[tokio::test]
    async fn test_hash_embedding_batches_are_recorded() {
        let model = HashEmbeddingModel::default().dropping_last();
        let texts = vec!["a".to_string(), "b".to_string()];

        assert_eq!(model.embed_documents(&texts).await.unwrap().len(), 1);
        assert_eq!(model.batch_sizes(), vec![2]);
    }

    #[tokio::test]
    async fn test_static_llm() {
        let llm = StaticLlm::new("It depends [1].");
        assert_eq!(llm.generate("Q?").await.unwrap(), "It depends [1].");
        assert_eq!(llm.prompts(), vec!["Q?".to_string()]);

        let llm = StaticLlm::failing(BackendError::llm("down"));
        assert!(llm.generate("Q?").await.is_err());
    }
}
