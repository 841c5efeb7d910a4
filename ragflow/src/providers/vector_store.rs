//! Vector store interface.

use crate::access::AccessFilter;
use crate::chunking::Chunk;
use crate::errors::BackendError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};

/// How a backend's scores order results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorePolarity {
    /// Lower scores are closer (L2 or cosine distance).
    Distance,
    /// Higher scores are closer (cosine similarity).
    Similarity,
}

impl fmt::Display for ScorePolarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Distance => write!(f, "distance"),
            Self::Similarity => write!(f, "similarity"),
        }
    }
}

impl ScorePolarity {
    /// Returns true if `a` is a better match than `b` under this polarity.
    #[must_use]
    pub fn is_better(&self, a: f32, b: f32) -> bool {
        match self {
            Self::Distance => a < b,
            Self::Similarity => a > b,
        }
    }
}

/// A retrieved chunk with the backend's raw score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    /// The chunk.
    pub chunk: Chunk,
    /// Backend score; read it with the store's [`ScorePolarity`].
    pub score: f32,
}

impl ScoredChunk {
    /// Creates a new scored chunk.
    #[must_use]
    pub fn new(chunk: Chunk, score: f32) -> Self {
        Self { chunk, score }
    }
}

/// Stores embedded chunks and answers filtered similarity queries.
#[async_trait]
pub trait VectorStore: Send + Sync + Debug {
    /// Upserts chunks under the given ids with their embeddings.
    async fn add_chunks(
        &self,
        ids: &[String],
        chunks: &[Chunk],
        embeddings: &[Vec<f32>],
    ) -> Result<(), BackendError>;

    /// Removes every chunk whose metadata `source` is `source` and returns
    /// how many were removed.
    async fn delete_by_source(&self, source: &str) -> Result<usize, BackendError>;

    /// Returns up to `k` chunks visible through `filter`, best first.
    async fn similarity_search_with_score(
        &self,
        query: &[f32],
        k: usize,
        filter: Option<&AccessFilter>,
    ) -> Result<Vec<ScoredChunk>, BackendError>;

    /// Flushes stored data to durable storage, if the backend has any.
    async fn persist(&self) -> Result<(), BackendError>;

    /// Returns how this backend's scores order results.
    fn score_polarity(&self) -> ScorePolarity;

    /// Returns the number of stored chunks.
    fn len(&self) -> usize;

    /// Returns true if nothing is stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polarity_ordering() {
        assert!(ScorePolarity::Distance.is_better(0.1, 0.5));
        assert!(!ScorePolarity::Distance.is_better(0.5, 0.1));
        assert!(ScorePolarity::Similarity.is_better(0.9, 0.2));
        assert_eq!(ScorePolarity::Distance.to_string(), "distance");
    }
}
