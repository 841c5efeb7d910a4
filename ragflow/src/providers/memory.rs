//! Brute-force in-memory vector store.

use super::{ScorePolarity, ScoredChunk, VectorStore};
use crate::access::AccessFilter;
use crate::chunking::Chunk;
use crate::errors::BackendError;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File name used inside the persist directory.
const STORE_FILE: &str = "store.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEntry {
    id: String,
    chunk: Chunk,
    embedding: Vec<f32>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreSnapshot {
    collection: String,
    entries: Vec<StoredEntry>,
}

/// In-memory vector store using cosine similarity.
///
/// Scores are similarities (higher is closer). Suitable for tests and small
/// corpora. When created with a persist directory, [`VectorStore::persist`]
/// writes the collection as JSON and [`InMemoryVectorStore::open`] reads it
/// back.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    collection: String,
    persist_dir: Option<PathBuf>,
    entries: RwLock<Vec<StoredEntry>>,
}

impl InMemoryVectorStore {
    /// Creates an empty, non-persistent store.
    #[must_use]
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            persist_dir: None,
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Sets the directory `persist` writes to.
    #[must_use]
    pub fn with_persist_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.persist_dir = Some(dir.into());
        self
    }

    /// Opens a persisted collection, or an empty one if nothing was saved.
    pub async fn open(
        collection: impl Into<String>,
        dir: impl Into<PathBuf>,
    ) -> Result<Self, BackendError> {
        let store = Self::new(collection).with_persist_dir(dir);
        let Some(path) = store.store_file() else {
            return Ok(store);
        };

        match tokio::fs::read_to_string(&path).await {
            Ok(raw) => {
                let snapshot: StoreSnapshot = serde_json::from_str(&raw).map_err(|e| {
                    BackendError::vector_store(format!(
                        "Corrupt store file {}: {e}",
                        path.display()
                    ))
                })?;
                if snapshot.collection != store.collection {
                    return Err(BackendError::vector_store(format!(
                        "Store file {} holds collection '{}', expected '{}'",
                        path.display(),
                        snapshot.collection,
                        store.collection
                    )));
                }
                info!(
                    path = %path.display(),
                    chunks = snapshot.entries.len(),
                    "Loaded vector store"
                );
                *store.entries.write() = snapshot.entries;
                Ok(store)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(store),
            Err(e) => Err(BackendError::vector_store(format!(
                "Failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    /// Returns the collection name.
    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Returns the stored ids in insertion order.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.entries.read().iter().map(|e| e.id.clone()).collect()
    }

    /// Removes everything.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    fn store_file(&self) -> Option<PathBuf> {
        self.persist_dir.as_deref().map(|dir| dir.join(STORE_FILE))
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn add_chunks(
        &self,
        ids: &[String],
        chunks: &[Chunk],
        embeddings: &[Vec<f32>],
    ) -> Result<(), BackendError> {
        if ids.len() != chunks.len() || chunks.len() != embeddings.len() {
            return Err(BackendError::vector_store(format!(
                "Mismatched batch: {} ids, {} chunks, {} embeddings",
                ids.len(),
                chunks.len(),
                embeddings.len()
            )));
        }

        let mut entries = self.entries.write();
        for ((id, chunk), embedding) in ids.iter().zip(chunks).zip(embeddings) {
            let mut chunk = chunk.clone();
            chunk.metadata.embedding = None;
            let entry = StoredEntry {
                id: id.clone(),
                chunk,
                embedding: embedding.clone(),
            };
            match entries.iter_mut().find(|e| e.id == *id) {
                Some(existing) => *existing = entry,
                None => entries.push(entry),
            }
        }
        debug!(collection = %self.collection, added = ids.len(), total = entries.len(), "Added chunks");
        Ok(())
    }

    async fn delete_by_source(&self, source: &str) -> Result<usize, BackendError> {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|e| e.chunk.metadata.source != source);
        let removed = before - entries.len();
        debug!(collection = %self.collection, source, removed, "Deleted chunks by source");
        Ok(removed)
    }

    async fn similarity_search_with_score(
        &self,
        query: &[f32],
        k: usize,
        filter: Option<&AccessFilter>,
    ) -> Result<Vec<ScoredChunk>, BackendError> {
        let entries = self.entries.read();
        let mut results: Vec<ScoredChunk> = entries
            .iter()
            .filter(|e| filter.map_or(true, |f| f.matches(&e.chunk.metadata)))
            .map(|e| ScoredChunk::new(e.chunk.clone(), cosine_similarity(query, &e.embedding)))
            .collect();

        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(k);
        Ok(results)
    }

    async fn persist(&self) -> Result<(), BackendError> {
        let Some(path) = self.store_file() else {
            return Ok(());
        };

        let snapshot = StoreSnapshot {
            collection: self.collection.clone(),
            entries: self.entries.read().clone(),
        };
        let raw = serde_json::to_string(&snapshot)
            .map_err(|e| BackendError::vector_store(e.to_string()))?;

        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| io_error(dir, &e))?;
        }
        tokio::fs::write(&path, raw)
            .await
            .map_err(|e| io_error(&path, &e))?;

        debug!(path = %path.display(), chunks = snapshot.entries.len(), "Persisted vector store");
        Ok(())
    }

    fn score_polarity(&self) -> ScorePolarity {
        ScorePolarity::Similarity
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }
}

fn io_error(path: &Path, err: &std::io::Error) -> BackendError {
    BackendError::vector_store(format!("Failed to write {}: {err}", path.display()))
}

/// Cosine similarity in [-1, 1]; zero vectors and length mismatches score 0.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
