//! Chunk and chunk metadata types.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Metadata persisted alongside every chunk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Where the chunk came from (usually a file path).
    pub source: String,
    /// File name component of the source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// Position of the chunk within its document, starting at 0.
    #[serde(default)]
    pub chunk_index: usize,
    /// Number of chunks the document produced.
    #[serde(default)]
    pub total_chunks: usize,
    /// Which splitting rule produced the chunk.
    #[serde(default)]
    pub chunking_method: String,
    /// Embedding vector, once computed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    /// Model that produced the embedding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding_model: Option<String>,
    /// Tags granting access to the chunk.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub access_tags: BTreeSet<String>,
    /// Role granted access regardless of tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_role_strict: Option<String>,
    /// Transcript start time (`HH:MM:SS`) for timestamped sources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Any other key/value pairs.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ChunkMetadata {
    /// Creates metadata for a source.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    /// Creates metadata for a file, filling `source` and `file_name`.
    #[must_use]
    pub fn for_path(path: &Path) -> Self {
        Self {
            source: path.display().to_string(),
            file_name: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned()),
            ..Self::default()
        }
    }

    /// Sets the chunking method.
    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.chunking_method = method.into();
        self
    }

    /// Adds an extra key/value pair.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// A bounded unit of document text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// The chunk text.
    pub content: String,
    /// Position and source metadata.
    pub metadata: ChunkMetadata,
}

impl Chunk {
    /// Creates a new chunk.
    #[must_use]
    pub fn new(content: impl Into<String>, metadata: ChunkMetadata) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }

    /// Returns the `page` entry of the extra metadata, if any.
    #[must_use]
    pub fn page(&self) -> Option<&serde_json::Value> {
        self.metadata.extra.get("page")
    }
}

/// Rewrites `chunk_index` and `total_chunks` over the whole slice.
///
/// Run once after all splitting for a document is done.
pub fn finalize_positions(chunks: &mut [Chunk]) {
    let total = chunks.len();
    for (index, chunk) in chunks.iter_mut().enumerate() {
        chunk.metadata.chunk_index = index;
        chunk.metadata.total_chunks = total;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_finalize_positions() {
        let mut chunks = vec![
            Chunk::new("a", ChunkMetadata::new("doc")),
            Chunk::new("b", ChunkMetadata::new("doc")),
            Chunk::new("c", ChunkMetadata::new("doc")),
        ];
        chunks[2].metadata.chunk_index = 99;

        finalize_positions(&mut chunks);

        let positions: Vec<_> = chunks
            .iter()
            .map(|c| (c.metadata.chunk_index, c.metadata.total_chunks))
            .collect();
        assert_eq!(positions, vec![(0, 3), (1, 3), (2, 3)]);
    }

    #[test]
    fn test_metadata_for_path() {
        let metadata = ChunkMetadata::for_path(Path::new("data/markdown/report.md"));
        assert_eq!(metadata.source, "data/markdown/report.md");
        assert_eq!(metadata.file_name.as_deref(), Some("report.md"));
    }

    #[test]
    fn test_metadata_serializes_extra_flat() {
        let metadata = ChunkMetadata::new("doc.md")
            .with_method("recursive")
            .with_extra("page", serde_json::json!(3));
        let json = serde_json::to_value(&metadata).unwrap();

        assert_eq!(json["source"], "doc.md");
        assert_eq!(json["page"], 3);
        assert_eq!(json["chunking_method"], "recursive");
        assert!(json.get("embedding").is_none());
        assert!(json.get("access_tags").is_none());

        let back: ChunkMetadata = serde_json::from_value(json).unwrap();
        assert_eq!(back, metadata);
    }
}
