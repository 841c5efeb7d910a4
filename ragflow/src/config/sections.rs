//! Configuration sections.

use crate::chunking::{ChunkerKind, ChunkingMethod};
use crate::errors::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Chunking parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Which chunker to build.
    #[serde(default)]
    pub chunker: ChunkerKind,
    /// Maximum chunk length for the rule-based chunker.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Overlap between consecutive rule-based chunks.
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
    /// Rule-based splitting method.
    #[serde(default)]
    pub method: ChunkingMethod,
    /// Token ceiling for the hybrid chunker.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
    /// Whether the hybrid chunker merges small sibling blocks.
    #[serde(default)]
    pub merge_peers: bool,
    /// Model whose tokenizer the hybrid chunker counts with.
    #[serde(default = "default_tokenizer_model")]
    pub tokenizer_model: String,
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_max_tokens() -> usize {
    2000
}

fn default_tokenizer_model() -> String {
    "gemini-embedding-001".to_string()
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunker: ChunkerKind::default(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            method: ChunkingMethod::default(),
            max_tokens: default_max_tokens(),
            merge_peers: false,
            tokenizer_model: default_tokenizer_model(),
        }
    }
}

impl ChunkingConfig {
    /// Selects the rule-based chunker with the given parameters.
    #[must_use]
    pub fn rule_based(chunk_size: usize, chunk_overlap: usize, method: ChunkingMethod) -> Self {
        Self {
            chunker: ChunkerKind::RuleBased,
            chunk_size,
            chunk_overlap,
            method,
            ..Self::default()
        }
    }

    /// Selects the hybrid chunker with the given parameters.
    #[must_use]
    pub fn hybrid(max_tokens: usize, merge_peers: bool) -> Self {
        Self {
            chunker: ChunkerKind::Hybrid,
            max_tokens,
            merge_peers,
            ..Self::default()
        }
    }

    /// Checks the parameters of the selected chunker.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        match self.chunker {
            ChunkerKind::RuleBased => {
                if self.chunk_size == 0 {
                    return Err(ConfigurationError::InvalidChunkSize {
                        chunk_size: self.chunk_size,
                    });
                }
                if self.chunk_overlap >= self.chunk_size {
                    return Err(ConfigurationError::InvalidOverlap {
                        chunk_overlap: self.chunk_overlap,
                        chunk_size: self.chunk_size,
                    });
                }
            }
            ChunkerKind::Hybrid => {
                if self.max_tokens == 0 {
                    return Err(ConfigurationError::InvalidMaxTokens {
                        max_tokens: self.max_tokens,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Embedding parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Number of chunks sent per embedding request.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_batch_size() -> usize {
    32
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
        }
    }
}

/// Vector store parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorStoreConfig {
    /// Collection name.
    #[serde(default = "default_collection_name")]
    pub collection_name: String,
    /// Directory the store persists to.
    #[serde(default = "default_persist_directory")]
    pub persist_directory: PathBuf,
}

fn default_collection_name() -> String {
    "rag_collection".to_string()
}

fn default_persist_directory() -> PathBuf {
    PathBuf::from("./vector_db")
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            collection_name: default_collection_name(),
            persist_directory: default_persist_directory(),
        }
    }
}

/// Retrieval parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of chunks to retrieve.
    #[serde(default = "default_k")]
    pub k: usize,
    /// JSON file mapping roles to authorized tags.
    #[serde(default = "default_role_mapping_path")]
    pub role_mapping_path: PathBuf,
}

fn default_k() -> usize {
    5
}

fn default_role_mapping_path() -> PathBuf {
    PathBuf::from("role_mapping.json")
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            k: default_k(),
            role_mapping_path: default_role_mapping_path(),
        }
    }
}

/// Answer generation parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Maximum characters of retrieved context placed in the prompt.
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,
}

fn default_max_context_chars() -> usize {
    12_000
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_context_chars: default_max_context_chars(),
        }
    }
}

/// Filesystem locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding source documents.
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,
    /// Directory the load step writes markdown into.
    #[serde(default = "default_markdown_dir")]
    pub markdown_dir: PathBuf,
}

fn default_input_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_markdown_dir() -> PathBuf {
    PathBuf::from("./data/markdown")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
            markdown_dir: default_markdown_dir(),
        }
    }
}

/// Logging parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive (`info`, `ragflow=debug`, ...).
    #[serde(default = "default_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

/// Ollama server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Server base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Embedding model name.
    #[serde(default = "default_embed_model")]
    pub embed_model: String,
    /// Generation model name.
    #[serde(default = "default_generate_model")]
    pub generate_model: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Retries after the first failed attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_embed_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_generate_model() -> String {
    "llama3.2".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_max_retries() -> u32 {
    3
}

fn default_temperature() -> f32 {
    0.1
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            embed_model: default_embed_model(),
            generate_model: default_generate_model(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            temperature: default_temperature(),
        }
    }
}

impl OllamaConfig {
    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the retry count.
    #[must_use]
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }
}
