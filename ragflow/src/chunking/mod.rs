//! Document chunking.
//!
//! This module provides:
//! - [`RuleBasedChunker`]: recursive, character and token splitting with overlap
//! - [`HybridChunker`]: markdown-block chunks under a token ceiling, with
//!   greedy word re-splitting of oversized chunks
//! - [`transcript`]: punctuation-aware paragraph reconstruction for
//!   timestamped transcripts
//!
//! Every chunker numbers its output once, after all splitting is done.

mod hybrid;
mod rule_based;
mod token;
pub mod transcript;
mod types;

#[cfg(test)]
mod chunking_tests;

pub use hybrid::HybridChunker;
pub use rule_based::{RuleBasedChunker, RECURSIVE_SEPARATORS};
pub use token::{approximate_tokens, TokenCountApi, TokenCounter, CHARS_PER_TOKEN};
pub use types::{finalize_positions, Chunk, ChunkMetadata};

#[cfg(test)]
pub use token::MockTokenCountApi;

use crate::config::ChunkingConfig;
use crate::errors::ConfigurationError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

/// Splits documents into bounded chunks.
#[async_trait]
pub trait Chunker: Send + Sync + Debug {
    /// Returns the chunker's name for logging.
    fn name(&self) -> &str;

    /// Splits one document. `base` is copied onto every chunk before the
    /// position fields are filled in. Blank text yields no chunks.
    async fn chunk_text(&self, text: &str, base: &ChunkMetadata) -> Vec<Chunk>;

    /// Splits several documents and numbers the combined output.
    async fn chunk_documents(&self, documents: &[Chunk]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        for document in documents {
            chunks.extend(self.chunk_text(&document.content, &document.metadata).await);
        }
        finalize_positions(&mut chunks);
        chunks
    }

    /// Reads a UTF-8 markdown file and splits it.
    async fn chunk_markdown_file(&self, path: &Path) -> std::io::Result<Vec<Chunk>> {
        let text = tokio::fs::read_to_string(path).await?;
        Ok(self.chunk_text(&text, &ChunkMetadata::for_path(path)).await)
    }
}

/// Which chunker to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkerKind {
    /// [`RuleBasedChunker`].
    #[default]
    RuleBased,
    /// [`HybridChunker`].
    Hybrid,
}

impl fmt::Display for ChunkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RuleBased => write!(f, "rule_based"),
            Self::Hybrid => write!(f, "hybrid"),
        }
    }
}

/// Splitting rule of the rule-based chunker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ChunkingMethod {
    /// Paragraph, line, sentence, word, then character separators.
    #[default]
    Recursive,
    /// Paragraph breaks only.
    Character,
    /// Fixed windows of word tokens.
    Token,
}

impl ChunkingMethod {
    /// All accepted method names.
    pub const NAMES: [&'static str; 3] = ["recursive", "character", "token"];

    /// Returns the method name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recursive => "recursive",
            Self::Character => "character",
            Self::Token => "token",
        }
    }
}

impl fmt::Display for ChunkingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChunkingMethod {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "recursive" => Ok(Self::Recursive),
            "character" => Ok(Self::Character),
            "token" => Ok(Self::Token),
            _ => Err(ConfigurationError::UnknownMethod {
                method: s.to_string(),
                expected: Self::NAMES.join(", "),
            }),
        }
    }
}

impl TryFrom<String> for ChunkingMethod {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ChunkingMethod> for String {
    fn from(method: ChunkingMethod) -> Self {
        method.as_str().to_string()
    }
}

/// Builds the chunker selected by `config`.
///
/// `token_api` is only used by the hybrid chunker; without it token counts
/// are approximated.
pub async fn build_chunker(
    config: &ChunkingConfig,
    token_api: Option<Arc<dyn TokenCountApi>>,
) -> Result<Arc<dyn Chunker>, ConfigurationError> {
    config.validate()?;
    match config.chunker {
        ChunkerKind::RuleBased => Ok(Arc::new(RuleBasedChunker::new(
            config.chunk_size,
            config.chunk_overlap,
            config.method,
        )?)),
        ChunkerKind::Hybrid => {
            let counter = match token_api {
                Some(api) => TokenCounter::with_api(api, &config.tokenizer_model).await,
                None => TokenCounter::approximate(),
            };
            Ok(Arc::new(HybridChunker::new(
                config.max_tokens,
                config.merge_peers,
                counter,
            )?))
        }
    }
}
