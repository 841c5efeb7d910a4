//! Rule-based splitting: recursive, character and token.

use super::{finalize_positions, Chunk, ChunkMetadata, Chunker, ChunkingMethod};
use crate::errors::ConfigurationError;
use async_trait::async_trait;
use std::collections::VecDeque;
use tracing::{debug, warn};
use unicode_segmentation::UnicodeSegmentation;

/// Separators tried by the recursive method, coarsest first.
pub const RECURSIVE_SEPARATORS: [&str; 5] = ["\n\n", "\n", ". ", " ", ""];

/// Separator used by the character method.
const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Splits text by fixed rules with a sliding overlap.
///
/// Lengths are measured in characters for `recursive` and `character`, and
/// in word tokens for `token`.
#[derive(Debug, Clone)]
pub struct RuleBasedChunker {
    chunk_size: usize,
    chunk_overlap: usize,
    method: ChunkingMethod,
}

impl RuleBasedChunker {
    /// Creates a chunker.
    ///
    /// Fails if `chunk_size` is zero or `chunk_overlap >= chunk_size`.
    pub fn new(
        chunk_size: usize,
        chunk_overlap: usize,
        method: ChunkingMethod,
    ) -> Result<Self, ConfigurationError> {
        if chunk_size == 0 {
            return Err(ConfigurationError::InvalidChunkSize { chunk_size });
        }
        if chunk_overlap >= chunk_size {
            return Err(ConfigurationError::InvalidOverlap {
                chunk_overlap,
                chunk_size,
            });
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
            method,
        })
    }

    /// Creates a chunker from a method name.
    pub fn from_method_name(
        chunk_size: usize,
        chunk_overlap: usize,
        method: &str,
    ) -> Result<Self, ConfigurationError> {
        Self::new(chunk_size, chunk_overlap, method.parse()?)
    }

    /// Returns the splitting method.
    #[must_use]
    pub fn method(&self) -> ChunkingMethod {
        self.method
    }

    /// Splits text into chunk contents without metadata.
    #[must_use]
    pub fn split(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        match self.method {
            ChunkingMethod::Recursive => self.split_recursive(text, &RECURSIVE_SEPARATORS),
            ChunkingMethod::Character => {
                let pieces: Vec<&str> = text
                    .split(PARAGRAPH_SEPARATOR)
                    .filter(|p| !p.is_empty())
                    .collect();
                self.merge(&pieces, PARAGRAPH_SEPARATOR)
            }
            ChunkingMethod::Token => self.split_tokens(text),
        }
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let (separator, finer) = pick_separator(text, separators);
        let pieces: Vec<&str> = if separator.is_empty() {
            text.split_inclusive(|_: char| true).collect()
        } else {
            text.split_inclusive(separator).collect()
        };

        let mut chunks = Vec::new();
        let mut fitting: Vec<&str> = Vec::new();
        for piece in pieces {
            if char_len(piece) < self.chunk_size {
                fitting.push(piece);
                continue;
            }
            if !fitting.is_empty() {
                chunks.extend(self.merge(&fitting, ""));
                fitting.clear();
            }
            if finer.is_empty() {
                let trimmed = piece.trim();
                if !trimmed.is_empty() {
                    chunks.push(trimmed.to_string());
                }
            } else {
                chunks.extend(self.split_recursive(piece, finer));
            }
        }
        if !fitting.is_empty() {
            chunks.extend(self.merge(&fitting, ""));
        }
        chunks
    }

    /// Greedily packs pieces into chunks of at most `chunk_size`, carrying up
    /// to `chunk_overlap` of trailing pieces into the next chunk.
    fn merge(&self, pieces: &[&str], separator: &str) -> Vec<String> {
        let separator_len = char_len(separator);
        let mut chunks = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);
            let joined_len = |window: &VecDeque<&str>, total: usize| {
                total + len + if window.is_empty() { 0 } else { separator_len }
            };

            if joined_len(&window, total) > self.chunk_size {
                if total > self.chunk_size {
                    warn!(
                        length = total,
                        chunk_size = self.chunk_size,
                        "Created a chunk longer than chunk_size"
                    );
                }
                if !window.is_empty() {
                    push_joined(&mut chunks, &window, separator);
                    while total > self.chunk_overlap
                        || (joined_len(&window, total) > self.chunk_size && total > 0)
                    {
                        let Some(first) = window.pop_front() else {
                            break;
                        };
                        total -= char_len(first) + if window.is_empty() { 0 } else { separator_len };
                    }
                }
            }

            total += len + if window.is_empty() { 0 } else { separator_len };
            window.push_back(piece);
        }

        push_joined(&mut chunks, &window, separator);
        chunks
    }

    fn split_tokens(&self, text: &str) -> Vec<String> {
        let tokens: Vec<(usize, &str)> = text
            .split_word_bound_indices()
            .filter(|(_, word)| !word.trim().is_empty())
            .collect();
        if tokens.is_empty() {
            return Vec::new();
        }

        let stride = self.chunk_size - self.chunk_overlap;
        let mut chunks = Vec::new();
        let mut start = 0;
        loop {
            let end = (start + self.chunk_size).min(tokens.len());
            let (from, _) = tokens[start];
            let (last, last_word) = tokens[end - 1];
            chunks.push(text[from..last + last_word.len()].to_string());
            if end == tokens.len() {
                break;
            }
            start += stride;
        }
        chunks
    }
}

#[async_trait]
impl Chunker for RuleBasedChunker {
    fn name(&self) -> &str {
        "rule_based"
    }

    async fn chunk_text(&self, text: &str, base: &ChunkMetadata) -> Vec<Chunk> {
        let method = self.method.as_str();
        let mut chunks: Vec<Chunk> = self
            .split(text)
            .into_iter()
            .map(|content| Chunk::new(content, base.clone().with_method(method)))
            .collect();
        finalize_positions(&mut chunks);

        debug!(
            source = %base.source,
            method,
            chunks = chunks.len(),
            "Split document"
        );
        chunks
    }
}

/// Returns the first separator present in `text` and the finer ones after it.
fn pick_separator<'a, 's>(text: &str, separators: &'a [&'s str]) -> (&'s str, &'a [&'s str]) {
    for (i, separator) in separators.iter().enumerate() {
        if separator.is_empty() {
            return ("", &[]);
        }
        if text.contains(separator) {
            return (separator, &separators[i + 1..]);
        }
    }
    ("", &[])
}

fn push_joined(chunks: &mut Vec<String>, window: &VecDeque<&str>, separator: &str) {
    let joined = window.iter().copied().collect::<Vec<_>>().join(separator);
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_overlap_must_be_less_than_size() {
        assert!(RuleBasedChunker::new(100, 20, ChunkingMethod::Recursive).is_ok());
        assert!(matches!(
            RuleBasedChunker::new(100, 100, ChunkingMethod::Recursive),
            Err(ConfigurationError::InvalidOverlap { .. })
        ));
        assert!(matches!(
            RuleBasedChunker::new(100, 150, ChunkingMethod::Token),
            Err(ConfigurationError::InvalidOverlap { .. })
        ));
        assert!(matches!(
            RuleBasedChunker::new(0, 0, ChunkingMethod::Character),
            Err(ConfigurationError::InvalidChunkSize { chunk_size: 0 })
        ));
    }

    #[test]
    fn test_unknown_method_name() {
        let err = RuleBasedChunker::from_method_name(100, 10, "semantic").unwrap_err();
        assert!(matches!(err, ConfigurationError::UnknownMethod { .. }));
        assert!(RuleBasedChunker::from_method_name(100, 10, "Token").is_ok());
    }

    #[test]
    fn test_recursive_overlap_between_chunks() {
        let chunker = RuleBasedChunker::new(10, 5, ChunkingMethod::Recursive).unwrap();
        assert_eq!(
            chunker.split("aaaa bbbb cccc dddd"),
            vec!["aaaa bbbb", "bbbb cccc", "cccc dddd"]
        );
    }

    #[test]
    fn test_recursive_prefers_paragraphs() {
        let chunker = RuleBasedChunker::new(30, 0, ChunkingMethod::Recursive).unwrap();
        let text = "First paragraph here.\n\nSecond paragraph here.";
        assert_eq!(
            chunker.split(text),
            vec!["First paragraph here.", "Second paragraph here."]
        );
    }

    #[test]
    fn test_recursive_falls_back_to_finer_separators() {
        let chunker = RuleBasedChunker::new(12, 0, ChunkingMethod::Recursive).unwrap();
        let chunks = chunker.split("one two three four five six\n\nshort");
        assert!(chunks.iter().all(|c| c.chars().count() <= 12), "{chunks:?}");
        assert_eq!(chunks.last().map(String::as_str), Some("short"));
        assert_eq!(chunks.join(" "), "one two three four five six short");
    }

    #[test]
    fn test_recursive_splits_unbroken_text_by_characters() {
        let chunker = RuleBasedChunker::new(4, 0, ChunkingMethod::Recursive).unwrap();
        assert_eq!(chunker.split("abcdefghij"), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_character_keeps_oversized_paragraph_whole() {
        let chunker = RuleBasedChunker::new(10, 0, ChunkingMethod::Character).unwrap();
        let chunks = chunker.split("tiny\n\nthis paragraph is long\n\nend");
        assert_eq!(chunks, vec!["tiny", "this paragraph is long", "end"]);
    }

    #[test]
    fn test_character_merges_small_paragraphs() {
        let chunker = RuleBasedChunker::new(20, 0, ChunkingMethod::Character).unwrap();
        assert_eq!(chunker.split("a\n\nb\n\nc"), vec!["a\n\nb\n\nc"]);
    }

    #[test]
    fn test_token_windows_with_overlap() {
        let chunker = RuleBasedChunker::new(3, 1, ChunkingMethod::Token).unwrap();
        assert_eq!(
            chunker.split("one two three four five"),
            vec!["one two three", "three four five"]
        );
    }

    #[test]
    fn test_blank_input_yields_nothing() {
        let chunker = RuleBasedChunker::new(10, 2, ChunkingMethod::Recursive).unwrap();
        assert!(chunker.split("").is_empty());
        assert!(chunker.split("  \n\n  ").is_empty());
    }

    #[tokio::test]
    async fn test_chunk_text_assigns_positions() {
        let chunker = RuleBasedChunker::new(10, 5, ChunkingMethod::Recursive).unwrap();
        let base = ChunkMetadata::new("notes.md");
        let chunks = chunker.chunk_text("aaaa bbbb cccc dddd", &base).await;

        assert_eq!(chunks.len(), 3);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.metadata.chunk_index, i);
            assert_eq!(chunk.metadata.total_chunks, 3);
            assert_eq!(chunk.metadata.chunking_method, "recursive");
            assert_eq!(chunk.metadata.source, "notes.md");
        }
    }
}
