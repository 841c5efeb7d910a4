//! Token-budget chunking over markdown structure.

use super::{
    approximate_tokens, finalize_positions, Chunk, ChunkMetadata, Chunker, TokenCounter,
    CHARS_PER_TOKEN,
};
use crate::errors::ConfigurationError;
use async_trait::async_trait;
use pulldown_cmark::{Event, Options, Parser, Tag};
use serde_json::json;
use tracing::debug;

const METHOD_HYBRID: &str = "hybrid";
const METHOD_SPLIT: &str = "hybrid_split";
const METHOD_TOKEN_BASED: &str = "hybrid_token_based";

/// A top-level markdown block with the headings it sits under.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Section {
    headings: Vec<String>,
    body: String,
}

impl Section {
    /// Block text prefixed with its heading path.
    fn contextualized(&self) -> String {
        let path = self
            .headings
            .iter()
            .filter(|h| !h.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" > ");
        match (path.is_empty(), self.body.is_empty()) {
            (true, _) => self.body.clone(),
            (false, true) => path,
            (false, false) => format!("{path}\n{}", self.body),
        }
    }
}

/// Chunks markdown by structural blocks under a token ceiling.
///
/// Each top-level block (paragraph, list, table, code block, quote) becomes
/// a chunk prefixed with its heading path. With `merge_peers`, consecutive
/// blocks under the same headings are merged while they fit. A chunk over
/// `max_tokens` is re-split greedily by words so that every emitted chunk
/// fits the ceiling.
#[derive(Debug)]
pub struct HybridChunker {
    max_tokens: usize,
    merge_peers: bool,
    counter: TokenCounter,
}

impl HybridChunker {
    /// Creates a chunker. Fails if `max_tokens` is zero.
    pub fn new(
        max_tokens: usize,
        merge_peers: bool,
        counter: TokenCounter,
    ) -> Result<Self, ConfigurationError> {
        if max_tokens == 0 {
            return Err(ConfigurationError::InvalidMaxTokens { max_tokens });
        }
        Ok(Self {
            max_tokens,
            merge_peers,
            counter,
        })
    }

    /// Returns the token ceiling.
    #[must_use]
    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    /// Returns the counter in use.
    #[must_use]
    pub fn counter(&self) -> &TokenCounter {
        &self.counter
    }

    /// Greedily packs whitespace-separated words into pieces whose
    /// approximate token count stays within `max_tokens`.
    ///
    /// A single word over the ceiling is cut into character windows.
    #[must_use]
    pub fn split_by_words(&self, text: &str) -> Vec<String> {
        let mut pieces = Vec::new();
        let mut buffer = String::new();

        for word in text.split_whitespace() {
            if approximate_tokens(word) > self.max_tokens {
                if !buffer.is_empty() {
                    pieces.push(std::mem::take(&mut buffer));
                }
                pieces.extend(self.split_long_word(word));
                continue;
            }

            let candidate_len = if buffer.is_empty() {
                word.chars().count()
            } else {
                buffer.chars().count() + 1 + word.chars().count()
            };
            if candidate_len / CHARS_PER_TOKEN <= self.max_tokens {
                if !buffer.is_empty() {
                    buffer.push(' ');
                }
                buffer.push_str(word);
            } else {
                pieces.push(std::mem::replace(&mut buffer, word.to_string()));
            }
        }

        if !buffer.is_empty() {
            pieces.push(buffer);
        }
        pieces
    }

    fn split_long_word(&self, word: &str) -> Vec<String> {
        let window = self.max_tokens * CHARS_PER_TOKEN;
        let chars: Vec<char> = word.chars().collect();
        chars
            .chunks(window)
            .map(|piece| piece.iter().collect())
            .collect()
    }

    async fn merge_peer_sections(&self, sections: Vec<Section>) -> Vec<Section> {
        let mut merged: Vec<Section> = Vec::with_capacity(sections.len());
        for section in sections {
            if let Some(last) = merged.last_mut() {
                if last.headings == section.headings
                    && !last.body.is_empty()
                    && !section.body.is_empty()
                {
                    let candidate = Section {
                        headings: section.headings.clone(),
                        body: format!("{}\n\n{}", last.body, section.body),
                    };
                    if self.counter.count(&candidate.contextualized()).await <= self.max_tokens {
                        *last = candidate;
                        continue;
                    }
                }
            }
            merged.push(section);
        }
        merged
    }
}

#[async_trait]
impl Chunker for HybridChunker {
    fn name(&self) -> &str {
        "hybrid"
    }

    async fn chunk_text(&self, text: &str, base: &ChunkMetadata) -> Vec<Chunk> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let mut sections = segment_markdown(text);
        if sections.is_empty() {
            let mut chunks: Vec<Chunk> = self
                .split_by_words(text)
                .into_iter()
                .map(|piece| Chunk::new(piece, base.clone().with_method(METHOD_TOKEN_BASED)))
                .collect();
            finalize_positions(&mut chunks);
            debug!(source = %base.source, chunks = chunks.len(), "No markdown blocks, split by words");
            return chunks;
        }

        if self.merge_peers {
            sections = self.merge_peer_sections(sections).await;
        }

        let mut chunks = Vec::with_capacity(sections.len());
        let mut oversized = 0usize;
        for (index, section) in sections.iter().enumerate() {
            let content = section.contextualized();
            if self.counter.count(&content).await <= self.max_tokens {
                chunks.push(Chunk::new(content, base.clone().with_method(METHOD_HYBRID)));
                continue;
            }

            oversized += 1;
            for (sub_index, piece) in self.split_by_words(&content).into_iter().enumerate() {
                let metadata = base
                    .clone()
                    .with_method(METHOD_SPLIT)
                    .with_extra("original_chunk_index", json!(index))
                    .with_extra("sub_chunk_index", json!(sub_index));
                chunks.push(Chunk::new(piece, metadata));
            }
        }
        finalize_positions(&mut chunks);

        debug!(
            source = %base.source,
            sections = sections.len(),
            oversized,
            chunks = chunks.len(),
            exact_tokens = self.counter.is_exact(),
            "Split document"
        );
        chunks
    }
}

/// Splits markdown into top-level blocks, tracking the heading path.
///
/// Headings are not emitted on their own unless no block follows them
/// before the next heading.
fn segment_markdown(text: &str) -> Vec<Section> {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let mut sections = Vec::new();
    let mut path: Vec<(usize, String)> = Vec::new();
    let mut heading: Option<(usize, String)> = None;
    let mut heading_without_body = false;
    let mut depth = 0usize;

    let titles =
        |path: &[(usize, String)]| -> Vec<String> { path.iter().map(|(_, t)| t.clone()).collect() };

    for (event, range) in Parser::new_ext(text, options).into_offset_iter() {
        match event {
            Event::Start(tag) => {
                if depth == 0 {
                    if let Tag::Heading { level, .. } = tag {
                        heading = Some((level as usize, String::new()));
                    }
                }
                depth += 1;
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if depth > 0 {
                    continue;
                }
                if let Some((level, title)) = heading.take() {
                    if heading_without_body {
                        sections.push(Section {
                            headings: titles(&path),
                            body: String::new(),
                        });
                    }
                    while path.last().is_some_and(|(l, _)| *l >= level) {
                        path.pop();
                    }
                    path.push((level, title.trim().to_string()));
                    heading_without_body = true;
                } else {
                    let body = text[range].trim();
                    if !body.is_empty() {
                        sections.push(Section {
                            headings: titles(&path),
                            body: body.to_string(),
                        });
                        heading_without_body = false;
                    }
                }
            }
            Event::Text(fragment) | Event::Code(fragment) => {
                if let Some((_, title)) = heading.as_mut() {
                    title.push_str(&fragment);
                }
            }
            _ => {}
        }
    }

    if heading_without_body {
        sections.push(Section {
            headings: titles(&path),
            body: String::new(),
        });
    }
    sections
}
