//! Paragraph reconstruction for timestamped transcripts.
//!
//! Speech-to-text output arrives as short segments. Segments are gathered
//! into paragraphs that end on terminal punctuation once they pass
//! [`MIN_PARAGRAPH_CHARS`], and are cut unconditionally past
//! [`MAX_PARAGRAPH_CHARS`].

use super::{finalize_positions, Chunk, ChunkMetadata};
use crate::errors::RagflowError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A paragraph may end on punctuation once it is longer than this.
pub const MIN_PARAGRAPH_CHARS: usize = 500;

/// A paragraph is always cut once it is longer than this.
pub const MAX_PARAGRAPH_CHARS: usize = 2000;

/// Chunking method recorded on transcript chunks.
pub const TRANSCRIPT_METHOD: &str = "transcript";

const RESULT_SUFFIX: &str = "_result";

/// One recognized span of speech.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Recognized text.
    #[serde(default)]
    pub text: String,
    /// Start offset in seconds.
    #[serde(default)]
    pub start: f64,
    /// End offset in seconds.
    #[serde(default)]
    pub end: f64,
}

impl TranscriptSegment {
    /// Creates a segment.
    #[must_use]
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }
}

/// A reconstructed paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptParagraph {
    /// Start time of the first segment, as `HH:MM:SS`.
    pub timestamp: String,
    /// Segment texts joined by single spaces.
    pub text: String,
}

/// Whisper JSON output. Only `text` and `segments` are read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhisperTranscript {
    /// Full transcript text.
    pub text: String,
    /// Timed segments.
    pub segments: Vec<TranscriptSegment>,
}

impl WhisperTranscript {
    /// Parses Whisper JSON.
    pub fn from_json_str(json: &str) -> Result<Self, RagflowError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reconstructs this transcript's paragraphs.
    #[must_use]
    pub fn paragraphs(&self) -> Vec<TranscriptParagraph> {
        reconstruct_paragraphs(&self.segments)
    }
}

/// Formats seconds as `HH:MM:SS`, truncating fractions.
#[must_use]
pub fn seconds_to_timestamp(seconds: f64) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let total = seconds.max(0.0).floor() as u64;
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

/// Groups segments into paragraphs.
///
/// Blank segments are skipped. After each appended segment the paragraph is
/// flushed when its length (sum of trimmed segment lengths) exceeds
/// [`MIN_PARAGRAPH_CHARS`] and the segment ends in `.`, `?` or `!`, when the
/// length exceeds [`MAX_PARAGRAPH_CHARS`], or when the segment is the last
/// one. Anything left after the last segment is flushed as well.
#[must_use]
pub fn reconstruct_paragraphs(segments: &[TranscriptSegment]) -> Vec<TranscriptParagraph> {
    let mut paragraphs = Vec::new();
    let mut texts: Vec<&str> = Vec::new();
    let mut start: Option<f64> = None;
    let mut length = 0usize;

    let mut flush = |texts: &mut Vec<&str>, start: &mut Option<f64>, length: &mut usize| {
        if let Some(first) = start.take() {
            paragraphs.push(TranscriptParagraph {
                timestamp: seconds_to_timestamp(first),
                text: texts.join(" "),
            });
        }
        texts.clear();
        *length = 0;
    };

    let last = segments.len().saturating_sub(1);
    for (index, segment) in segments.iter().enumerate() {
        let text = segment.text.trim();
        if text.is_empty() {
            continue;
        }

        start.get_or_insert(segment.start);
        texts.push(text);
        length += text.chars().count();

        let terminal = text.ends_with(['.', '?', '!']);
        if (length > MIN_PARAGRAPH_CHARS && terminal)
            || length > MAX_PARAGRAPH_CHARS
            || index == last
        {
            flush(&mut texts, &mut start, &mut length);
        }
    }
    flush(&mut texts, &mut start, &mut length);

    paragraphs
}

/// Renders paragraphs as a markdown transcript.
#[must_use]
pub fn transcript_to_markdown(title: &str, paragraphs: &[TranscriptParagraph]) -> String {
    let mut blocks = Vec::with_capacity(paragraphs.len() + 1);
    blocks.push(format!("# Transcript: {title}\n"));
    blocks.extend(
        paragraphs
            .iter()
            .map(|p| format!("**(Time: {})** {}\n", p.timestamp, p.text)),
    );
    blocks.join("\n")
}

/// Derives a transcript title from its file name, dropping a `_result`
/// suffix.
#[must_use]
pub fn transcript_title(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    stem.replace(RESULT_SUFFIX, "")
}

/// Turns paragraphs into one chunk each, stamped with their timestamp.
#[must_use]
pub fn paragraphs_to_chunks(paragraphs: &[TranscriptParagraph], base: &ChunkMetadata) -> Vec<Chunk> {
    let mut chunks: Vec<Chunk> = paragraphs
        .iter()
        .map(|p| {
            let mut metadata = base.clone().with_method(TRANSCRIPT_METHOD);
            metadata.timestamp = Some(p.timestamp.clone());
            Chunk::new(p.text.clone(), metadata)
        })
        .collect();
    finalize_positions(&mut chunks);
    chunks
}
