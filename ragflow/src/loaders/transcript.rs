//! Whisper transcript loader.

use super::{markdown_target, DocumentLoader, LoadedDocument};
use crate::chunking::transcript::{
    paragraphs_to_chunks, transcript_title, transcript_to_markdown, WhisperTranscript,
};
use crate::chunking::ChunkMetadata;
use crate::errors::StepError;
use anyhow::Context;
use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

/// Rebuilds timestamped paragraphs from Whisper `.json` output and writes
/// them as a markdown transcript.
///
/// Each paragraph becomes one chunk carrying its start time, so transcripts
/// are never re-split by the configured chunker.
#[derive(Debug, Clone, Copy, Default)]
pub struct TranscriptLoader;

#[async_trait]
impl DocumentLoader for TranscriptLoader {
    fn name(&self) -> &str {
        "transcript"
    }

    fn extensions(&self) -> &[&'static str] {
        &["json"]
    }

    async fn load(&self, path: &Path, markdown_dir: &Path) -> Result<LoadedDocument, StepError> {
        let raw = tokio::fs::read_to_string(path).await?;
        let transcript = WhisperTranscript::from_json_str(&raw)
            .with_context(|| format!("Invalid transcript JSON in {}", path.display()))?;

        let paragraphs = transcript.paragraphs();
        let text = transcript_to_markdown(&transcript_title(path), &paragraphs);
        let markdown_path = markdown_target(path, markdown_dir);

        tokio::fs::create_dir_all(markdown_dir).await?;
        tokio::fs::write(&markdown_path, &text).await?;
        let chunks = paragraphs_to_chunks(&paragraphs, &ChunkMetadata::for_path(&markdown_path));

        debug!(
            path = %path.display(),
            segments = transcript.segments.len(),
            paragraphs = paragraphs.len(),
            "Reconstructed transcript"
        );
        Ok(LoadedDocument::new(markdown_path, text).with_chunks(chunks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_writes_transcript_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("standup_result.json");
        std::fs::write(
            &source,
            r#"{"text": "Hello all. Short one.",
                "segments": [
                    {"text": " Hello all.", "start": 3.2, "end": 4.0},
                    {"text": " Short one.", "start": 4.0, "end": 5.0}
                ]}"#,
        )
        .unwrap();

        let markdown_dir = dir.path().join("md");
        let loaded = TranscriptLoader.load(&source, &markdown_dir).await.unwrap();

        assert_eq!(loaded.markdown_path, markdown_dir.join("standup_result.md"));
        assert_eq!(
            loaded.text,
            "# Transcript: standup\n\n**(Time: 00:00:03)** Hello all. Short one.\n"
        );
        assert!(loaded.markdown_path.exists());

        let chunks = loaded.chunks.unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "Hello all. Short one.");
        assert_eq!(chunks[0].metadata.timestamp.as_deref(), Some("00:00:03"));
        assert_eq!(chunks[0].metadata.chunking_method, "transcript");
        assert_eq!(
            chunks[0].metadata.source,
            loaded.markdown_path.display().to_string()
        );
    }

    #[tokio::test]
    async fn test_long_transcript_keeps_paragraph_boundaries() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("lecture.json");
        let first = format!("{}.", "a".repeat(600));
        let second = format!("{}.", "b".repeat(100));
        let raw = serde_json::json!({
            "text": "",
            "segments": [
                {"text": first, "start": 0.0, "end": 60.0},
                {"text": second, "start": 61.0, "end": 70.0}
            ]
        });
        std::fs::write(&source, raw.to_string()).unwrap();

        let loaded = TranscriptLoader.load(&source, dir.path()).await.unwrap();
        let chunks = loaded.chunks.unwrap();

        let found: Vec<(&str, Option<&str>, usize, usize)> = chunks
            .iter()
            .map(|c| {
                (
                    c.content.as_str(),
                    c.metadata.timestamp.as_deref(),
                    c.metadata.chunk_index,
                    c.metadata.total_chunks,
                )
            })
            .collect();
        assert_eq!(
            found,
            vec![
                (first.as_str(), Some("00:00:00"), 0, 2),
                (second.as_str(), Some("00:01:01"), 1, 2),
            ]
        );
    }

    #[tokio::test]
    async fn test_rejects_non_whisper_json() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("config.json");
        std::fs::write(&source, r#"{"name": "not a transcript"}"#).unwrap();

        let err = TranscriptLoader.load(&source, dir.path()).await.unwrap_err();

        assert!(matches!(err, StepError::Other(_)));
        assert!(err.to_string().contains("Invalid transcript JSON"));
    }
}
