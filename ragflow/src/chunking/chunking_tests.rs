//! Tests across chunkers.

#[cfg(test)]
mod tests {
    use crate::chunking::{
        approximate_tokens, build_chunker, Chunk, ChunkMetadata, Chunker, ChunkingMethod,
        HybridChunker, MockTokenCountApi, RuleBasedChunker, TokenCounter,
    };
    use crate::config::ChunkingConfig;
    use crate::errors::{BackendError, ConfigurationError};
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use std::sync::Arc;

    const PROSE: &str = "# Policy\n\nEmployees may work remotely two days a week. \
        Requests go through the team lead.\n\n## Equipment\n\nLaptops are issued on the first day. \
        Monitors can be requested from facilities.\n\n- docking station\n- headset\n\n\
        # Travel\n\nBook travel through the portal at least two weeks ahead.";

    fn positions(chunks: &[Chunk]) -> Vec<(usize, usize)> {
        chunks
            .iter()
            .map(|c| (c.metadata.chunk_index, c.metadata.total_chunks))
            .collect()
    }

    #[tokio::test]
    async fn test_rule_based_is_idempotent() {
        for method in [
            ChunkingMethod::Recursive,
            ChunkingMethod::Character,
            ChunkingMethod::Token,
        ] {
            let (size, overlap) = if method == ChunkingMethod::Token { (8, 2) } else { (60, 15) };
            let chunker = RuleBasedChunker::new(size, overlap, method).unwrap();
            let base = ChunkMetadata::new("policy.md");

            let first = chunker.chunk_text(PROSE, &base).await;
            let second = chunker.chunk_text(PROSE, &base).await;

            assert!(!first.is_empty(), "{method} produced nothing");
            assert_eq!(first, second);
        }
    }

    #[tokio::test]
    async fn test_hybrid_is_idempotent() {
        let chunker = HybridChunker::new(12, true, TokenCounter::approximate()).unwrap();
        let base = ChunkMetadata::new("policy.md");

        let first = chunker.chunk_text(PROSE, &base).await;
        let second = chunker.chunk_text(PROSE, &base).await;

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_hybrid_every_chunk_fits_ceiling() {
        for max_tokens in [3, 8, 20, 200] {
            let chunker = HybridChunker::new(max_tokens, false, TokenCounter::approximate()).unwrap();
            let chunks = chunker.chunk_text(PROSE, &ChunkMetadata::new("policy.md")).await;

            assert!(!chunks.is_empty());
            for chunk in &chunks {
                assert!(
                    approximate_tokens(&chunk.content) <= max_tokens,
                    "{max_tokens}: {:?}",
                    chunk.content
                );
            }
        }
    }

    #[tokio::test]
    async fn test_positions_are_contiguous_after_overflow_split() {
        let chunker = HybridChunker::new(5, false, TokenCounter::approximate()).unwrap();
        let chunks = chunker.chunk_text(PROSE, &ChunkMetadata::new("policy.md")).await;
        let total = chunks.len();

        let expected: Vec<(usize, usize)> = (0..total).map(|i| (i, total)).collect();
        assert_eq!(positions(&chunks), expected);
    }

    #[tokio::test]
    async fn test_blank_input_is_not_an_error() {
        let rule_based = RuleBasedChunker::new(10, 0, ChunkingMethod::Token).unwrap();
        let hybrid = HybridChunker::new(10, true, TokenCounter::approximate()).unwrap();
        let base = ChunkMetadata::new("empty.md");

        assert!(rule_based.chunk_text(" \n\t ", &base).await.is_empty());
        assert!(hybrid.chunk_text("", &base).await.is_empty());
    }

    #[tokio::test]
    async fn test_build_chunker_dispatches_on_kind() {
        let rule_based = build_chunker(&ChunkingConfig::default(), None).await.unwrap();
        assert_eq!(rule_based.name(), "rule_based");

        let hybrid = build_chunker(&ChunkingConfig::hybrid(100, true), None).await.unwrap();
        assert_eq!(hybrid.name(), "hybrid");
    }

    #[tokio::test]
    async fn test_build_chunker_rejects_bad_parameters() {
        let err = build_chunker(&ChunkingConfig::rule_based(100, 100, ChunkingMethod::Recursive), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidOverlap { .. }));

        let err = build_chunker(&ChunkingConfig::hybrid(0, false), None).await.unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidMaxTokens { max_tokens: 0 }));
    }

    #[tokio::test]
    async fn test_build_chunker_survives_tokenizer_outage() {
        let mut api = MockTokenCountApi::new();
        api.expect_count_tokens()
            .returning(|_, _| Err(BackendError::new("tokenizer", "unreachable")));

        let chunker = build_chunker(&ChunkingConfig::hybrid(50, false), Some(Arc::new(api)))
            .await
            .unwrap();
        let chunks = chunker.chunk_text(PROSE, &ChunkMetadata::new("policy.md")).await;

        assert!(!chunks.is_empty());
    }

    #[tokio::test]
    async fn test_chunk_documents_numbers_combined_output() {
        let chunker = RuleBasedChunker::new(3, 0, ChunkingMethod::Token).unwrap();
        let documents = vec![
            Chunk::new("one two three four", ChunkMetadata::new("a.md")),
            Chunk::new("five six", ChunkMetadata::new("b.md")),
        ];

        let chunks = chunker.chunk_documents(&documents).await;

        assert_eq!(positions(&chunks), vec![(0, 3), (1, 3), (2, 3)]);
        let sources: Vec<&str> = chunks.iter().map(|c| c.metadata.source.as_str()).collect();
        assert_eq!(sources, vec!["a.md", "a.md", "b.md"]);
    }

    #[tokio::test]
    async fn test_chunk_markdown_file() {
        let mut file = tempfile::Builder::new().suffix(".md").tempfile().unwrap();
        write!(file, "Alpha paragraph.\n\nBeta paragraph.").unwrap();

        let chunker = RuleBasedChunker::new(20, 0, ChunkingMethod::Character).unwrap();
        let chunks = chunker.chunk_markdown_file(file.path()).await.unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].metadata.source, file.path().display().to_string());
        assert!(chunks[0].metadata.file_name.as_deref().unwrap().ends_with(".md"));
    }

    #[tokio::test]
    async fn test_chunk_missing_file_is_io_error() {
        let chunker = RuleBasedChunker::new(20, 0, ChunkingMethod::Character).unwrap();
        let result = chunker
            .chunk_markdown_file(std::path::Path::new("/nonexistent/doc.md"))
            .await;
        assert!(result.is_err());
    }
}
