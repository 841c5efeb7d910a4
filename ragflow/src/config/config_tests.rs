//! Tests for configuration loading.

#[cfg(test)]
mod tests {
    use crate::chunking::{ChunkerKind, ChunkingMethod};
    use crate::config::{ChunkingConfig, RagConfig};
    use crate::errors::ConfigurationError;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    #[test]
    fn test_defaults() {
        let config = RagConfig::default();
        assert_eq!(config.chunking.chunker, ChunkerKind::RuleBased);
        assert_eq!(config.chunking.chunk_size, 1000);
        assert_eq!(config.chunking.chunk_overlap, 200);
        assert_eq!(config.chunking.method, ChunkingMethod::Recursive);
        assert_eq!(config.chunking.max_tokens, 2000);
        assert_eq!(config.retrieval.k, 5);
        assert_eq!(config.generation.max_context_chars, 12_000);
        assert_eq!(config.vector_store.collection_name, "rag_collection");
        assert_eq!(config.paths.markdown_dir, PathBuf::from("./data/markdown"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(RagConfig::from_yaml_str("").unwrap(), RagConfig::default());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = RagConfig::from_yaml_str(
            r"
chunking:
  chunker: hybrid
  max_tokens: 512
  merge_peers: true
retrieval:
  k: 8
logging:
  level: debug
  json: true
",
        )
        .unwrap();

        assert_eq!(config.chunking.chunker, ChunkerKind::Hybrid);
        assert_eq!(config.chunking.max_tokens, 512);
        assert!(config.chunking.merge_peers);
        assert_eq!(config.chunking.chunk_size, 1000);
        assert_eq!(config.retrieval.k, 8);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn test_overlap_not_less_than_size_is_rejected() {
        let err = RagConfig::from_yaml_str("chunking:\n  chunk_size: 100\n  chunk_overlap: 100\n")
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::InvalidOverlap {
                chunk_overlap: 100,
                chunk_size: 100
            }
        ));
    }

    #[test]
    fn test_unknown_method_is_parse_error() {
        let err = RagConfig::from_yaml_str("chunking:\n  method: sentence\n").unwrap_err();
        match err {
            ConfigurationError::Parse { message, .. } => {
                assert!(message.contains("Unknown chunking method 'sentence'"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_zero_k_is_rejected() {
        let err = RagConfig::from_yaml_str("retrieval:\n  k: 0\n").unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidValue { .. }));
    }

    #[test]
    fn test_hybrid_zero_max_tokens_is_rejected() {
        let err = ChunkingConfig::hybrid(0, false).validate().unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidMaxTokens { max_tokens: 0 }));
    }

    #[test]
    fn test_from_file_requires_yaml_extension() {
        let err = RagConfig::from_file("settings.toml").unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidValue { .. }));
    }

    #[test]
    fn test_discover() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(RagConfig::discover(dir.path()).unwrap(), RagConfig::default());

        std::fs::write(dir.path().join("config.yml"), "retrieval:\n  k: 3\n").unwrap();
        let config = RagConfig::discover(dir.path()).unwrap();
        assert_eq!(config.retrieval.k, 3);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = RagConfig::from_file(dir.path().join("config.yaml")).unwrap_err();
        assert!(matches!(err, ConfigurationError::ReadFile { .. }));
    }

    #[test]
    fn test_invalid_log_level_is_rejected() {
        let err = RagConfig::from_yaml_str("logging:\n  level: \"ragflow=loud\"\n").unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidValue { .. }));
    }
}
