//! Configuration loading.
//!
//! [`RagConfig`] is read from YAML and handed explicitly to the components
//! that need it; nothing is cached globally.

mod sections;

#[cfg(test)]
mod config_tests;

pub use sections::{
    ChunkingConfig, EmbeddingConfig, GenerationConfig, LoggingConfig, OllamaConfig, PathsConfig,
    RetrievalConfig, VectorStoreConfig,
};

use crate::errors::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File names [`RagConfig::discover`] looks for.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["config.yaml", "config.yml"];

/// Complete ragflow configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RagConfig {
    /// Chunking parameters.
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Embedding parameters.
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    /// Vector store parameters.
    #[serde(default)]
    pub vector_store: VectorStoreConfig,
    /// Retrieval parameters.
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// Answer generation parameters.
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Filesystem locations.
    #[serde(default)]
    pub paths: PathsConfig,
    /// Logging parameters.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Ollama server settings.
    #[serde(default)]
    pub ollama: OllamaConfig,
}

impl RagConfig {
    /// Loads and validates a YAML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
        if !is_yaml {
            return Err(ConfigurationError::invalid(
                "config_path",
                format!("expected a .yaml or .yml file, got {}", path.display()),
            ));
        }

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigurationError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&raw, path)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parses and validates YAML text.
    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigurationError> {
        Self::parse(raw, Path::new("<inline>"))
    }

    /// Loads `config.yaml` or `config.yml` from `dir`, or defaults if
    /// neither exists.
    pub fn discover(dir: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        match Self::find_file(dir.as_ref()) {
            Some(path) => Self::from_file(path),
            None => {
                debug!(dir = %dir.as_ref().display(), "No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Returns the first configuration file present in `dir`.
    #[must_use]
    pub fn find_file(dir: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    /// Checks cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.chunking.validate()?;
        crate::observability::parse_filter(&self.logging.level)?;
        if self.embedding.batch_size == 0 {
            return Err(ConfigurationError::invalid("embedding.batch_size", "must be greater than 0"));
        }
        if self.retrieval.k == 0 {
            return Err(ConfigurationError::invalid("retrieval.k", "must be greater than 0"));
        }
        if self.generation.max_context_chars == 0 {
            return Err(ConfigurationError::invalid(
                "generation.max_context_chars",
                "must be greater than 0",
            ));
        }
        Ok(())
    }

    /// Sets the chunking section.
    #[must_use]
    pub fn with_chunking(mut self, chunking: ChunkingConfig) -> Self {
        self.chunking = chunking;
        self
    }

    /// Sets the markdown output directory.
    #[must_use]
    pub fn with_markdown_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.paths.markdown_dir = dir.into();
        self
    }

    fn parse(raw: &str, origin: &Path) -> Result<Self, ConfigurationError> {
        let config: Self = if raw.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(raw).map_err(|e| ConfigurationError::Parse {
                path: origin.to_path_buf(),
                message: e.to_string(),
            })?
        };
        config.validate()?;
        Ok(config)
    }
}
