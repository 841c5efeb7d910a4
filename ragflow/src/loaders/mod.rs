//! Document loaders.
//!
//! A loader turns a source file into a markdown file under the markdown
//! directory and returns its text. A loader that understands its source's
//! structure may also return finished chunks. [`LoaderRegistry`] picks a
//! loader by file extension and is built explicitly at startup.

mod markdown;
mod transcript;

pub use markdown::MarkdownLoader;
pub use transcript::TranscriptLoader;

use crate::chunking::Chunk;
use crate::errors::StepError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Result of loading one document.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDocument {
    /// The markdown file written for the document.
    pub markdown_path: PathBuf,
    /// The markdown text.
    pub text: String,
    /// Chunks built by the loader. When set, the chunk step uses them
    /// instead of splitting `text`.
    pub chunks: Option<Vec<Chunk>>,
}

impl LoadedDocument {
    /// Creates a loaded document that the configured chunker will split.
    #[must_use]
    pub fn new(markdown_path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            markdown_path: markdown_path.into(),
            text: text.into(),
            chunks: None,
        }
    }

    /// Attaches chunks built by the loader.
    #[must_use]
    pub fn with_chunks(mut self, chunks: Vec<Chunk>) -> Self {
        self.chunks = Some(chunks);
        self
    }
}

/// Converts a source file into markdown.
#[async_trait]
pub trait DocumentLoader: Send + Sync + Debug {
    /// Returns the loader name for logging.
    fn name(&self) -> &str;

    /// Returns the lowercase file extensions this loader handles, without dots.
    fn extensions(&self) -> &[&'static str];

    /// Loads `path` and writes its markdown into `markdown_dir`.
    async fn load(&self, path: &Path, markdown_dir: &Path) -> Result<LoadedDocument, StepError>;
}

/// Maps file extensions to loaders.
#[derive(Debug, Clone, Default)]
pub struct LoaderRegistry {
    loaders: HashMap<String, Arc<dyn DocumentLoader>>,
}

impl LoaderRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the bundled markdown and transcript loaders.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new()
            .with_loader(Arc::new(MarkdownLoader))
            .with_loader(Arc::new(TranscriptLoader))
    }

    /// Registers a loader for all of its extensions. A later loader replaces
    /// an earlier one for the same extension.
    #[must_use]
    pub fn with_loader(mut self, loader: Arc<dyn DocumentLoader>) -> Self {
        for extension in loader.extensions() {
            self.loaders
                .insert((*extension).to_string(), Arc::clone(&loader));
        }
        self
    }

    /// Returns the loader for `path`'s extension.
    #[must_use]
    pub fn for_path(&self, path: &Path) -> Option<Arc<dyn DocumentLoader>> {
        let extension = path.extension()?.to_string_lossy().to_ascii_lowercase();
        self.loaders.get(&extension).cloned()
    }

    /// Returns the registered extensions, sorted.
    #[must_use]
    pub fn extensions(&self) -> Vec<&str> {
        let mut extensions: Vec<&str> = self.loaders.keys().map(String::as_str).collect();
        extensions.sort_unstable();
        extensions
    }
}

/// Returns `markdown_dir/<stem>.md` for a source file.
pub(crate) fn markdown_target(path: &Path, markdown_dir: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map_or_else(|| "document".to_string(), |s| s.to_string_lossy().into_owned());
    markdown_dir.join(format!("{stem}.md"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_cover_markdown_and_transcripts() {
        let registry = LoaderRegistry::with_defaults();

        assert_eq!(registry.extensions(), vec!["json", "markdown", "md", "txt"]);
        assert_eq!(
            registry.for_path(Path::new("notes/README.MD")).unwrap().name(),
            "markdown"
        );
        assert_eq!(
            registry.for_path(Path::new("talk_result.json")).unwrap().name(),
            "transcript"
        );
    }

    #[test]
    fn test_unknown_extension() {
        let registry = LoaderRegistry::with_defaults();
        assert!(registry.for_path(Path::new("scan.pdf")).is_none());
        assert!(registry.for_path(Path::new("Makefile")).is_none());
        assert!(LoaderRegistry::new().for_path(Path::new("a.md")).is_none());
    }

    #[test]
    fn test_markdown_target() {
        assert_eq!(
            markdown_target(Path::new("in/report.txt"), Path::new("out")),
            PathBuf::from("out/report.md")
        );
    }
}
