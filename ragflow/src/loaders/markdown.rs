//! Plain text and markdown loader.

use super::{markdown_target, DocumentLoader, LoadedDocument};
use crate::errors::StepError;
use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

/// Copies `.md`, `.markdown` and `.txt` files into the markdown directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownLoader;

#[async_trait]
impl DocumentLoader for MarkdownLoader {
    fn name(&self) -> &str {
        "markdown"
    }

    fn extensions(&self) -> &[&'static str] {
        &["md", "markdown", "txt"]
    }

    async fn load(&self, path: &Path, markdown_dir: &Path) -> Result<LoadedDocument, StepError> {
        let text = tokio::fs::read_to_string(path).await?;
        let markdown_path = markdown_target(path, markdown_dir);

        if markdown_path != path {
            tokio::fs::create_dir_all(markdown_dir).await?;
            tokio::fs::write(&markdown_path, &text).await?;
        }

        debug!(
            path = %path.display(),
            markdown = %markdown_path.display(),
            chars = text.len(),
            "Loaded text document"
        );
        Ok(LoadedDocument::new(markdown_path, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_copies_into_markdown_dir() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let source = input.path().join("guide.txt");
        std::fs::write(&source, "Line one.\n\nLine two.").unwrap();

        let markdown_dir = output.path().join("markdown");
        let loaded = MarkdownLoader.load(&source, &markdown_dir).await.unwrap();

        assert_eq!(loaded.markdown_path, markdown_dir.join("guide.md"));
        assert_eq!(loaded.text, "Line one.\n\nLine two.");
        assert_eq!(
            std::fs::read_to_string(&loaded.markdown_path).unwrap(),
            loaded.text
        );
    }

    #[tokio::test]
    async fn test_file_already_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("ready.md");
        std::fs::write(&source, "# Ready").unwrap();

        let loaded = MarkdownLoader.load(&source, dir.path()).await.unwrap();

        assert_eq!(loaded.markdown_path, source);
        assert_eq!(loaded.text, "# Ready");
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = MarkdownLoader
            .load(&dir.path().join("absent.md"), dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, StepError::Io(_)));
    }
}
