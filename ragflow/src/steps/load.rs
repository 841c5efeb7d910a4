//! Load step.

use crate::context::IngestionContext;
use crate::core::{StepKind, StepOutcome};
use crate::errors::StepError;
use crate::loaders::LoaderRegistry;
use crate::pipeline::Step;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;

/// Converts the source file to markdown with the loader registered for its
/// extension.
#[derive(Debug, Clone)]
pub struct LoadStep {
    loaders: LoaderRegistry,
    markdown_dir: PathBuf,
}

impl LoadStep {
    /// Creates a load step writing markdown into `markdown_dir`.
    #[must_use]
    pub fn new(loaders: LoaderRegistry, markdown_dir: impl Into<PathBuf>) -> Self {
        Self {
            loaders,
            markdown_dir: markdown_dir.into(),
        }
    }
}

#[async_trait]
impl Step<IngestionContext> for LoadStep {
    fn name(&self) -> &str {
        "load"
    }

    fn kind(&self) -> StepKind {
        StepKind::Load
    }

    async fn run(&self, ctx: &mut IngestionContext) -> Result<StepOutcome, StepError> {
        let Some(loader) = self.loaders.for_path(&ctx.file_path) else {
            return Ok(StepOutcome::fail(format!(
                "Unsupported file type: {}",
                ctx.file_path.display()
            )));
        };

        info!(path = %ctx.file_path.display(), loader = loader.name(), "Loading document");
        let loaded = loader.load(&ctx.file_path, &self.markdown_dir).await?;

        info!(markdown = %loaded.markdown_path.display(), "Markdown saved");
        ctx.markdown_path = Some(loaded.markdown_path);
        ctx.raw_text = Some(loaded.text);
        ctx.loaded_chunks = loaded.chunks;
        Ok(StepOutcome::Continue)
    }
}
