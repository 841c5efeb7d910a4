//! Batch ingestion and single-query helpers.

use crate::access::AccessScope;
use crate::context::{IngestionContext, PipelineContext, QueryContext};
use crate::core::PipelineStatus;
use crate::errors::StepError;
use crate::loaders::LoaderRegistry;
use crate::pipeline::PipelineExecutor;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Outcome of ingesting one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    /// The ingested file.
    pub path: PathBuf,
    /// Final pipeline status.
    pub status: PipelineStatus,
    /// Number of chunks stored.
    pub chunks: usize,
    /// Failure message, when the run failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    fn from_context(ctx: &IngestionContext) -> Self {
        Self {
            path: ctx.file_path.clone(),
            status: ctx.status(),
            chunks: ctx.stored_ids.len(),
            error: ctx.error().map(str::to_string),
        }
    }
}

/// Per-file results of [`ingest_batch`], in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// One report per file.
    pub files: Vec<FileReport>,
}

impl BatchReport {
    /// Returns the number of files processed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.files.len()
    }

    /// Returns the number of files ingested successfully.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.files.iter().filter(|f| f.status.is_success()).count()
    }

    /// Returns the number of files that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    /// Returns the failed files.
    pub fn failures(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|f| !f.status.is_success())
    }

    /// Returns the total number of chunks stored.
    #[must_use]
    pub fn chunks(&self) -> usize {
        self.files.iter().map(|f| f.chunks).sum()
    }

    /// Returns true if every file was ingested.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

/// Ingests files one after another.
///
/// Each file gets its own context. A failing file is recorded in the report
/// and the batch moves on to the next one.
pub async fn ingest_batch<I>(pipeline: &PipelineExecutor<IngestionContext>, files: I) -> BatchReport
where
    I: IntoIterator,
    I::Item: Into<IngestionContext>,
{
    let mut report = BatchReport::default();
    for file in files {
        let mut ctx: IngestionContext = file.into();
        if let Err(err) = pipeline.execute(&mut ctx).await {
            warn!(path = %ctx.file_path.display(), error = %err, "Ingestion failed");
        } else if let Some(error) = ctx.error() {
            warn!(path = %ctx.file_path.display(), error = %error, "Ingestion stopped");
        }
        report.files.push(FileReport::from_context(&ctx));
    }

    info!(
        total = report.total(),
        succeeded = report.succeeded(),
        failed = report.failed(),
        chunks = report.chunks(),
        "Batch ingestion finished"
    );
    report
}

/// Answers one question.
///
/// Returns the completed context. A run that fails, whether from a step
/// error or an unmet precondition, is returned as an error carrying the
/// recorded message.
pub async fn answer_query(
    pipeline: &PipelineExecutor<QueryContext>,
    query: impl Into<String>,
    scope: AccessScope,
) -> Result<QueryContext, StepError> {
    let mut ctx = QueryContext::new(query, scope);
    pipeline.execute(&mut ctx).await?;

    if ctx.status() == PipelineStatus::Failed {
        return Err(StepError::msg(ctx.error().unwrap_or("Query failed")));
    }
    Ok(ctx)
}

/// Lists the files in `dir` that `loaders` can ingest, sorted by path.
///
/// Subdirectories are not descended into.
pub async fn discover_files(dir: &Path, loaders: &LoaderRegistry) -> std::io::Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if entry.file_type().await?.is_file() && loaders.for_path(&path).is_some() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
