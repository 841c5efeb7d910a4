//! Ready-made ingestion and query pipelines.
//!
//! This module provides:
//! - [`IngestionComponents`] and [`QueryComponents`]: the collaborators of
//!   each pipeline, built from a [`RagConfig`]
//! - [`ingest_batch`]: runs ingestion over many files and reports per file
//! - [`answer_query`]: runs one question through the query pipeline
//! - [`discover_files`]: lists the files a loader registry can ingest

mod batch;


pub use batch::{answer_query, discover_files, ingest_batch, BatchReport, FileReport};

use crate::access::RoleMapping;
use crate::chunking::{build_chunker, Chunker};
use crate::config::RagConfig;
use crate::context::{IngestionContext, QueryContext};
use crate::errors::{ConfigurationError, PipelineValidationError};
use crate::events::{EventSink, NoOpEventSink};
use crate::loaders::LoaderRegistry;
use crate::pipeline::{PipelineBuilder, PipelineExecutor, Step};
use crate::providers::{EmbeddingModel, Llm, VectorStore};
use crate::steps::{
    ChunkStep, EmbeddingGenerationStep, GenerationStep, LoadStep, QueryEmbeddingStep,
    RetrieveStep, SaveStep,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Name of the pipeline built by [`IngestionComponents::ingestion_pipeline`].
pub const INGESTION_PIPELINE: &str = "ingestion";
/// Name of the pipeline built by [`QueryComponents::query_pipeline`].
pub const QUERY_PIPELINE: &str = "query";

/// Collaborators of the Load → Chunk → EmbeddingGeneration → Save pipeline.
#[derive(Debug, Clone)]
pub struct IngestionComponents {
    loaders: LoaderRegistry,
    chunker: Arc<dyn Chunker>,
    embedding: Arc<dyn EmbeddingModel>,
    store: Arc<dyn VectorStore>,
    markdown_dir: PathBuf,
    batch_size: usize,
    sink: Arc<dyn EventSink>,
}

impl IngestionComponents {
    /// Builds the components from configuration.
    ///
    /// The chunker is selected by `config.chunking`; hybrid token counts are
    /// approximated. Use [`Self::with_chunker`] to supply a chunker backed
    /// by a tokenizer.
    pub async fn from_config(
        config: &RagConfig,
        embedding: Arc<dyn EmbeddingModel>,
        store: Arc<dyn VectorStore>,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let chunker = build_chunker(&config.chunking, None).await?;
        Ok(Self {
            loaders: LoaderRegistry::with_defaults(),
            chunker,
            embedding,
            store,
            markdown_dir: config.paths.markdown_dir.clone(),
            batch_size: config.embedding.batch_size,
            sink: Arc::new(NoOpEventSink),
        })
    }

    /// Replaces the chunker.
    #[must_use]
    pub fn with_chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = chunker;
        self
    }

    /// Replaces the loader registry.
    #[must_use]
    pub fn with_loaders(mut self, loaders: LoaderRegistry) -> Self {
        self.loaders = loaders;
        self
    }

    /// Sets the event sink of built pipelines.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Returns the loader registry.
    #[must_use]
    pub fn loaders(&self) -> &LoaderRegistry {
        &self.loaders
    }

    /// Returns the vector store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    /// Assembles the standard ingestion pipeline.
    pub fn ingestion_pipeline(
        &self,
    ) -> Result<PipelineExecutor<IngestionContext>, PipelineValidationError> {
        let steps: Vec<Arc<dyn Step<IngestionContext>>> = vec![
            Arc::new(LoadStep::new(self.loaders.clone(), self.markdown_dir.clone())),
            Arc::new(ChunkStep::new(Arc::clone(&self.chunker))),
            Arc::new(EmbeddingGenerationStep::new(
                Arc::clone(&self.embedding),
                self.batch_size,
            )),
            Arc::new(SaveStep::new(Arc::clone(&self.store))),
        ];
        PipelineBuilder::new(INGESTION_PIPELINE)
            .steps(steps)
            .event_sink(Arc::clone(&self.sink))
            .build()
    }
}

/// Collaborators of the QueryEmbedding → Retrieve → Generation pipeline.
#[derive(Debug, Clone)]
pub struct QueryComponents {
    embedding: Arc<dyn EmbeddingModel>,
    store: Arc<dyn VectorStore>,
    llm: Arc<dyn Llm>,
    role_mapping: Arc<RoleMapping>,
    k: usize,
    max_context_chars: usize,
    sink: Arc<dyn EventSink>,
}

impl QueryComponents {
    /// Builds the components from configuration, loading the role mapping
    /// from `config.retrieval.role_mapping_path`.
    pub fn from_config(
        config: &RagConfig,
        embedding: Arc<dyn EmbeddingModel>,
        store: Arc<dyn VectorStore>,
        llm: Arc<dyn Llm>,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let role_mapping = RoleMapping::load(&config.retrieval.role_mapping_path)?;
        Ok(Self {
            embedding,
            store,
            llm,
            role_mapping: Arc::new(role_mapping),
            k: config.retrieval.k,
            max_context_chars: config.generation.max_context_chars,
            sink: Arc::new(NoOpEventSink),
        })
    }

    /// Replaces the role mapping.
    #[must_use]
    pub fn with_role_mapping(mut self, role_mapping: RoleMapping) -> Self {
        self.role_mapping = Arc::new(role_mapping);
        self
    }

    /// Sets the event sink of built pipelines.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Returns the role mapping.
    #[must_use]
    pub fn role_mapping(&self) -> &RoleMapping {
        &self.role_mapping
    }

    /// Assembles the standard query pipeline.
    pub fn query_pipeline(
        &self,
    ) -> Result<PipelineExecutor<QueryContext>, PipelineValidationError> {
        let steps: Vec<Arc<dyn Step<QueryContext>>> = vec![
            Arc::new(QueryEmbeddingStep::new(Arc::clone(&self.embedding))),
            Arc::new(RetrieveStep::new(
                Arc::clone(&self.store),
                Arc::clone(&self.role_mapping),
                self.k,
            )),
            Arc::new(
                GenerationStep::new(Arc::clone(&self.llm))
                    .with_max_context_chars(self.max_context_chars),
            ),
        ];
        PipelineBuilder::new(QUERY_PIPELINE)
            .steps(steps)
            .event_sink(Arc::clone(&self.sink))
            .build()
    }
}
