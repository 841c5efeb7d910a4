//! # Ragflow
//!
//! Retrieval-augmented generation pipelines in Rust.
//!
//! Ragflow provides:
//!
//! - **Chunking**: recursive, character, token and markdown-aware hybrid
//!   splitting with contiguous chunk numbering
//! - **Access control**: role and tag based retrieval filters that never
//!   widen to unrestricted access by accident
//! - **Fail-fast pipelines**: ordered steps over a typed context, with step
//!   history and lifecycle events
//! - **Standard steps**: load, chunk, embed and save for ingestion; query
//!   embedding, retrieval and cited generation for questions
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ragflow::prelude::*;
//!
//! let config = RagConfig::discover(".")?;
//! let ingestion = IngestionComponents::from_config(&config, embedding.clone(), store.clone())
//!     .await?
//!     .ingestion_pipeline()?;
//! let report = ingest_batch(&ingestion, files).await;
//!
//! let query = QueryComponents::from_config(&config, embedding, store, llm)?.query_pipeline()?;
//! let ctx = answer_query(&query, "What changed in Q3?", AccessScope::role("Finance_Manager")).await?;
//! println!("{}", ctx.llm_response.unwrap_or_default());
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod access;
pub mod chunking;
pub mod components;
pub mod config;
pub mod context;
pub mod core;
pub mod errors;
pub mod events;
pub mod loaders;
pub mod observability;
pub mod pipeline;
pub mod providers;
pub mod steps;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::access::{build_access_filter, AccessFilter, AccessScope, DocumentAccess, RoleMapping};
    pub use crate::chunking::{
        build_chunker, Chunk, ChunkMetadata, Chunker, ChunkerKind, ChunkingMethod, HybridChunker,
        RuleBasedChunker,
    };
    pub use crate::components::{
        answer_query, discover_files, ingest_batch, BatchReport, IngestionComponents,
        QueryComponents,
    };
    pub use crate::config::RagConfig;
    pub use crate::context::{Citation, IngestionContext, PipelineContext, QueryContext, RunState};
    pub use crate::core::{PipelineStatus, StepKind, StepOutcome, StepRecord};
    pub use crate::errors::{
        BackendError, ConfigurationError, PipelineValidationError, RagflowError, StepError,
    };
    pub use crate::events::{EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::loaders::{DocumentLoader, LoaderRegistry};
    pub use crate::observability::init_tracing;
    pub use crate::pipeline::{FnStep, PipelineBuilder, PipelineExecutor, Step};
    pub use crate::providers::{
        EmbeddingModel, InMemoryVectorStore, Llm, ScorePolarity, ScoredChunk, VectorStore,
    };
}
