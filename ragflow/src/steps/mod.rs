//! The standard ingestion and query steps.
//!
//! Ingestion runs [`LoadStep`] → [`ChunkStep`] → [`EmbeddingGenerationStep`]
//! → [`SaveStep`] over an [`IngestionContext`](crate::context::IngestionContext).
//! Queries run [`QueryEmbeddingStep`] → [`RetrieveStep`] → [`GenerationStep`]
//! over a [`QueryContext`](crate::context::QueryContext).
//!
//! Each step checks that its upstream input is present and fails the run
//! with a message naming the missing step otherwise. Collaborator errors are
//! returned as [`StepError`](crate::errors::StepError).

mod chunk;
mod embed;
mod generation;
mod load;
mod query_embedding;
mod retrieve;
mod save;


pub use chunk::ChunkStep;
pub use embed::EmbeddingGenerationStep;
pub use generation::{
    build_context_blocks, build_prompt, referenced_citation_ids, truncate_context,
    GenerationStep, DEFAULT_MAX_CONTEXT_CHARS, TRUNCATION_MARKER,
};
pub use load::LoadStep;
pub use query_embedding::QueryEmbeddingStep;
pub use retrieve::RetrieveStep;
pub use save::{chunk_id, SaveStep};
