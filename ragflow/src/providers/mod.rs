//! Collaborator interfaces and reference backends.
//!
//! The pipeline only talks to these traits:
//! - [`EmbeddingModel`] turns text into vectors
//! - [`Llm`] answers a prompt
//! - [`VectorStore`] stores chunks and runs filtered similarity search
//!
//! [`InMemoryVectorStore`] and, behind the `ollama` feature, [`OllamaClient`]
//! are the bundled implementations.

mod embedding;
mod llm;
mod memory;
#[cfg(feature = "ollama")]
mod ollama;
mod vector_store;

pub use embedding::EmbeddingModel;
pub use llm::Llm;
pub use memory::InMemoryVectorStore;
#[cfg(feature = "ollama")]
pub use ollama::OllamaClient;
pub use vector_store::{ScorePolarity, ScoredChunk, VectorStore};

#[cfg(test)]
pub use llm::MockLlm;
