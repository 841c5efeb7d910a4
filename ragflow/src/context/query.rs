//! State of one question-answering run.

use super::{PipelineContext, RunState};
use crate::access::{AccessFilter, AccessScope};
use crate::providers::{ScorePolarity, ScoredChunk};
use serde::{Deserialize, Serialize};

/// A numbered reference from the answer back to a retrieved chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    /// 1-based number used in the prompt (`[1]`, `[2]`, ...).
    pub id: usize,
    /// Source of the cited chunk.
    pub source: String,
    /// Page of the cited chunk, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<serde_json::Value>,
    /// Retrieval score as reported by the store.
    pub score: f32,
}

/// Context threaded through QueryEmbedding, Retrieve and Generation.
#[derive(Debug, Clone)]
pub struct QueryContext {
    state: RunState,
    /// The question.
    pub user_query: String,
    /// Who is asking.
    pub scope: AccessScope,
    /// Embedding of the question.
    pub query_vector: Option<Vec<f32>>,
    /// Filter used for retrieval, kept for auditing.
    pub access_filter: Option<AccessFilter>,
    /// Retrieved chunks in the store's order.
    pub retrieved_docs: Vec<ScoredChunk>,
    /// How to read the scores in `retrieved_docs`.
    pub score_polarity: Option<ScorePolarity>,
    /// Prompt sent to the LLM.
    pub prompt: Option<String>,
    /// LLM answer.
    pub llm_response: Option<String>,
    /// Citations for the context blocks in the prompt.
    pub citations: Option<Vec<Citation>>,
}

impl QueryContext {
    /// Creates a context for a question asked within a scope.
    #[must_use]
    pub fn new(user_query: impl Into<String>, scope: AccessScope) -> Self {
        Self {
            state: RunState::new(),
            user_query: user_query.into(),
            scope,
            query_vector: None,
            access_filter: None,
            retrieved_docs: Vec::new(),
            score_polarity: None,
            prompt: None,
            llm_response: None,
            citations: None,
        }
    }

    /// Returns the citations the answer actually references.
    #[must_use]
    pub fn cited(&self) -> Vec<&Citation> {
        let (Some(answer), Some(citations)) = (&self.llm_response, &self.citations) else {
            return Vec::new();
        };
        let referenced = crate::steps::referenced_citation_ids(answer);
        citations
            .iter()
            .filter(|c| referenced.contains(&c.id))
            .collect()
    }
}

impl PipelineContext for QueryContext {
    fn state(&self) -> &RunState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut RunState {
        &mut self.state
    }
}
