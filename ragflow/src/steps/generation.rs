//! Answer generation step.

use crate::context::{Citation, QueryContext};
use crate::core::{StepKind, StepOutcome};
use crate::errors::StepError;
use crate::pipeline::Step;
use crate::providers::{Llm, ScoredChunk};
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::{Arc, LazyLock};
use tracing::{info, warn};

/// Default ceiling on the context injected into the prompt, in characters.
pub const DEFAULT_MAX_CONTEXT_CHARS: usize = 12_000;

/// Appended to context cut at the ceiling.
pub const TRUNCATION_MARKER: &str = "\n\n[TRUNCATED]\n";

const BLOCK_SEPARATOR: &str = "\n\n---\n\n";
const UNKNOWN_FIELD: &str = "n/a";

#[allow(clippy::expect_used)]
static CITATION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\d+)\]").expect("citation pattern is valid"));

/// Returns the citation numbers (`[1]`, `[2]`, ...) an answer refers to.
#[must_use]
pub fn referenced_citation_ids(answer: &str) -> HashSet<usize> {
    CITATION_PATTERN
        .captures_iter(answer)
        .filter_map(|c| c[1].parse().ok())
        .collect()
}

/// Renders retrieved chunks as numbered context blocks and the matching
/// citations. Numbering starts at 1 and follows retrieval order.
#[must_use]
pub fn build_context_blocks(docs: &[ScoredChunk]) -> (String, Vec<Citation>) {
    let mut blocks = Vec::with_capacity(docs.len());
    let mut citations = Vec::with_capacity(docs.len());

    for (i, doc) in docs.iter().enumerate() {
        let id = i + 1;
        let metadata = &doc.chunk.metadata;
        let source = if metadata.source.is_empty() {
            metadata.file_name.clone().unwrap_or_default()
        } else {
            metadata.source.clone()
        };
        let page = doc
            .chunk
            .page()
            .or_else(|| metadata.extra.get("page_number"))
            .cloned();

        blocks.push(format!(
            "[{id}] SOURCE={} PAGE={} SCORE={}\n{}",
            if source.is_empty() { UNKNOWN_FIELD } else { source.as_str() },
            page.as_ref().map_or_else(|| UNKNOWN_FIELD.to_string(), render_value),
            doc.score,
            doc.chunk.content
        ));
        citations.push(Citation {
            id,
            source,
            page,
            score: doc.score,
        });
    }

    (blocks.join(BLOCK_SEPARATOR), citations)
}

/// Cuts `context` to `max_chars` characters and appends [`TRUNCATION_MARKER`]
/// when it is longer.
#[must_use]
pub fn truncate_context(context: String, max_chars: usize) -> String {
    match context.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{TRUNCATION_MARKER}", &context[..cut]),
        None => context,
    }
}

/// Builds the grounded prompt.
#[must_use]
pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "You are a document assistant.\n\
         Answer the user's question using ONLY the provided context.\n\
         If the answer is not in the context, say \"I don't know based on the provided documents.\"\n\
         \n\
         Rules:\n\
         - Be concise and technical when appropriate.\n\
         - Include citations like [1], [2] referring to the context blocks.\n\
         - Do not invent sources.\n\
         \n\
         Context:\n\
         {context}\n\
         \n\
         Question:\n\
         {question}\n\
         \n\
         Answer:"
    )
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Builds a cited prompt from the retrieved chunks and asks the LLM.
#[derive(Debug, Clone)]
pub struct GenerationStep {
    llm: Arc<dyn Llm>,
    max_context_chars: usize,
}

impl GenerationStep {
    /// Creates the step with the default context ceiling.
    #[must_use]
    pub fn new(llm: Arc<dyn Llm>) -> Self {
        Self {
            llm,
            max_context_chars: DEFAULT_MAX_CONTEXT_CHARS,
        }
    }

    /// Sets the context ceiling in characters.
    #[must_use]
    pub fn with_max_context_chars(mut self, max_context_chars: usize) -> Self {
        self.max_context_chars = max_context_chars;
        self
    }
}

#[async_trait]
impl Step<QueryContext> for GenerationStep {
    fn name(&self) -> &str {
        "generation"
    }

    fn kind(&self) -> StepKind {
        StepKind::Generation
    }

    async fn run(&self, ctx: &mut QueryContext) -> Result<StepOutcome, StepError> {
        if ctx.retrieved_docs.is_empty() {
            return Ok(StepOutcome::fail(
                "No retrieved docs available. Retrieve step must run first.",
            ));
        }

        let (blocks, citations) = build_context_blocks(&ctx.retrieved_docs);
        let full_len = blocks.chars().count();
        let context = truncate_context(blocks, self.max_context_chars);
        if full_len > self.max_context_chars {
            warn!(
                context_chars = full_len,
                max_context_chars = self.max_context_chars,
                "Context truncated"
            );
        }

        let prompt = build_prompt(&context, &ctx.user_query);
        ctx.prompt = Some(prompt.clone());
        ctx.citations = Some(citations);

        let answer = self
            .llm
            .generate(&prompt)
            .await
            .map_err(StepError::Generation)?;
        info!(answer_chars = answer.len(), "Generated answer");
        ctx.llm_response = Some(answer);
        Ok(StepOutcome::Continue)
    }
}
