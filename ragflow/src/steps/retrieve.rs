//! Retrieve step.

use crate::access::{build_access_filter, AccessScope, RoleMapping};
use crate::context::QueryContext;
use crate::core::{StepKind, StepOutcome};
use crate::errors::StepError;
use crate::pipeline::Step;
use crate::providers::VectorStore;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Runs the access-filtered similarity search for the query vector.
///
/// Unrestricted retrieval only happens for [`AccessScope::Unrestricted`] and
/// is logged. A user scope that yields no filter fails the run.
#[derive(Debug, Clone)]
pub struct RetrieveStep {
    store: Arc<dyn VectorStore>,
    role_mapping: Arc<RoleMapping>,
    k: usize,
}

impl RetrieveStep {
    /// Creates the step returning up to `k` chunks.
    #[must_use]
    pub fn new(store: Arc<dyn VectorStore>, role_mapping: Arc<RoleMapping>, k: usize) -> Self {
        Self {
            store,
            role_mapping,
            k,
        }
    }
}

#[async_trait]
impl Step<QueryContext> for RetrieveStep {
    fn name(&self) -> &str {
        "retrieve"
    }

    fn kind(&self) -> StepKind {
        StepKind::Retrieve
    }

    async fn run(&self, ctx: &mut QueryContext) -> Result<StepOutcome, StepError> {
        let Some(vector) = ctx.query_vector.as_deref() else {
            return Ok(StepOutcome::fail(
                "Query vector not set. Query embedding step must run first.",
            ));
        };

        let filter = match &ctx.scope {
            AccessScope::Unrestricted => {
                info!(audit = true, k = self.k, "Unrestricted retrieval requested");
                None
            }
            AccessScope::User { role, tags } => {
                let filter = build_access_filter(role.as_deref(), tags, &self.role_mapping);
                if filter.is_none() {
                    return Ok(StepOutcome::fail(
                        "Access scope has neither a role nor tags. Use an unrestricted scope for administrative queries.",
                    ));
                }
                filter
            }
        };
        debug!(filter = ?filter, "Built access filter");

        let results = self
            .store
            .similarity_search_with_score(vector, self.k, filter.as_ref())
            .await?;

        info!(
            retrieved = results.len(),
            polarity = %self.store.score_polarity(),
            "Retrieved documents"
        );
        ctx.retrieved_docs = results;
        ctx.access_filter = filter;
        ctx.score_polarity = Some(self.store.score_polarity());
        Ok(StepOutcome::Continue)
    }
}
