//! Comprehensive tests for context module.

#[cfg(test)]
mod tests {
    use crate::access::{AccessScope, DocumentAccess};
    use crate::context::{IngestionContext, PipelineContext, QueryContext, RunState};
    use crate::core::{PipelineStatus, StepKind, StepRecord};
    use chrono::Utc;

    #[test]
    fn test_run_state_starts_pending() {
        let state = RunState::new();
        assert_eq!(state.status(), PipelineStatus::Pending);
        assert!(state.error().is_none());
        assert!(state.history().is_empty());
    }

    #[test]
    fn test_run_ids_are_unique() {
        assert_ne!(RunState::new().run_id(), RunState::new().run_id());
    }

    #[test]
    fn test_mark_failed_sets_error() {
        let mut state = RunState::new();
        state.mark_running();
        state.mark_failed("boom");
        assert_eq!(state.status(), PipelineStatus::Failed);
        assert_eq!(state.error(), Some("boom"));
    }

    #[test]
    fn test_first_failure_wins() {
        let mut state = RunState::new();
        state.mark_running();
        state.mark_failed("first");
        state.mark_failed("second");
        assert_eq!(state.error(), Some("first"));
    }

    #[test]
    fn test_record_error_replaces_earlier_failure() {
        let mut state = RunState::new();
        state.mark_running();
        state.mark_failed("first");
        state.record_error("second");
        assert_eq!(state.status(), PipelineStatus::Failed);
        assert_eq!(state.error(), Some("second"));
    }

    #[test]
    fn test_empty_failure_message_is_replaced() {
        let mut state = RunState::new();
        state.mark_failed("   ");
        assert_eq!(state.status(), PipelineStatus::Failed);
        assert!(!state.error().unwrap_or_default().trim().is_empty());
    }

    #[test]
    fn test_failed_is_not_completed() {
        let mut state = RunState::new();
        state.mark_running();
        state.mark_failed("x");
        state.mark_completed();
        assert_eq!(state.status(), PipelineStatus::Failed);
    }

    #[test]
    fn test_completed_only_from_running() {
        let mut state = RunState::new();
        state.mark_completed();
        assert_eq!(state.status(), PipelineStatus::Pending);

        state.mark_running();
        state.mark_completed();
        assert_eq!(state.status(), PipelineStatus::Completed);
        assert!(state.error().is_none());
    }

    #[test]
    fn test_mark_running_starts_fresh() {
        let mut state = RunState::new();
        state.mark_running();
        state.record(StepRecord::completed("load", StepKind::Load, Utc::now()));
        state.mark_failed("x");

        state.mark_running();
        assert_eq!(state.status(), PipelineStatus::Running);
        assert!(state.error().is_none());
        assert!(state.history().is_empty());
    }

    #[test]
    fn test_ingestion_context_delegates_state() {
        let mut ctx = IngestionContext::new("data/report.md")
            .with_access(DocumentAccess::new().with_tags(["Finance"]))
            .with_metadata("department", serde_json::json!("finance"));

        assert_eq!(ctx.status(), PipelineStatus::Pending);
        ctx.mark_running();
        ctx.mark_failed("Markdown path not set. Load step must run first.");

        assert!(ctx.is_failed());
        assert_eq!(ctx.error(), Some("Markdown path not set. Load step must run first."));
        assert!(ctx.access.access_tags.contains("Finance"));
        assert_eq!(ctx.metadata["department"], "finance");
    }

    #[test]
    fn test_query_context_defaults() {
        let ctx = QueryContext::new("What is the revenue?", AccessScope::role("Finance_Manager"));
        assert_eq!(ctx.status(), PipelineStatus::Pending);
        assert!(ctx.query_vector.is_none());
        assert!(ctx.retrieved_docs.is_empty());
        assert!(ctx.citations.is_none());
        assert!(ctx.cited().is_empty());
        assert!(!ctx.scope.is_unrestricted());
    }
}
