//! Pipeline builder with validation.

use super::{PipelineExecutor, Step};
use crate::context::PipelineContext;
use crate::errors::{ErrorInfo, PipelineValidationError};
use crate::events::{EventSink, NoOpEventSink};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Assembles steps into a [`PipelineExecutor`].
pub struct PipelineBuilder<C: PipelineContext> {
    name: String,
    steps: Vec<Arc<dyn Step<C>>>,
    sink: Arc<dyn EventSink>,
}

impl<C: PipelineContext> fmt::Debug for PipelineBuilder<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("name", &self.name)
            .field("steps", &self.steps.len())
            .finish()
    }
}

impl<C: PipelineContext> PipelineBuilder<C> {
    /// Creates an empty builder.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
            sink: Arc::new(NoOpEventSink),
        }
    }

    /// Appends a step.
    #[must_use]
    pub fn step(mut self, step: Arc<dyn Step<C>>) -> Self {
        self.steps.push(step);
        self
    }

    /// Appends several steps in order.
    #[must_use]
    pub fn steps(mut self, steps: impl IntoIterator<Item = Arc<dyn Step<C>>>) -> Self {
        self.steps.extend(steps);
        self
    }

    /// Sets the event sink of the built executor.
    #[must_use]
    pub fn event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of steps.
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Builds the executor.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no steps or two steps share a name.
    pub fn build(self) -> Result<PipelineExecutor<C>, PipelineValidationError> {
        if self.steps.is_empty() {
            return Err(PipelineValidationError::new(format!(
                "Pipeline '{}' has no steps",
                self.name
            ))
            .with_error_info(
                ErrorInfo::new("PIPELINE-EMPTY", "Cannot build an empty pipeline")
                    .with_fix_hint("Add at least one step before building."),
            ));
        }

        let mut seen = HashSet::new();
        for step in &self.steps {
            if !seen.insert(step.name()) {
                return Err(PipelineValidationError::new(format!(
                    "Step '{}' appears more than once in pipeline '{}'",
                    step.name(),
                    self.name
                ))
                .with_steps(vec![step.name().to_string()])
                .with_error_info(
                    ErrorInfo::new("PIPELINE-DUPLICATE-STEP", "Step names must be unique")
                        .with_fix_hint("Give each step instance a distinct name.")
                        .with_context_entry("step", step.name()),
                ));
            }
        }

        Ok(PipelineExecutor::new(self.name, self.steps).with_event_sink(self.sink))
    }
}
