//! The step trait.

use crate::context::PipelineContext;
use crate::core::{StepKind, StepOutcome};
use crate::errors::StepError;
use async_trait::async_trait;
use std::fmt::{self, Debug};
use std::marker::PhantomData;

/// A unit of work over a pipeline context.
///
/// Steps hold their collaborators and no per-run state. A step whose
/// upstream input is missing returns [`StepOutcome::Fail`]; a step whose
/// underlying operation fails returns `Err`, which the executor records and
/// then propagates.
#[async_trait]
pub trait Step<C: PipelineContext>: Send + Sync + Debug {
    /// Returns the step name.
    fn name(&self) -> &str;

    /// Returns the step kind.
    fn kind(&self) -> StepKind {
        StepKind::Custom
    }

    /// Runs the step against `ctx`.
    async fn run(&self, ctx: &mut C) -> Result<StepOutcome, StepError>;
}

/// A step backed by a synchronous closure.
pub struct FnStep<C, F>
where
    F: Fn(&mut C) -> Result<StepOutcome, StepError> + Send + Sync,
{
    name: String,
    kind: StepKind,
    func: F,
    _context: PhantomData<fn(&mut C)>,
}

impl<C, F> FnStep<C, F>
where
    F: Fn(&mut C) -> Result<StepOutcome, StepError> + Send + Sync,
{
    /// Creates a custom step from a closure.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            kind: StepKind::Custom,
            func,
            _context: PhantomData,
        }
    }

    /// Sets the step kind.
    #[must_use]
    pub fn with_kind(mut self, kind: StepKind) -> Self {
        self.kind = kind;
        self
    }
}

impl<C, F> Debug for FnStep<C, F>
where
    F: Fn(&mut C) -> Result<StepOutcome, StepError> + Send + Sync,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnStep")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

#[async_trait]
impl<C, F> Step<C> for FnStep<C, F>
where
    C: PipelineContext,
    F: Fn(&mut C) -> Result<StepOutcome, StepError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> StepKind {
        self.kind
    }

    async fn run(&self, ctx: &mut C) -> Result<StepOutcome, StepError> {
        (self.func)(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RunState;

    #[tokio::test]
    async fn test_fn_step() {
        let step = FnStep::new("touch", |_ctx: &mut RunState| Ok(StepOutcome::Continue))
            .with_kind(StepKind::Load);

        assert_eq!(step.name(), "touch");
        assert_eq!(step.kind(), StepKind::Load);

        let mut state = RunState::new();
        assert!(step.run(&mut state).await.unwrap().is_success());
    }

    #[tokio::test]
    async fn test_fn_step_can_fail() {
        let step = FnStep::new("refuse", |_ctx: &mut RunState| Ok(StepOutcome::fail("nope")));
        let mut state = RunState::new();

        let outcome = step.run(&mut state).await.unwrap();
        assert_eq!(outcome.message(), Some("nope"));
    }
}
