//! Language model interface.

use crate::errors::BackendError;
use async_trait::async_trait;
use std::fmt::Debug;

/// Generates an answer for a prompt.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Llm: Send + Sync + Debug {
    /// Returns the model's completion for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, BackendError>;
}
