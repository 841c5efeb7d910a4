//! Token counting with a remote tokenizer and a local approximation.

use crate::errors::BackendError;
use async_trait::async_trait;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Characters per token assumed by the approximation.
pub const CHARS_PER_TOKEN: usize = 4;

/// Text used to probe the remote tokenizer once at construction.
const PROBE_TEXT: &str = "test";

/// Estimates the token count of `text` as characters / 4.
#[must_use]
pub fn approximate_tokens(text: &str) -> usize {
    text.chars().count() / CHARS_PER_TOKEN
}

/// A remote service that counts tokens exactly.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenCountApi: Send + Sync {
    /// Returns the number of tokens `text` has under `model`'s tokenizer.
    async fn count_tokens(&self, model: &str, text: &str) -> Result<usize, BackendError>;
}

/// Counts tokens, preferring the remote tokenizer while it works.
///
/// The first failure of the remote tokenizer switches the counter to the
/// approximation for the rest of its life. Failures are logged, never
/// returned.
pub struct TokenCounter {
    api: Option<Arc<dyn TokenCountApi>>,
    model: String,
    api_available: AtomicBool,
}

impl fmt::Debug for TokenCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCounter")
            .field("model", &self.model)
            .field("exact", &self.is_exact())
            .finish()
    }
}

impl TokenCounter {
    /// Creates a counter that only approximates.
    #[must_use]
    pub fn approximate() -> Self {
        Self {
            api: None,
            model: String::new(),
            api_available: AtomicBool::new(false),
        }
    }

    /// Creates a counter backed by a remote tokenizer.
    ///
    /// The tokenizer is probed once; if the probe fails the counter starts
    /// out approximating.
    pub async fn with_api(api: Arc<dyn TokenCountApi>, model: &str) -> Self {
        let model = model.strip_prefix("models/").unwrap_or(model).to_string();
        let available = match api.count_tokens(&model, PROBE_TEXT).await {
            Ok(_) => true,
            Err(err) => {
                info!(
                    model = %model,
                    error = %err,
                    "Token count API unavailable, using character approximation"
                );
                false
            }
        };

        Self {
            api: Some(api),
            model,
            api_available: AtomicBool::new(available),
        }
    }

    /// Returns true while counts come from the remote tokenizer.
    #[must_use]
    pub fn is_exact(&self) -> bool {
        self.api.is_some() && self.api_available.load(Ordering::Relaxed)
    }

    /// Returns the token count of `text`.
    pub async fn count(&self, text: &str) -> usize {
        if let (Some(api), true) = (&self.api, self.is_exact()) {
            match api.count_tokens(&self.model, text).await {
                Ok(count) => return count,
                Err(err) => {
                    warn!(
                        model = %self.model,
                        error = %err,
                        "Token count API failed, switching to character approximation"
                    );
                    self.api_available.store(false, Ordering::Relaxed);
                }
            }
        }
        approximate_tokens(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    #[test]
    fn test_approximation() {
        assert_eq!(approximate_tokens(""), 0);
        assert_eq!(approximate_tokens("abc"), 0);
        assert_eq!(approximate_tokens("abcdefgh"), 2);
        assert_eq!(approximate_tokens("ééééé"), 1);
    }

    #[tokio::test]
    async fn test_approximate_counter() {
        let counter = TokenCounter::approximate();
        assert!(!counter.is_exact());
        assert_eq!(counter.count("abcdefghijkl").await, 3);
    }

    #[tokio::test]
    async fn test_exact_counts_and_strips_model_prefix() {
        let mut api = MockTokenCountApi::new();
        api.expect_count_tokens()
            .with(eq("gemini-embedding-001"), eq("test"))
            .times(1)
            .returning(|_, _| Ok(1));
        api.expect_count_tokens()
            .with(eq("gemini-embedding-001"), eq("hello world"))
            .times(1)
            .returning(|_, _| Ok(2));

        let counter = TokenCounter::with_api(Arc::new(api), "models/gemini-embedding-001").await;
        assert!(counter.is_exact());
        assert_eq!(counter.count("hello world").await, 2);
    }

    #[tokio::test]
    async fn test_failed_probe_falls_back() {
        let mut api = MockTokenCountApi::new();
        api.expect_count_tokens()
            .times(1)
            .returning(|_, _| Err(BackendError::new("tokenizer", "no credentials")));

        let counter = TokenCounter::with_api(Arc::new(api), "m").await;
        assert!(!counter.is_exact());
        assert_eq!(counter.count("abcdefgh").await, 2);
    }

    #[tokio::test]
    async fn test_runtime_failure_disables_api_for_good() {
        let mut api = MockTokenCountApi::new();
        let mut seq = mockall::Sequence::new();
        api.expect_count_tokens()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(1));
        api.expect_count_tokens()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(BackendError::new("tokenizer", "rate limited")));

        let counter = TokenCounter::with_api(Arc::new(api), "m").await;
        assert_eq!(counter.count("abcdefgh").await, 2);
        assert!(!counter.is_exact());
        assert_eq!(counter.count("abcdefghijkl").await, 3);
    }
}
