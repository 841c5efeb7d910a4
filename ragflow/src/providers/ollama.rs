//! Ollama HTTP client implementing the embedding and LLM interfaces.

use super::{EmbeddingModel, Llm};
use crate::config::OllamaConfig;
use crate::errors::BackendError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

/// Client for a local Ollama server.
///
/// Requests are retried with exponential backoff up to `max_retries` times;
/// the request timeout comes from the configuration.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    config: OllamaConfig,
}

impl OllamaClient {
    /// Creates a client from configuration.
    pub fn new(config: OllamaConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()
            .map_err(|e| BackendError::new("ollama", format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Returns true if the server answers.
    pub async fn health_check(&self) -> bool {
        let url = format!("{}/api/tags", self.config.base_url);
        matches!(self.client.get(&url).send().await, Ok(r) if r.status().is_success())
    }

    async fn with_retry<F, Fut, T>(&self, operation: F) -> Result<T, BackendError>
    where
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = Result<T, BackendError>> + Send,
        T: Send,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.config.max_retries => {
                    let delay = Duration::from_secs(2u64.pow(attempt));
                    warn!(
                        attempt = attempt + 1,
                        max_attempts = self.config.max_retries + 1,
                        error = %err,
                        "Ollama request failed, retrying in {:?}", delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, BackendError> {
        let url = format!("{}/api/embeddings", self.config.base_url);
        let url = url.as_str();
        self.with_retry(move || async move {
            let response = self
                .client
                .post(url)
                .json(&EmbedRequest {
                    model: &self.config.embed_model,
                    prompt: text,
                })
                .send()
                .await
                .map_err(|e| BackendError::embedding(format!("Embedding request failed: {e}")))?;

            if !response.status().is_success() {
                return Err(BackendError::embedding(format!(
                    "Embedding failed: HTTP {}",
                    response.status()
                )));
            }

            let body: EmbedResponse = response.json().await.map_err(|e| {
                BackendError::embedding(format!("Invalid embedding response: {e}"))
            })?;
            Ok(body.embedding)
        })
        .await
    }
}

#[async_trait]
impl EmbeddingModel for OllamaClient {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, BackendError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed_one(text).await?);
        }
        Ok(vectors)
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, BackendError> {
        self.embed_one(text).await
    }

    fn model_name(&self) -> &str {
        &self.config.embed_model
    }
}

#[async_trait]
impl Llm for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        let url = format!("{}/api/generate", self.config.base_url);
        let url = url.as_str();
        self.with_retry(move || async move {
            let response = self
                .client
                .post(url)
                .json(&GenerateRequest {
                    model: &self.config.generate_model,
                    prompt,
                    stream: false,
                    options: GenerateOptions {
                        temperature: self.config.temperature,
                    },
                })
                .send()
                .await
                .map_err(|e| BackendError::llm(format!("Generate request failed: {e}")))?;

            if !response.status().is_success() {
                return Err(BackendError::llm(format!(
                    "Generate failed: HTTP {}",
                    response.status()
                )));
            }

            let body: GenerateResponse = response
                .json()
                .await
                .map_err(|e| BackendError::llm(format!("Invalid generate response: {e}")))?;
            Ok(body.response)
        })
        .await
    }
}
