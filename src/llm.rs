//! LLM provider abstraction
//!
//! Provides a common interface for the model providers plus the gateway the
//! agent talks through. The gateway owns per-request timeout and the bounded
//! retry policy; providers only classify their own failures.

mod error;
mod gemini;
mod openai;
mod registry;
mod types;

pub use error::{LlmError, LlmErrorKind};
pub use gemini::{GeminiModel, GeminiService};
pub use openai::{OpenAIModel, OpenAIService};
pub use registry::{LlmConfig, ModelRegistry};
pub use types::*;

use async_trait::async_trait;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

/// Common interface for LLM providers
#[async_trait]
pub trait LlmService: Send + Sync {
    /// Make a completion request
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Get the model ID
    fn model_id(&self) -> &str;
}

/// Exponential backoff with jitter, shared by the gateway and tool dispatch.
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let exp = base.saturating_mul(2u32.saturating_pow(attempt));
    let jitter = rand::thread_rng().gen_range(0..=base.as_millis() as u64 / 2);
    exp + Duration::from_millis(jitter)
}

/// Boundary wrapper around one provider: full history in, one assistant
/// message out. Never touches the conversation store.
pub struct Gateway {
    service: Arc<dyn LlmService>,
    max_retries: u32,
    backoff_base: Duration,
    request_timeout: Duration,
}

impl Gateway {
    pub fn new(
        service: Arc<dyn LlmService>,
        max_retries: u32,
        backoff_base: Duration,
        request_timeout: Duration,
    ) -> Self {
        Self {
            service,
            max_retries,
            backoff_base,
            request_timeout,
        }
    }

    /// Complete the conversation, retrying transient provider failures up to
    /// the configured bound. A timeout counts as a network failure.
    pub async fn complete(
        &self,
        system: &str,
        history: &[Message],
        tools: Vec<ToolDefinition>,
    ) -> Result<Message, LlmError> {
        let request = LlmRequest {
            system: system.to_string(),
            messages: history.to_vec(),
            tools,
            max_tokens: Some(2048),
        };

        let mut attempt = 0;
        loop {
            let outcome =
                tokio::time::timeout(self.request_timeout, self.service.complete(&request)).await;

            let err = match outcome {
                Ok(Ok(response)) => {
                    tracing::info!(
                        model = %self.service.model_id(),
                        input_tokens = response.usage.input_tokens,
                        output_tokens = response.usage.output_tokens,
                        tool_calls = response.has_tool_use(),
                        "LLM request completed"
                    );
                    return Ok(Message::assistant(response.content));
                }
                Ok(Err(e)) => e,
                Err(_) => LlmError::network("request timed out"),
            };

            if attempt >= self.max_retries || !err.kind.is_retryable() {
                tracing::error!(
                    model = %self.service.model_id(),
                    error = %err.message,
                    attempts = attempt + 1,
                    "LLM request failed"
                );
                return Err(err);
            }

            let delay = err
                .retry_after
                .unwrap_or_else(|| backoff_delay(self.backoff_base, attempt));
            tracing::warn!(
                model = %self.service.model_id(),
                error = %err.message,
                attempt = attempt + 1,
                delay_ms = delay.as_millis() as u64,
                "Retrying LLM request"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
