//! LLM provider abstraction
//!
//! Streams completions from an OpenAI-compatible chat API.

mod config;
mod error;
mod openai;
mod reply;
mod types;

pub use config::LlmConfig;
pub use error::LlmError;
#[cfg(test)]
pub use error::LlmErrorKind;
pub use openai::OpenAIService;
pub use reply::{ReplyAccumulator, ReplyProgress};
pub use types::*;

use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Instant;

/// Common interface for LLM providers
#[async_trait]
pub trait LlmService: Send + Sync {
    /// Start a streamed completion
    async fn stream(&self, request: &LlmRequest) -> Result<LlmStream, LlmError>;

    /// Get the model ID
    fn model_id(&self) -> &str;
}

/// Logging wrapper for LLM services
pub struct LoggingService {
    inner: Arc<dyn LlmService>,
    model_id: String,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn LlmService>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl LlmService for LoggingService {
    async fn stream(&self, request: &LlmRequest) -> Result<LlmStream, LlmError> {
        let start = Instant::now();
        let result = self.inner.stream(request).await;

        match result {
            Ok(stream) => {
                tracing::debug!(
                    model = %self.model_id,
                    messages = request.messages.len(),
                    first_byte_ms = %start.elapsed().as_millis(),
                    "LLM stream opened"
                );
                let model_id = self.model_id.clone();
                let logged = stream.inspect(move |event| match event {
                    Ok(StreamEvent::Usage(usage)) => {
                        tracing::info!(
                            model = %model_id,
                            duration_ms = %start.elapsed().as_millis(),
                            input_tokens = usage.input_tokens,
                            output_tokens = usage.output_tokens,
                            "LLM request completed"
                        );
                    }
                    Err(e) => {
                        tracing::error!(
                            model = %model_id,
                            duration_ms = %start.elapsed().as_millis(),
                            error = %e.message,
                            kind = ?e.kind,
                            "LLM stream failed"
                        );
                    }
                    Ok(_) => {}
                });
                Ok(Box::pin(logged))
            }
            Err(e) => {
                tracing::error!(
                    model = %self.model_id,
                    duration_ms = %start.elapsed().as_millis(),
                    error = %e.message,
                    kind = ?e.kind,
                    "LLM request failed"
                );
                Err(e)
            }
        }
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

/// Build the production model client
pub fn build_service(config: &LlmConfig) -> Result<Arc<dyn LlmService>, LlmError> {
    let service = OpenAIService::new(config)?;
    Ok(Arc::new(LoggingService::new(Arc::new(service))))
}
