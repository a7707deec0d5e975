//! LlmClient implementation over an OpenAI-compatible API.

use async_trait::async_trait;
use chat_core::{ChatError, ChatMessage, ChatModel, Completion};
use reqwest::{Client, Response};
use tracing::{debug, info};

use crate::api_types::{ApiError, ChatCompletionRequest, ChatCompletionResponse};
use crate::config::LlmConfig;
use crate::sse::content_stream;

/// A chat backend that calls an upstream `/chat/completions` endpoint.
pub struct LlmClient {
    client: Client,
    config: LlmConfig,
}

impl LlmClient {
    /// Create a new client with the given configuration.
    pub fn new(config: LlmConfig) -> Result<Self, ChatError> {
        if config.api_key.trim().is_empty() {
            return Err(ChatError::Configuration("API key is empty".to_string()));
        }

        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.timeout)
            .build()
            .map_err(|e| {
                ChatError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        info!(
            model = %config.model,
            api_url = %config.api_url,
            "LlmClient initialized"
        );

        Ok(Self { client, config })
    }

    /// Create a client from environment variables.
    ///
    /// See [`LlmConfig::from_env`] for required environment variables.
    pub fn from_env() -> Result<Self, ChatError> {
        Self::new(LlmConfig::from_env()?)
    }

    /// Get the configuration.
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    async fn send(&self, messages: &[ChatMessage], stream: bool) -> Result<Response, ChatError> {
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            stream,
        };

        debug!(
            messages = messages.len(),
            stream, "Sending chat completion request"
        );

        let response = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ChatError::Network(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(api_error(status.as_u16(), &error_text));
        }

        Ok(response)
    }
}

/// Map an error body to [`ChatError::Api`], preferring the OpenAI error message.
fn api_error(status: u16, body: &str) -> ChatError {
    let message = serde_json::from_str::<ApiError>(body)
        .map(|api_error| api_error.error.message)
        .unwrap_or_else(|_| body.trim().to_string());

    ChatError::Api { status, message }
}

#[async_trait]
impl ChatModel for LlmClient {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        stream: bool,
    ) -> Result<Completion, ChatError> {
        let response = self.send(&messages, stream).await?;

        if stream {
            return Ok(Completion::Stream(content_stream(response.bytes_stream())));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Parse(e.to_string()))?;

        if let Some(usage) = &completion.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "Token usage"
            );
        }

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| {
                debug!(finish_reason = ?choice.finish_reason, "Completion finished");
                choice.message.content
            })
            .filter(|content| !content.trim().is_empty())
            .map(Completion::Text)
            .ok_or(ChatError::EmptyResponse)
    }

    fn name(&self) -> &str {
        "LlmClient"
    }
}
