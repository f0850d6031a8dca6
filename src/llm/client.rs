// file: src/llm/client.rs
// description: OpenAI-compatible chat-completion client for the hosted inference endpoint
// reference: https://huggingface.co/docs/inference-providers/tasks/chat-completion

use crate::config::LlmConfig;
use crate::error::{PipelineError, SummarizationError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

/// One single-turn completion: the prompt goes out as a lone user message.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Hosted language model seam. Returns the raw assistant text, reasoning
/// markup included.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String, SummarizationError>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct InferenceClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl InferenceClient {
    pub fn new(config: &LlmConfig, api_key: impl Into<String>) -> Result<Self, PipelineError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| {
                PipelineError::Config(format!("Failed to build inference client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ChatModel for InferenceClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, SummarizationError> {
        let url = format!("{}/chat/completions", self.base_url);
        let start = Instant::now();

        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        debug!(
            "Requesting completion from {} for {} prompt chars",
            self.model,
            request.prompt.chars().count()
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!("Inference request failed: {}", e);
                SummarizationError::Request(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!("Inference API error {}: {}", status, error_text);
            return Err(SummarizationError::Api {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| SummarizationError::Parse(e.to_string()))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(SummarizationError::EmptyResponse)?;

        debug!(
            "Completion from {} took {} ms",
            self.model,
            start.elapsed().as_millis()
        );

        Ok(content)
    }
}
