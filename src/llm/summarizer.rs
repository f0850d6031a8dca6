// file: src/llm/summarizer.rs
// description: plain-language package-insert summaries from the hosted model
// reference: single-turn chat completion with reasoning-marker stripping

use super::client::{ChatModel, CompletionRequest};
use super::prompts::summary_prompt;
use super::reasoning::strip_reasoning;
use crate::error::SummarizationError;
use crate::models::{Summary, truncate_chars};
use std::sync::Arc;
use tracing::{debug, error};

pub struct Summarizer {
    model: Arc<dyn ChatModel>,
    max_tokens: u32,
    temperature: f32,
}

impl Summarizer {
    pub fn new(model: Arc<dyn ChatModel>, max_tokens: u32, temperature: f32) -> Self {
        Self {
            model,
            max_tokens,
            temperature,
        }
    }

    /// Summarizes `text`, first cutting it to `max_input_chars` when given.
    /// `source_text_length` reports the length before that cut.
    pub async fn summarize(
        &self,
        text: &str,
        max_input_chars: Option<usize>,
    ) -> Result<Summary, SummarizationError> {
        let source_text_length = text.chars().count();

        let input = match max_input_chars {
            Some(limit) => truncate_chars(text.to_string(), limit).0,
            None => text.to_string(),
        };

        debug!(
            "Summarizing {} of {} characters",
            input.chars().count(),
            source_text_length
        );

        let raw = self
            .model
            .complete(CompletionRequest {
                prompt: summary_prompt(&input),
                max_tokens: self.max_tokens,
                temperature: self.temperature,
            })
            .await
            .inspect_err(|e| error!("Summarization failed: {}", e))?;

        Ok(Summary::new(strip_reasoning(&raw), source_text_length))
    }
}
