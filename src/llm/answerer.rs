// file: src/llm/answerer.rs
// description: answers questions restricted to the supplied package-insert text
// reference: single-turn chat completion with reasoning-marker stripping

use super::client::{ChatModel, CompletionRequest};
use super::prompts::answer_prompt;
use super::reasoning::strip_reasoning;
use crate::error::SummarizationError;
use crate::models::Answer;
use std::sync::Arc;
use tracing::{debug, error};

pub struct QuestionAnswerer {
    model: Arc<dyn ChatModel>,
    max_tokens: u32,
    temperature: f32,
}

impl QuestionAnswerer {
    pub fn new(model: Arc<dyn ChatModel>, max_tokens: u32, temperature: f32) -> Self {
        Self {
            model,
            max_tokens,
            temperature,
        }
    }

    /// Only the first `max_grounding_chars` characters reach the prompt;
    /// `grounding_text_length` is the full length.
    pub async fn answer(
        &self,
        question: &str,
        grounding_text: &str,
        max_grounding_chars: usize,
    ) -> Result<Answer, SummarizationError> {
        let grounding_text_length = grounding_text.chars().count();
        let excerpt: String = grounding_text.chars().take(max_grounding_chars).collect();

        debug!(
            "Answering question with {} of {} grounding characters",
            excerpt.chars().count(),
            grounding_text_length
        );

        let raw = self
            .model
            .complete(CompletionRequest {
                prompt: answer_prompt(&excerpt, question.trim()),
                max_tokens: self.max_tokens,
                temperature: self.temperature,
            })
            .await
            .inspect_err(|e| error!("Question answering failed: {}", e))?;

        Ok(Answer::new(strip_reasoning(&raw), grounding_text_length))
    }
}
