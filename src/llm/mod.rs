// file: src/llm/mod.rs
// description: hosted language model access for summaries and grounded answers
// reference: internal module structure

pub mod answerer;
pub mod client;
pub mod prompts;
pub mod reasoning;
pub mod summarizer;

pub use answerer::QuestionAnswerer;
pub use client::{ChatModel, CompletionRequest, InferenceClient};
pub use reasoning::{REASONING_MARKER, strip_reasoning};
pub use summarizer::Summarizer;
