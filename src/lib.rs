// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod cache;
pub mod config;
pub mod error;
pub mod extractor;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod search;
pub mod selector;
pub mod server;
pub mod utils;

pub use cache::TextCache;
pub use config::{
    CacheConfig, Config, FetchConfig, LlmConfig, ProbeValidation, SearchConfig, SelectionPolicy,
    SelectorConfig, ServerConfig,
};
pub use error::{PipelineError, Result, SummarizationError};
pub use extractor::{DocumentFetcher, HtmlExtractor, HttpFetcher};
pub use llm::{ChatModel, InferenceClient, QuestionAnswerer, Summarizer, strip_reasoning};
pub use models::{Answer, ExtractedDocument, SearchResult, Summary};
pub use pipeline::{
    AnswerAttempt, PipelineStage, PipelineStats, ProgressTracker, ProspectusPipeline,
    SummaryAttempt, SummaryOutcome,
};
pub use search::{DuckDuckGoProvider, SearchGateway, SearchProvider};
pub use selector::{Candidate, CandidateSelector};
pub use server::{AppState, create_router};
pub use utils::{HealthCheck, HealthReport, HealthStatus, Validator};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let config = Config::default_config();
        let _cache = TextCache::new(config.cache.capacity);
        assert_eq!(strip_reasoning("a</think> b"), "b");
    }
}
