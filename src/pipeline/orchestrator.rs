// file: src/pipeline/orchestrator.rs
// description: coordinates search, selection, extraction, caching and the model calls
// reference: orchestrates one prospectus run and the follow-up question path

use crate::cache::TextCache;
use crate::config::{Config, ProbeValidation, SelectionPolicy};
use crate::error::{PipelineError, Result, SummarizationError};
use crate::extractor::{DocumentFetcher, HttpFetcher};
use crate::llm::{ChatModel, InferenceClient, QuestionAnswerer, Summarizer};
use crate::models::{Answer, ExtractedDocument, Summary};
use crate::pipeline::progress::{PipelineCounters, PipelineStage, PipelineStats, ProgressTracker};
use crate::search::{DuckDuckGoProvider, SearchGateway, SearchProvider};
use crate::selector::CandidateSelector;
use crate::utils::Validator;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const SLOW_RUN_THRESHOLD: Duration = Duration::from_secs(60);

/// Result of a successful summary run.
#[derive(Debug, Clone)]
pub struct SummaryOutcome {
    pub summary: Summary,
    pub document: ExtractedDocument,
}

/// Summary run that got as far as the model call.
#[derive(Debug)]
pub struct SummaryAttempt {
    pub document: ExtractedDocument,
    pub summary: std::result::Result<Summary, SummarizationError>,
}

/// Question run that got as far as the model call.
#[derive(Debug)]
pub struct AnswerAttempt {
    pub grounding_text_length: usize,
    pub answer: std::result::Result<Answer, SummarizationError>,
}

pub struct ProspectusPipeline {
    search: SearchGateway,
    selector: CandidateSelector,
    fetcher: Arc<dyn DocumentFetcher>,
    cache: TextCache,
    summarizer: Summarizer,
    answerer: QuestionAnswerer,
    counters: PipelineCounters,
    max_results: usize,
    summary_max_input_chars: usize,
    answer_max_grounding_chars: usize,
}

impl ProspectusPipeline {
    /// Builds the pipeline against the live search, fetch and inference
    /// services named in `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let search = Arc::new(DuckDuckGoProvider::new(
            &config.search,
            &config.fetch.user_agent,
        )?);
        let fetcher = Arc::new(HttpFetcher::new(&config.fetch)?);
        let model = Arc::new(InferenceClient::new(&config.llm, config.api_key())?);

        info!(
            "Pipeline ready (policy: {:?}, model: {})",
            config.selector.policy,
            model.model()
        );

        Ok(Self::with_components(config, search, fetcher, model))
    }

    pub fn with_components(
        config: &Config,
        search: Arc<dyn SearchProvider>,
        fetcher: Arc<dyn DocumentFetcher>,
        model: Arc<dyn ChatModel>,
    ) -> Self {
        let judge = (config.selector.policy == SelectionPolicy::Probe
            && config.selector.probe_validation == ProbeValidation::Model)
            .then(|| model.clone());

        Self {
            search: SearchGateway::new(search, config.search.query_suffix.clone()),
            selector: CandidateSelector::new(config.selector.clone(), fetcher.clone(), judge),
            fetcher,
            cache: TextCache::new(config.cache.capacity),
            summarizer: Summarizer::new(
                model.clone(),
                config.llm.summary_max_tokens,
                config.llm.temperature,
            ),
            answerer: QuestionAnswerer::new(
                model,
                config.llm.answer_max_tokens,
                config.llm.temperature,
            ),
            counters: PipelineCounters::new(),
            max_results: config.search.max_results,
            summary_max_input_chars: config.llm.summary_max_input_chars,
            answer_max_grounding_chars: config.llm.answer_max_grounding_chars,
        }
    }

    pub fn cache(&self) -> &TextCache {
        &self.cache
    }

    pub fn policy(&self) -> SelectionPolicy {
        self.selector.policy()
    }

    pub fn stats(&self) -> PipelineStats {
        self.counters.get_stats()
    }

    /// Runs search through summarization for one drug name. The extracted
    /// text is cached under the name before summarization starts; nothing is
    /// cached when no document is found.
    pub async fn summarize_drug(
        &self,
        drug_name: &str,
        progress: &ProgressTracker,
    ) -> Result<SummaryOutcome> {
        let attempt = self.attempt_summary(drug_name, progress).await?;
        let summary = attempt.summary?;
        Ok(SummaryOutcome {
            summary,
            document: attempt.document,
        })
    }

    /// Like [`summarize_drug`](Self::summarize_drug), but a model failure
    /// still yields the retrieved document. The outer error covers input and
    /// retrieval failures only.
    pub async fn attempt_summary(
        &self,
        drug_name: &str,
        progress: &ProgressTracker,
    ) -> Result<SummaryAttempt> {
        let drug_name = Validator::validate_drug_name(drug_name)?;

        let document = match self.retrieve(drug_name, progress).await {
            Ok(doc) => doc,
            Err(e) => {
                if e.is_not_found() {
                    self.counters.inc_not_found();
                }
                warn!("No prospectus for '{}': {}", drug_name, e);
                return Err(e);
            }
        };

        self.cache.put(drug_name, document.text.clone()).await;
        progress.set_stage(PipelineStage::Cached);
        debug!(
            "Cached {} characters for '{}'",
            document.char_len(),
            drug_name
        );

        progress.set_stage(PipelineStage::Summarizing);
        let summary = self
            .summarizer
            .summarize(&document.text, Some(self.summary_max_input_chars))
            .await;

        match &summary {
            Ok(_) => {
                progress.set_stage(PipelineStage::AnswerReady);
                self.counters.inc_summaries_served();
                info!(
                    "Summary for '{}' ready in {:.2}s",
                    drug_name,
                    progress.elapsed().as_secs_f64()
                );
            }
            Err(_) => self.counters.inc_summaries_failed(),
        }

        let elapsed = progress.elapsed();
        if elapsed > SLOW_RUN_THRESHOLD {
            warn!(
                "Summary run for '{}' took {:.2}s (threshold: {:.2}s)",
                drug_name,
                elapsed.as_secs_f64(),
                SLOW_RUN_THRESHOLD.as_secs_f64()
            );
        }

        Ok(SummaryAttempt { document, summary })
    }

    async fn retrieve(
        &self,
        drug_name: &str,
        progress: &ProgressTracker,
    ) -> Result<ExtractedDocument> {
        progress.set_stage(PipelineStage::Searching);
        let results = self.search.search(drug_name, self.max_results).await?;
        if results.is_empty() {
            return Err(PipelineError::NotFound(drug_name.to_string()));
        }

        progress.set_stage(PipelineStage::Selecting);
        let candidate = self
            .selector
            .select(&results)
            .await?
            .ok_or_else(|| PipelineError::NotFound(drug_name.to_string()))?;

        progress.set_stage(PipelineStage::Fetching);
        let document = match candidate.document {
            Some(document) => document,
            None => self.fetcher.fetch(&candidate.result.url).await?,
        };

        progress.set_stage(PipelineStage::Extracting);
        if document.is_empty() {
            return Err(PipelineError::NotFound(drug_name.to_string()));
        }

        info!(
            "Extracted {} characters from {}{}",
            document.char_len(),
            document.source_url,
            if document.truncated { " (truncated)" } else { "" }
        );

        Ok(document)
    }

    /// Answers from the cached full text for `drug_name` when present,
    /// otherwise from `summary`.
    pub async fn answer_question(
        &self,
        question: &str,
        summary: &str,
        drug_name: Option<&str>,
        progress: &ProgressTracker,
    ) -> Result<Answer> {
        let attempt = self
            .attempt_answer(question, summary, drug_name, progress)
            .await?;
        Ok(attempt.answer?)
    }

    /// Like [`answer_question`](Self::answer_question), but a model failure
    /// still reports the length of the grounding text that was chosen.
    pub async fn attempt_answer(
        &self,
        question: &str,
        summary: &str,
        drug_name: Option<&str>,
        progress: &ProgressTracker,
    ) -> Result<AnswerAttempt> {
        let question = Validator::require("question", Some(question))?;
        let summary = Validator::require("summary", Some(summary))?;

        progress.set_stage(PipelineStage::Cached);
        let cached = match drug_name {
            Some(name) => self.cache.get(name).await,
            None => None,
        };
        self.counters.record_cache_lookup(cached.is_some());

        let grounding = match &cached {
            Some(text) => {
                debug!("Answering from cached full text ({} chars)", text.chars().count());
                text.as_str()
            }
            None => {
                debug!("No cached text; answering from the summary");
                summary
            }
        };
        let grounding_text_length = grounding.chars().count();

        let answer = self
            .answerer
            .answer(question, grounding, self.answer_max_grounding_chars)
            .await;

        match &answer {
            Ok(_) => {
                progress.set_stage(PipelineStage::AnswerReady);
                self.counters.inc_answers_served();
            }
            Err(_) => self.counters.inc_answers_failed(),
        }

        Ok(AnswerAttempt {
            grounding_text_length,
            answer,
        })
    }

    pub async fn clear_cache(&self) {
        self.cache.clear().await;
        info!("Text cache cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::testing::FakeFetcher;
    use crate::llm::testing::ScriptedModel;
    use crate::search::testing::StaticSearch;
    use pretty_assertions::assert_eq;

    const LEAFLET_URL: &str = "https://www.ilacrehberi.com/parol/";
    const LEAFLET: &str = "KULLANMA TALİMATI\nPAROL 500 mg tablet\nEtkin madde: parasetamol";

    fn pipeline(
        search: StaticSearch,
        fetcher: Arc<FakeFetcher>,
        model: Arc<ScriptedModel>,
    ) -> ProspectusPipeline {
        ProspectusPipeline::with_components(
            &Config::default_config(),
            Arc::new(search),
            fetcher,
            model,
        )
    }

    #[tokio::test]
    async fn test_summary_run_caches_full_text_and_walks_stages() {
        let fetcher = Arc::new(FakeFetcher::new().with_page(LEAFLET_URL, LEAFLET));
        let model = Arc::new(ScriptedModel::replying("<think>...</think>Parol ağrı kesicidir."));
        let pipeline = pipeline(
            StaticSearch::new(&["https://forum.test/parol", LEAFLET_URL]),
            fetcher.clone(),
            model,
        );
        let progress = ProgressTracker::hidden();

        let outcome = pipeline.summarize_drug("Parol", &progress).await.unwrap();

        assert_eq!(outcome.summary.text, "Parol ağrı kesicidir.");
        assert_eq!(outcome.summary.source_text_length, LEAFLET.chars().count());
        assert_eq!(outcome.document.source_url, LEAFLET_URL);
        assert_eq!(fetcher.fetched(), vec![LEAFLET_URL]);
        assert_eq!(pipeline.cache().get("parol").await.as_deref(), Some(LEAFLET));
        assert_eq!(
            progress.history(),
            vec![
                PipelineStage::Idle,
                PipelineStage::Searching,
                PipelineStage::Selecting,
                PipelineStage::Fetching,
                PipelineStage::Extracting,
                PipelineStage::Cached,
                PipelineStage::Summarizing,
                PipelineStage::AnswerReady,
            ]
        );
        assert_eq!(pipeline.stats().summaries_served, 1);
    }

    #[tokio::test]
    async fn test_empty_search_is_not_found_and_caches_nothing() {
        let model = Arc::new(ScriptedModel::replying("özet"));
        let pipeline = pipeline(StaticSearch::new(&[]), Arc::new(FakeFetcher::new()), model.clone());

        let err = pipeline
            .summarize_drug("yokilac", &ProgressTracker::hidden())
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::NotFound(_)));
        assert!(pipeline.cache().is_empty().await);
        assert_eq!(model.request_count(), 0);
        assert_eq!(pipeline.stats().not_found, 1);
    }

    #[tokio::test]
    async fn test_no_allowlisted_result_is_not_found() {
        let fetcher = Arc::new(FakeFetcher::new());
        let pipeline = pipeline(
            StaticSearch::new(&["https://blog.test/parol"]),
            fetcher.clone(),
            Arc::new(ScriptedModel::replying("özet")),
        );

        let err = pipeline
            .summarize_drug("parol", &ProgressTracker::hidden())
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::NotFound(_)));
        assert!(fetcher.fetched().is_empty());
        assert!(pipeline.cache().is_empty().await);
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates_without_caching() {
        let pipeline = pipeline(
            StaticSearch::new(&[LEAFLET_URL]),
            Arc::new(FakeFetcher::new()),
            Arc::new(ScriptedModel::replying("özet")),
        );

        let err = pipeline
            .summarize_drug("parol", &ProgressTracker::hidden())
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Fetch { .. }));
        assert!(err.is_not_found());
        assert!(pipeline.cache().is_empty().await);
    }

    #[tokio::test]
    async fn test_search_provider_failure_propagates() {
        let pipeline = pipeline(
            StaticSearch::failing(),
            Arc::new(FakeFetcher::new()),
            Arc::new(ScriptedModel::replying("özet")),
        );

        let err = pipeline
            .summarize_drug("parol", &ProgressTracker::hidden())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Provider(_)));
    }

    #[tokio::test]
    async fn test_summarization_failure_keeps_cached_text() {
        let pipeline = pipeline(
            StaticSearch::new(&[LEAFLET_URL]),
            Arc::new(FakeFetcher::new().with_page(LEAFLET_URL, LEAFLET)),
            Arc::new(ScriptedModel::failing()),
        );

        let err = pipeline
            .summarize_drug("parol", &ProgressTracker::hidden())
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Summarization(_)));
        assert!(pipeline.cache().get("parol").await.is_some());
        assert_eq!(pipeline.stats().summaries_failed, 1);
    }

    #[tokio::test]
    async fn test_failed_summary_attempt_keeps_document() {
        let pipeline = pipeline(
            StaticSearch::new(&[LEAFLET_URL]),
            Arc::new(FakeFetcher::new().with_page(LEAFLET_URL, LEAFLET)),
            Arc::new(ScriptedModel::failing()),
        );

        let attempt = pipeline
            .attempt_summary("parol", &ProgressTracker::hidden())
            .await
            .unwrap();
        pipeline.clear_cache().await;

        assert!(attempt.summary.is_err());
        assert_eq!(attempt.document.source_url, LEAFLET_URL);
        assert_eq!(attempt.document.char_len(), LEAFLET.chars().count());
    }

    #[tokio::test]
    async fn test_answer_uses_cached_text_then_summary() {
        let model = Arc::new(ScriptedModel::replying("Günde 3 kez."));
        let pipeline = pipeline(
            StaticSearch::new(&[LEAFLET_URL]),
            Arc::new(FakeFetcher::new().with_page(LEAFLET_URL, LEAFLET)),
            model.clone(),
        );
        pipeline
            .summarize_drug("Parol", &ProgressTracker::hidden())
            .await
            .unwrap();

        let progress = ProgressTracker::hidden();
        let answer = pipeline
            .answer_question("Kaç kez?", "kısa özet", Some("PAROL"), &progress)
            .await
            .unwrap();
        assert_eq!(answer.grounding_text_length, LEAFLET.chars().count());
        assert!(model.last_request().unwrap().prompt.contains(LEAFLET));
        assert_eq!(
            progress.history(),
            vec![
                PipelineStage::Idle,
                PipelineStage::Cached,
                PipelineStage::AnswerReady
            ]
        );

        let fallback = pipeline
            .answer_question("Kaç kez?", "kısa özet", Some("aspirin"), &ProgressTracker::hidden())
            .await
            .unwrap();
        assert_eq!(fallback.grounding_text_length, "kısa özet".chars().count());

        let stats = pipeline.stats();
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.cache_misses, 1);
        assert_eq!(stats.answers_served, 2);
    }

    #[tokio::test]
    async fn test_answer_requires_question_and_summary() {
        let pipeline = pipeline(
            StaticSearch::new(&[]),
            Arc::new(FakeFetcher::new()),
            Arc::new(ScriptedModel::replying("cevap")),
        );
        let progress = ProgressTracker::hidden();

        assert!(matches!(
            pipeline.answer_question("", "özet", None, &progress).await,
            Err(PipelineError::Input(_))
        ));
        assert!(matches!(
            pipeline.answer_question("soru", "  ", None, &progress).await,
            Err(PipelineError::Input(_))
        ));
    }

    #[tokio::test]
    async fn test_probe_policy_reuses_probed_document() {
        let mut config = Config::default_config();
        config.selector.policy = SelectionPolicy::Probe;
        let fetcher = Arc::new(
            FakeFetcher::new().with_page("https://any.test/parol", LEAFLET),
        );
        let pipeline = ProspectusPipeline::with_components(
            &config,
            Arc::new(StaticSearch::new(&["https://any.test/parol"])),
            fetcher.clone(),
            Arc::new(ScriptedModel::replying("özet")),
        );

        pipeline
            .summarize_drug("parol", &ProgressTracker::hidden())
            .await
            .unwrap();

        assert_eq!(fetcher.fetched().len(), 1);
    }
}
