// file: src/selector/mod.rs
// description: picks the search result most likely to be the package insert
// reference: domain allowlist with a probe-and-validate alternative

mod heuristics;

pub use heuristics::{fold_turkish, heading_matches, is_affirmative, looks_like_package_insert};

use crate::config::{ProbeValidation, SelectionPolicy, SelectorConfig};
use crate::error::Result;
use crate::extractor::DocumentFetcher;
use crate::llm::prompts::relevance_prompt;
use crate::llm::{ChatModel, CompletionRequest, strip_reasoning};
use crate::models::{ExtractedDocument, SearchResult};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Characters of a probed page shown to the model for the relevance check.
const RELEVANCE_EXCERPT_CHARS: usize = 3_000;

/// The chosen result. `document` is set when selection already fetched it.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub result: SearchResult,
    pub document: Option<ExtractedDocument>,
}

impl Candidate {
    pub fn url(&self) -> &str {
        &self.result.url
    }
}

/// First result in rank order hosted on one of `domains`.
pub fn select_allowlisted<'a>(
    results: &'a [SearchResult],
    domains: &[String],
) -> Option<&'a SearchResult> {
    results
        .iter()
        .find(|r| domains.iter().any(|d| r.is_hosted_on(d)))
}

pub struct CandidateSelector {
    config: SelectorConfig,
    fetcher: Arc<dyn DocumentFetcher>,
    judge: Option<Arc<dyn ChatModel>>,
}

impl CandidateSelector {
    pub fn new(
        config: SelectorConfig,
        fetcher: Arc<dyn DocumentFetcher>,
        judge: Option<Arc<dyn ChatModel>>,
    ) -> Self {
        Self {
            config,
            fetcher,
            judge,
        }
    }

    pub fn policy(&self) -> SelectionPolicy {
        self.config.policy
    }

    pub async fn select(&self, results: &[SearchResult]) -> Result<Option<Candidate>> {
        match self.config.policy {
            SelectionPolicy::Allowlist => Ok(self.select_by_allowlist(results)),
            SelectionPolicy::Probe => self.select_by_probe(results).await,
        }
    }

    fn select_by_allowlist(&self, results: &[SearchResult]) -> Option<Candidate> {
        let chosen = select_allowlisted(results, &self.config.allowed_domains);

        match chosen {
            Some(result) => info!("Allowlisted candidate selected: {}", result.url),
            None => info!(
                "None of {} results is hosted on an allowlisted domain",
                results.len()
            ),
        }

        chosen.map(|result| Candidate {
            result: result.clone(),
            document: None,
        })
    }

    async fn select_by_probe(&self, results: &[SearchResult]) -> Result<Option<Candidate>> {
        for (rank, result) in results.iter().enumerate() {
            debug!("Probing result #{}: {}", rank + 1, result.url);

            let document = match self.fetcher.fetch(&result.url).await {
                Ok(doc) => doc,
                Err(e) => {
                    warn!("Skipping {}: {}", result.url, e);
                    continue;
                }
            };

            if document.is_empty() {
                warn!("Skipping {}: no extractable text", result.url);
                continue;
            }

            if self.validate(&document).await {
                info!("Probed candidate accepted: {}", result.url);
                return Ok(Some(Candidate {
                    result: result.clone(),
                    document: Some(document),
                }));
            }

            info!("Probed candidate rejected: {}", result.url);
        }

        Ok(None)
    }

    async fn validate(&self, document: &ExtractedDocument) -> bool {
        match self.config.probe_validation {
            ProbeValidation::None => true,
            ProbeValidation::Headings => {
                looks_like_package_insert(&document.text, self.config.min_heading_matches)
            }
            ProbeValidation::Model => self.ask_model(document).await,
        }
    }

    async fn ask_model(&self, document: &ExtractedDocument) -> bool {
        let Some(judge) = &self.judge else {
            warn!("Model validation requested without a model; rejecting candidate");
            return false;
        };

        let excerpt: String = document.text.chars().take(RELEVANCE_EXCERPT_CHARS).collect();
        let request = CompletionRequest {
            prompt: relevance_prompt(&excerpt),
            max_tokens: 512,
            temperature: 0.0,
        };

        match judge.complete(request).await {
            Ok(reply) => is_affirmative(&strip_reasoning(&reply)),
            Err(e) => {
                warn!("Relevance check failed for {}: {}", document.source_url, e);
                false
            }
        }
    }
}
