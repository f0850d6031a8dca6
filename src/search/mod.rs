// file: src/search/mod.rs
// description: search gateway that turns a drug name into ranked candidate links
// reference: provider trait keeps the web-search backend swappable

mod duckduckgo;

pub use duckduckgo::DuckDuckGoProvider;

use crate::error::Result;
use crate::models::SearchResult;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// A web-search backend. Implementations return results in provider rank order
/// and an empty vector when nothing matched.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>>;
}

pub struct SearchGateway {
    provider: Arc<dyn SearchProvider>,
    query_suffix: String,
}

impl SearchGateway {
    pub fn new(provider: Arc<dyn SearchProvider>, query_suffix: impl Into<String>) -> Self {
        Self {
            provider,
            query_suffix: query_suffix.into(),
        }
    }

    pub fn build_query(&self, drug_name: &str) -> String {
        let name = drug_name.trim();
        if self.query_suffix.is_empty() {
            name.to_string()
        } else {
            format!("{} {}", name, self.query_suffix)
        }
    }

    pub async fn search(&self, drug_name: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        let query = self.build_query(drug_name);
        debug!("Searching for '{}'", query);

        let mut results = self.provider.search(&query, max_results).await?;
        results.truncate(max_results);

        info!("Search for '{}' returned {} results", query, results.len());
        Ok(results)
    }
}


#[cfg(test)]
pub(crate) mod testing {
    use super::SearchProvider;
    use crate::error::{PipelineError, Result};
    use crate::models::SearchResult;
    use async_trait::async_trait;

    /// Returns the same results for every query, or fails when built with
    /// `failing`.
    pub struct StaticSearch {
        results: Vec<SearchResult>,
        fail: bool,
    }

    impl StaticSearch {
        pub fn new(urls: &[&str]) -> Self {
            Self {
                results: urls
                    .iter()
                    .enumerate()
                    .map(|(i, url)| SearchResult::new(format!("Sonuç {}", i + 1), *url, ""))
                    .collect(),
                fail: false,
            }
        }

        pub fn failing() -> Self {
            Self {
                results: Vec::new(),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl SearchProvider for StaticSearch {
        async fn search(&self, _query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
            if self.fail {
                return Err(PipelineError::Provider("search backend down".to_string()));
            }
            Ok(self.results.iter().take(max_results).cloned().collect())
        }
    }
}
