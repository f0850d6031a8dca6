// file: src/search/duckduckgo.rs
// description: DuckDuckGo HTML endpoint search provider
// reference: https://html.duckduckgo.com/html/

use super::SearchProvider;
use crate::config::SearchConfig;
use crate::error::{PipelineError, Result};
use crate::models::SearchResult;
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, warn};

pub struct DuckDuckGoProvider {
    client: Client,
    endpoint: String,
    region: String,
    safe_search: &'static str,
}

impl DuckDuckGoProvider {
    pub fn new(config: &SearchConfig, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(config.timeout())
            .build()
            .map_err(|e| PipelineError::Config(format!("Failed to build search client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            region: config.region.clone(),
            safe_search: config.safe_search.as_param(),
        })
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoProvider {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", query),
                ("kl", self.region.as_str()),
                ("kp", self.safe_search),
            ])
            .header("Accept", "text/html,application/xhtml+xml")
            .send()
            .await
            .map_err(|e| PipelineError::Provider(format!("DuckDuckGo request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            warn!("DuckDuckGo responded with status {}", status);
            return Err(PipelineError::Provider(format!(
                "DuckDuckGo responded with status {}",
                status
            )));
        }

        let html = response.text().await.map_err(|e| {
            PipelineError::Provider(format!("Failed to read DuckDuckGo response: {}", e))
        })?;

        let results = parse_results(&html, max_results);
        debug!("Parsed {} DuckDuckGo results", results.len());
        Ok(results)
    }
}

fn parse_results(html: &str, max_results: usize) -> Vec<SearchResult> {
    let document = Html::parse_document(html);

    let (Ok(result_sel), Ok(link_sel), Ok(snippet_sel)) = (
        Selector::parse("div.result"),
        Selector::parse("a.result__a"),
        Selector::parse(".result__snippet"),
    ) else {
        return Vec::new();
    };

    let mut results: Vec<SearchResult> = Vec::new();

    for block in document.select(&result_sel) {
        if results.len() >= max_results {
            break;
        }

        let is_ad = block
            .value()
            .classes()
            .any(|c| c == "result--ad" || c == "result--ad--small");
        if is_ad {
            continue;
        }

        let Some(link) = block.select(&link_sel).next() else {
            continue;
        };

        let Some(url) = link.value().attr("href").and_then(clean_redirect_url) else {
            continue;
        };

        let title = collapse_whitespace(&link.text().collect::<String>());
        if title.is_empty() || results.iter().any(|r| r.url == url) {
            continue;
        }

        let snippet = block
            .select(&snippet_sel)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .unwrap_or_default();

        results.push(SearchResult::new(title, url, snippet));
    }

    results
}

/// Resolves DuckDuckGo `/l/?uddg=` redirect links to their target.
fn clean_redirect_url(href: &str) -> Option<String> {
    let href = href.trim();
    let absolute = if let Some(rest) = href.strip_prefix("//") {
        format!("https://{}", rest)
    } else if href.starts_with('/') {
        format!("https://duckduckgo.com{}", href)
    } else {
        href.to_string()
    };

    let parsed = url::Url::parse(&absolute).ok()?;

    if parsed
        .host_str()
        .is_some_and(|h| h.ends_with("duckduckgo.com"))
        && parsed.path().starts_with("/l/")
    {
        return parsed
            .query_pairs()
            .find(|(k, _)| k == "uddg")
            .map(|(_, v)| v.into_owned())
            .filter(|target| target.starts_with("http"));
    }

    matches!(parsed.scheme(), "http" | "https").then_some(absolute)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
