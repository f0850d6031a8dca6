// file: src/extractor/fetcher.rs
// description: HTTP retrieval of candidate pages with content-type and timeout checks
// reference: https://docs.rs/reqwest

use super::html::HtmlExtractor;
use crate::config::FetchConfig;
use crate::error::{PipelineError, Result};
use crate::models::ExtractedDocument;
use crate::utils::Validator;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, warn};

/// Fetches a URL and returns its extracted, budgeted text.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<ExtractedDocument>;
}

pub struct HttpFetcher {
    client: Client,
    extractor: HtmlExtractor,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| PipelineError::Config(format!("Failed to build fetch client: {}", e)))?;

        Ok(Self {
            client,
            extractor: HtmlExtractor::new(config.max_chars),
        })
    }

    /// Only HTML bodies are extracted. Servers that omit the header are
    /// treated as HTML.
    fn ensure_html(url: &str, content_type: Option<&str>) -> Result<()> {
        let Some(raw) = content_type else {
            return Ok(());
        };

        let mime = raw
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match mime.as_str() {
            "text/html" | "application/xhtml+xml" => Ok(()),
            _ => Err(PipelineError::UnsupportedContent {
                url: url.to_string(),
                content_type: raw.to_string(),
            }),
        }
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<ExtractedDocument> {
        Validator::validate_url(url)?;
        debug!("Fetching {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            let message = if e.is_timeout() {
                "request timed out".to_string()
            } else {
                e.to_string()
            };
            warn!("Fetch failed for {}: {}", url, message);
            PipelineError::fetch(url, message)
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::fetch(url, format!("HTTP status {}", status)));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        Self::ensure_html(url, content_type.as_deref())?;

        let body = response
            .text()
            .await
            .map_err(|e| PipelineError::fetch(url, format!("Failed to read body: {}", e)))?;

        let document = self.extractor.extract(url, &body);

        debug!(
            "Extracted {} characters from {} (truncated: {})",
            document.char_len(),
            url,
            document.truncated
        );

        Ok(document)
    }
}
