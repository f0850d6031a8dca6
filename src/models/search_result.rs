// file: src/models/search_result.rs
// description: ranked web search hit returned by the search gateway
// reference: Used as input to candidate selection

use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

impl SearchResult {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
        }
    }

    /// Lowercased host of the result URL, if it parses.
    pub fn host(&self) -> Option<String> {
        Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
    }

    /// True when the host equals `domain` or is one of its subdomains.
    pub fn is_hosted_on(&self, domain: &str) -> bool {
        let domain = domain.trim().trim_start_matches('.').to_lowercase();
        if domain.is_empty() {
            return false;
        }

        match self.host() {
            Some(host) => {
                let host = host.trim_start_matches("www.");
                host == domain || host.ends_with(&format!(".{}", domain))
            }
            None => false,
        }
    }
}
