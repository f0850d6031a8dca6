// file: src/extractor/mod.rs
// description: document fetching and text extraction exports
// reference: internal module structure

mod fetcher;
mod html;

pub use fetcher::{DocumentFetcher, HttpFetcher};
pub use html::{HtmlExtractor, extract_text};

#[cfg(test)]
pub(crate) mod testing {
    use super::DocumentFetcher;
    use crate::error::{PipelineError, Result};
    use crate::models::ExtractedDocument;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves canned page text per URL and records which URLs were fetched.
    /// Unknown URLs fail with a fetch error.
    #[derive(Default)]
    pub struct FakeFetcher {
        pages: HashMap<String, String>,
        max_chars: usize,
        fetched: Mutex<Vec<String>>,
    }

    impl FakeFetcher {
        pub fn new() -> Self {
            Self {
                max_chars: 50_000,
                ..Self::default()
            }
        }

        pub fn with_page(mut self, url: &str, text: &str) -> Self {
            self.pages.insert(url.to_string(), text.to_string());
            self
        }

        pub fn fetched(&self) -> Vec<String> {
            self.fetched.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DocumentFetcher for FakeFetcher {
        async fn fetch(&self, url: &str) -> Result<ExtractedDocument> {
            self.fetched.lock().unwrap().push(url.to_string());
            match self.pages.get(url) {
                Some(text) => Ok(ExtractedDocument::new(url, text.clone(), self.max_chars)),
                None => Err(PipelineError::fetch(url, "connection refused")),
            }
        }
    }
}
