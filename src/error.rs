// file: src/error.rs
// description: Custom error types and result type aliases
// reference: https://docs.rs/thiserror

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Input(String),

    #[error("No package insert found for '{0}'")]
    NotFound(String),

    #[error("Fetch failed for {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Unsupported content type '{content_type}' at {url}")]
    UnsupportedContent { url: String, content_type: String },

    #[error("Search provider error: {0}")]
    Provider(String),

    #[error(transparent)]
    Summarization(#[from] SummarizationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn fetch(url: &str, message: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.to_string(),
            message: message.into(),
        }
    }

    /// Whether the failure means the prospectus could not be obtained at all,
    /// as opposed to a failure while processing one that was found.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::Fetch { .. } | Self::UnsupportedContent { .. }
        )
    }
}

/// Failures talking to the hosted chat-completion model.
#[derive(Error, Debug)]
pub enum SummarizationError {
    #[error("Inference request failed: {0}")]
    Request(String),

    #[error("Inference API returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to parse inference response: {0}")]
    Parse(String),

    #[error("Inference response contained no choices")]
    EmptyResponse,
}
