// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{PipelineError, Result};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable the hosted inference token is read from when the
/// config sources leave `llm.api_key` empty.
pub const API_TOKEN_ENV: &str = "HF_TOKEN";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub search: SearchConfig,
    pub selector: SelectorConfig,
    pub fetch: FetchConfig,
    pub llm: LlmConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Answer with the fixed fallback text (and a success status) when the
    /// inference provider fails, instead of surfacing a 500.
    pub fallback_on_llm_error: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchConfig {
    pub endpoint: String,
    pub query_suffix: String,
    pub max_results: usize,
    pub region: String,
    pub safe_search: SafeSearch,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SafeSearch {
    Strict,
    Moderate,
    Off,
}

impl SafeSearch {
    /// DuckDuckGo `kp` parameter value.
    pub fn as_param(&self) -> &'static str {
        match self {
            SafeSearch::Strict => "1",
            SafeSearch::Moderate => "-1",
            SafeSearch::Off => "-2",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub policy: SelectionPolicy,
    pub allowed_domains: Vec<String>,
    pub probe_validation: ProbeValidation,
    pub min_heading_matches: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionPolicy {
    /// First result hosted on a known package-insert domain; never fetches.
    Allowlist,
    /// Fetch results in rank order until one passes validation.
    Probe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeValidation {
    None,
    Headings,
    Model,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub max_chars: usize,
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub temperature: f32,
    pub summary_max_input_chars: usize,
    pub summary_max_tokens: u32,
    pub answer_max_grounding_chars: usize,
    pub answer_max_tokens: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    pub capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:5000".to_string(),
            fallback_on_llm_error: false,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://html.duckduckgo.com/html/".to_string(),
            query_suffix: "prospektüsü".to_string(),
            max_results: 5,
            region: "wt-wt".to_string(),
            safe_search: SafeSearch::Moderate,
            timeout_secs: 15,
        }
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            policy: SelectionPolicy::Allowlist,
            allowed_domains: vec![
                "titck.gov.tr".to_string(),
                "ilacprospektusu.com".to_string(),
                "ilacrehberi.com".to_string(),
                "ilacabak.com".to_string(),
                "ilacbilgileri.com".to_string(),
                "medikalakademi.com.tr".to_string(),
            ],
            probe_validation: ProbeValidation::Headings,
            min_heading_matches: 2,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_chars: 50_000,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64; rv:120.0) Gecko/20100101 Firefox/120.0"
                .to_string(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://router.huggingface.co/v1".to_string(),
            model: "Intelligent-Internet/II-Medical-8B-1706:featherless-ai".to_string(),
            api_key: None,
            timeout_secs: 120,
            temperature: 0.7,
            summary_max_input_chars: 10_000,
            summary_max_tokens: 2048,
            answer_max_grounding_chars: 15_000,
            answer_max_tokens: 1024,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { capacity: 256 }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("PROSPECTUS")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        let mut config: Config = settings
            .try_deserialize()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        if config.llm.api_key.as_deref().is_none_or(|k| k.trim().is_empty()) {
            config.llm.api_key = std::env::var(API_TOKEN_ENV).ok();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self::default()
    }

    /// Bearer token for the inference endpoint. Only valid after `validate`.
    pub fn api_key(&self) -> &str {
        self.llm.api_key.as_deref().unwrap_or_default()
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key().trim().is_empty() {
            return Err(PipelineError::Config(format!(
                "llm.api_key is not set (use PROSPECTUS__LLM__API_KEY or {})",
                API_TOKEN_ENV
            )));
        }

        if self.search.max_results == 0 {
            return Err(PipelineError::Config(
                "search.max_results must be greater than 0".to_string(),
            ));
        }

        if self.fetch.max_chars == 0 {
            return Err(PipelineError::Config(
                "fetch.max_chars must be greater than 0".to_string(),
            ));
        }

        if self.cache.capacity == 0 {
            return Err(PipelineError::Config(
                "cache.capacity must be greater than 0".to_string(),
            ));
        }

        if self.llm.answer_max_grounding_chars == 0 {
            return Err(PipelineError::Config(
                "llm.answer_max_grounding_chars must be greater than 0".to_string(),
            ));
        }

        if self.selector.policy == SelectionPolicy::Allowlist
            && self.selector.allowed_domains.is_empty()
        {
            return Err(PipelineError::Config(
                "selector.allowed_domains cannot be empty with the allowlist policy".to_string(),
            ));
        }

        Ok(())
    }
}

impl SearchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
