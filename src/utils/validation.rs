// file: src/utils/validation.rs
// description: request field validation helpers
// reference: input validation patterns

use crate::error::{PipelineError, Result};

/// Longest drug name accepted as a search term.
const MAX_DRUG_NAME_CHARS: usize = 200;

pub struct Validator;

impl Validator {
    /// Returns the trimmed value, or an input error naming `field`.
    pub fn require<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str> {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => Ok(v),
            _ => Err(PipelineError::Input(format!("{} is required", field))),
        }
    }

    pub fn validate_drug_name(name: &str) -> Result<&str> {
        let name = Self::require("drug name", Some(name))?;

        if name.chars().count() > MAX_DRUG_NAME_CHARS {
            return Err(PipelineError::Input(format!(
                "drug name is longer than {} characters",
                MAX_DRUG_NAME_CHARS
            )));
        }

        if name.chars().any(char::is_control) {
            return Err(PipelineError::Input(
                "drug name contains control characters".to_string(),
            ));
        }

        Ok(name)
    }

    pub fn validate_url(url: &str) -> Result<()> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(PipelineError::fetch(url, "invalid URL scheme"));
        }
        Ok(())
    }
}
