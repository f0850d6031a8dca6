// file: src/models/summary.rs
// description: derived summary and answer values returned to callers
// reference: response payloads of the summarize and question endpoints

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub text: String,
    pub source_text_length: usize,
    pub summary_length: usize,
}

impl Summary {
    pub fn new(text: String, source_text_length: usize) -> Self {
        let summary_length = text.chars().count();
        Self {
            text,
            source_text_length,
            summary_length,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub grounding_text_length: usize,
}

impl Answer {
    pub fn new(text: String, grounding_text_length: usize) -> Self {
        Self {
            text,
            grounding_text_length,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_length_in_characters() {
        let summary = Summary::new("İlaç ağrı kesicidir.".to_string(), 1200);
        assert_eq!(summary.summary_length, 20);
        assert_eq!(summary.source_text_length, 1200);
    }
}
