// file: src/models/document.rs
// description: extracted package-insert text bounded to a character budget
// reference: internal data structures

use serde::{Deserialize, Serialize};

/// Appended to text cut at a character budget.
pub const TRUNCATION_MARKER: &str = "...";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    pub source_url: String,
    pub text: String,
    pub truncated: bool,
}

impl ExtractedDocument {
    /// Builds a document from raw extracted text, cutting it to `max_chars`
    /// characters plus the truncation marker when it is longer.
    pub fn new(source_url: impl Into<String>, text: String, max_chars: usize) -> Self {
        let (text, truncated) = truncate_chars(text, max_chars);
        Self {
            source_url: source_url.into(),
            text,
            truncated,
        }
    }

    /// Length in characters, which is what the HTTP responses report.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Cuts `text` to at most `max_chars` characters followed by
/// [`TRUNCATION_MARKER`]. Returns whether a cut happened.
pub fn truncate_chars(text: String, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => {
            let mut cut = text;
            cut.truncate(byte_idx);
            cut.push_str(TRUNCATION_MARKER);
            (cut, true)
        }
        None => (text, false),
    }
}
