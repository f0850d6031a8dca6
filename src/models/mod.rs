// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod document;
pub mod search_result;
pub mod summary;

pub use document::{ExtractedDocument, TRUNCATION_MARKER, truncate_chars};
pub use search_result::SearchResult;
pub use summary::{Answer, Summary};
