// file: src/extractor/html.rs
// description: visible-text extraction from package-insert HTML pages
// reference: https://docs.rs/scraper

use crate::models::ExtractedDocument;
use scraper::{ElementRef, Html, Selector};

/// Elements whose whole subtree carries no reader-facing text.
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "nav", "header", "footer"];

pub struct HtmlExtractor {
    max_chars: usize,
}

impl HtmlExtractor {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    pub fn extract(&self, source_url: &str, html: &str) -> ExtractedDocument {
        let text = extract_text(html);
        ExtractedDocument::new(source_url, text, self.max_chars)
    }
}

/// Collects trimmed text blocks under `<body>` (or the whole document when no
/// body is present), joined by newlines.
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let root = Selector::parse("body")
        .ok()
        .and_then(|sel| document.select(&sel).next())
        .unwrap_or_else(|| document.root_element());

    let mut blocks = Vec::new();
    collect_blocks(root, &mut blocks);
    blocks.join("\n")
}

fn collect_blocks(element: ElementRef<'_>, blocks: &mut Vec<String>) {
    for child in element.children() {
        if let Some(child_el) = ElementRef::wrap(child) {
            let name = child_el.value().name();
            if SKIPPED_ELEMENTS.contains(&name) {
                continue;
            }
            collect_blocks(child_el, blocks);
        } else if let Some(text) = child.value().as_text() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                blocks.push(trimmed.to_string());
            }
        }
    }
}
