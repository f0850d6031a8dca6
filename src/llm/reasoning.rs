// file: src/llm/reasoning.rs
// description: removes model deliberation that precedes the closing reasoning marker

/// Closing tag reasoning models emit after their internal deliberation.
pub const REASONING_MARKER: &str = "</think>";

/// Keeps only the text after the last reasoning marker, trimmed. Output with no
/// marker is returned trimmed.
pub fn strip_reasoning(raw: &str) -> String {
    match raw.rfind(REASONING_MARKER) {
        Some(idx) => raw[idx + REASONING_MARKER.len()..].trim().to_string(),
        None => raw.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_text_after_marker() {
        let raw = "<think>Kullanıcı özet istiyor.</think>\n\n  Parol ağrı kesicidir.  ";
        assert_eq!(strip_reasoning(raw), "Parol ağrı kesicidir.");
    }

    #[test]
    fn test_uses_last_marker() {
        let raw = "<think>a</think> ara </think>\nson cevap";
        assert_eq!(strip_reasoning(raw), "son cevap");
    }

    #[test]
    fn test_without_marker_returns_trimmed_raw() {
        assert_eq!(strip_reasoning("  düz cevap\n"), "düz cevap");
    }

    #[test]
    fn test_marker_at_end_yields_empty() {
        assert_eq!(strip_reasoning("<think>sadece düşünce</think>   "), "");
    }
}
