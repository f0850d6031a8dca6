// file: src/selector/heuristics.rs
// description: deterministic package-insert detection from expected section headings
// reference: standard sections of Turkish patient information leaflets

/// Section headings found in Turkish package inserts, already folded.
const EXPECTED_HEADINGS: &[&str] = &[
    "kullanma talimati",
    "nedir ve ne icin kullanilir",
    "kullanmadan once dikkat edilmesi gerekenler",
    "nasil kullanilir",
    "olasi yan etkiler",
    "saklanmasi",
    "etkin madde",
    "yardimci madde",
];

/// Case-folds Turkish text so dotted and dotless `i` compare equal, along with
/// the ASCII forms of `ç ğ ö ş ü`.
pub fn fold_turkish(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            'İ' | 'I' | 'ı' | 'i' => folded.push('i'),
            '\u{307}' => {}
            'Ç' | 'ç' => folded.push('c'),
            'Ğ' | 'ğ' => folded.push('g'),
            'Ö' | 'ö' => folded.push('o'),
            'Ş' | 'ş' => folded.push('s'),
            'Ü' | 'ü' => folded.push('u'),
            other => folded.extend(other.to_lowercase()),
        }
    }
    folded
}

/// Number of expected headings present in `text`.
pub fn heading_matches(text: &str) -> usize {
    let folded = fold_turkish(text);
    EXPECTED_HEADINGS
        .iter()
        .filter(|heading| folded.contains(*heading))
        .count()
}

pub fn looks_like_package_insert(text: &str, min_matches: usize) -> bool {
    heading_matches(text) >= min_matches.max(1)
}

/// Reads a yes/no reply from the relevance check; anything else is a no.
pub fn is_affirmative(reply: &str) -> bool {
    let folded = fold_turkish(reply);
    let first_word = folded
        .split(|c: char| !c.is_alphanumeric())
        .find(|w| !w.is_empty())
        .unwrap_or_default();
    matches!(first_word, "evet" | "yes")
}
