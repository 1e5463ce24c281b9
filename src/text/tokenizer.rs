use regex::Regex;
use std::sync::OnceLock;

// Terminator followed by whitespace. The character after the match decides
// whether it is a sentence boundary.
fn boundary_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?]\s+").expect("sentence boundary pattern"))
}

fn strip_punct_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s'\-]").expect("punctuation pattern"))
}

fn trailing_punct_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w]+$").expect("trailing punctuation pattern"))
}

/// Titles that end in a period without ending the sentence.
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "sra", "srta", "jr", "st", "hr", "fr", "nr", "vs",
];

// May precede the capital that opens a sentence.
const OPENERS: &[char] = &['¿', '¡', '"', '\'', '«', '“', '‘', '('];

/// Splits a paragraph on `.`, `!` or `?` followed by whitespace and an
/// uppercase letter, optionally behind an opening mark such as `¿`. A period
/// after a known title (`Mr.`, `Dr.`) does not end a sentence.
///
/// Blank input yields no sentences. Non-blank input always yields at least one.
pub fn split_into_sentences(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let mut out = Vec::new();
    let mut start = 0usize;

    for m in boundary_re().find_iter(trimmed) {
        let next_upper = trimmed[m.end()..]
            .chars()
            .find(|c| !OPENERS.contains(c))
            .map(char::is_uppercase)
            .unwrap_or(false);
        if !next_upper {
            continue;
        }

        // Terminators are single-byte ASCII, so the sentence ends one byte in.
        let end = m.start() + 1;
        if trimmed.as_bytes()[m.start()] == b'.' && ends_with_abbreviation(&trimmed[start..m.start()]) {
            continue;
        }

        let piece = trimmed[start..end].trim();
        if !piece.is_empty() {
            out.push(piece.to_string());
        }
        start = m.end();
    }

    let tail = trimmed[start..].trim();
    if !tail.is_empty() {
        out.push(tail.to_string());
    }

    if out.is_empty() {
        out.push(trimmed.to_string());
    }
    out
}

fn ends_with_abbreviation(before_period: &str) -> bool {
    match before_period.split_whitespace().last() {
        Some(last) => ABBREVIATIONS.contains(&last.to_lowercase().as_str()),
        None => false,
    }
}

/// Whitespace tokens with punctuation kept attached.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(String::from).collect()
}

/// Whitespace tokens with surrounding punctuation removed, in original order.
/// Apostrophes survive at the edges; inner hyphens and apostrophes are kept.
pub fn tokenize_clean(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(clean_word)
        .filter(|w| !w.is_empty())
        .map(String::from)
        .collect()
}

/// A single word without its edge punctuation, as `tokenize_clean` yields it.
pub fn clean_word(word: &str) -> &str {
    word.trim_matches(|c: char| !(c.is_alphanumeric() || c == '_' || c == '\''))
}

/// Splits a merged target on `-`. Parts lose surrounding punctuation and empty
/// parts are dropped. A word without a hyphen comes back unchanged.
pub fn split_hyphenated(word: &str) -> Vec<String> {
    if !word.contains('-') {
        return vec![word.to_string()];
    }

    word.split('-')
        .map(clean_word)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

/// Trimmed, lowercased form used when matching words across texts.
pub fn normalize_word(word: &str) -> String {
    word.trim().to_lowercase()
}

/// Lowercased words with punctuation removed except apostrophes and hyphens.
pub fn extract_normalized_words(text: &str) -> Vec<String> {
    let stripped = strip_punct_re().replace_all(text, "");
    stripped
        .to_lowercase()
        .split_whitespace()
        .map(String::from)
        .collect()
}

/// `("world!", "")` style split of a word and its trailing punctuation.
pub fn split_trailing_punctuation(word: &str) -> (&str, &str) {
    match trailing_punct_re().find(word) {
        Some(m) => (&word[..m.start()], m.as_str()),
        None => (word, ""),
    }
}
