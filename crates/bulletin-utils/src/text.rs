//! Text cleanup and similarity scoring.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Normalize scraped text: decode the common HTML entities, collapse runs of
/// whitespace to a single space, and trim.
///
/// This is the only repair the pipeline applies to titles; anything beyond
/// it is a validation drop, not a fix.
pub fn clean_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let decoded = text
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"");

    WHITESPACE.replace_all(&decoded, " ").trim().to_string()
}

/// Jaccard similarity over lowercased whitespace tokens, in `[0, 1]`.
pub fn token_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let tokens_a: HashSet<String> = a.to_lowercase().split_whitespace().map(String::from).collect();
    let tokens_b: HashSet<String> = b.to_lowercase().split_whitespace().map(String::from).collect();

    if tokens_a.is_empty() && tokens_b.is_empty() {
        return 1.0;
    }

    let intersection = tokens_a.intersection(&tokens_b).count();
    let union = tokens_a.union(&tokens_b).count();
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}
