//! Fuzzy correction of extracted medicine names against the canonical
//! vocabulary.
//!
//! Each token of an extracted name is scored independently against every
//! vocabulary entry on a 0–100 normalized Levenshtein scale and replaced by
//! the best entry only when the score strictly exceeds
//! [`CORRECTION_THRESHOLD`]. The score function and threshold are behavioral
//! contracts, not tuning knobs; downstream records depend on them.

use std::sync::LazyLock;

use regex::Regex;

use crate::vocabulary::CanonicalVocabulary;

/// A token is corrected only when its best score strictly exceeds this.
/// A score of exactly 85 passes the token through unchanged.
pub const CORRECTION_THRESHOLD: u8 = 85;

/// Word tokens: alphanumeric runs with internal hyphens, periods, and
/// apostrophes kept inside the token, so "co-amoxiclav" and "B.P." survive
/// as single tokens where a naive whitespace split would shred them.
static WORD_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{L}\p{N}]+(?:['.\-][\p{L}\p{N}]+)*").unwrap());

/// Split a medicine-name string into word tokens.
pub fn tokenize(name: &str) -> Vec<&str> {
    WORD_TOKEN.find_iter(name).map(|m| m.as_str()).collect()
}

/// Normalized Levenshtein similarity on a 0–100 scale, case-insensitive.
///
/// `round(100 * (1 - distance / max_len))`: identical strings score 100,
/// entirely different strings score 0.
pub fn similarity(a: &str, b: &str) -> u8 {
    let ratio = strsim::normalized_levenshtein(&a.to_lowercase(), &b.to_lowercase());
    (ratio * 100.0).round() as u8
}

/// Correct each token of a medicine-name string independently.
///
/// Returns the corrected tokens in input order. A multi-word name comes back
/// as multiple tokens, not re-joined; the caller decides how to store them
/// (see the parser's single-vs-array rule). With an empty vocabulary every
/// token passes through unchanged.
pub fn correct_name(name: &str, vocabulary: &CanonicalVocabulary) -> Vec<String> {
    tokenize(name)
        .into_iter()
        .map(|token| match best_match(token, vocabulary) {
            Some(entry) => entry.to_string(),
            None => {
                tracing::debug!(token, "no vocabulary match above threshold, passing through");
                token.to_string()
            }
        })
        .collect()
}

/// Best vocabulary entry for one token, or `None` when nothing scores above
/// the threshold. Ties resolve to the first entry in vocabulary order.
fn best_match<'a>(token: &str, vocabulary: &'a CanonicalVocabulary) -> Option<&'a str> {
    let mut best_entry: Option<&str> = None;
    let mut best_score = 0u8;
    for entry in vocabulary.entries() {
        let score = similarity(token, entry);
        if score > best_score {
            best_score = score;
            best_entry = Some(entry);
        }
    }
    if best_score > CORRECTION_THRESHOLD {
        best_entry
    } else {
        None
    }
}
