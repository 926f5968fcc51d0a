//! Identifier-aware normalization
//!
//! Applied before the strategy ladder runs so that visually-identical
//! identifiers (mixed case, NFC-equivalent accents, `0`/`O`, `1`/`I`
//! confusions) compare equal regardless of which glyphs were typed.

use unicode_normalization::UnicodeNormalization;

const MIN_IDENTIFIER_LEN: usize = 2;
const MAX_IDENTIFIER_LEN: usize = 12;

/// NFC-normalize and lowercase a string for vocabulary indexing and querying.
pub fn nfc_lower(s: &str) -> String {
    s.nfc().collect::<String>().to_lowercase()
}

/// `true` if, once NFC-normalized, `s` looks like a short alphanumeric
/// identifier rather than free text (no whitespace or punctuation).
pub fn looks_like_identifier(s: &str) -> bool {
    let len = s.chars().count();
    if !(MIN_IDENTIFIER_LEN..=MAX_IDENTIFIER_LEN).contains(&len) {
        return false;
    }
    s.nfc().all(|c| c.is_alphanumeric())
}

/// Canonicalize an identifier by folding common homoglyphs: `0`↔`o`, `1`↔`i`/`l`.
/// Input is expected to already be NFC-normalized and lowercased.
pub fn homoglyph_fold(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '0' => 'o',
            '1' => 'i',
            'l' => 'i',
            other => other,
        })
        .collect()
}

/// `true` if `query` and `item` (raw, not yet normalized) are the same
/// identifier once NFC-normalized, lowercased, and homoglyph-folded.
pub fn identifiers_equal(query: &str, item: &str) -> bool {
    if !looks_like_identifier(query) || !looks_like_identifier(item) {
        return false;
    }
    let q = homoglyph_fold(&nfc_lower(query));
    let i = homoglyph_fold(&nfc_lower(item));
    q == i
}
