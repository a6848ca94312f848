// src/heuristics/normalize.rs

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Canonical form used for all keyword and alias matching: NFKD
/// decomposition, combining marks stripped, upper-cased, trimmed.
///
/// Total function — empty input yields an empty string.
pub fn normalize(s: &str) -> String {
    s.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_uppercase()
        .trim()
        .to_string()
}
