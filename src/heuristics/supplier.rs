// src/heuristics/supplier.rs

use super::normalize::normalize;
use super::patterns::{
    ADDRESS_OR_AMOUNT, CORP_SUFFIX_PATTERNS, PLAUSIBLE_HEADER, SUPPLIER_SKIP_WORDS,
};

/// How many document lines the header scan inspects.
const HEADER_SCAN_LINES: usize = 35;

/// Longest supplier name returned before truncation.
const MAX_SUPPLIER_LEN: usize = 60;

/// Recognized supplier aliases in registration order. Order is part of
/// the contract: the first alias whose normalized form appears in the
/// text wins, so more specific aliases must be registered before any
/// alias they contain.
pub const KNOWN_SUPPLIERS: &[(&str, &str)] = &[
    ("OUIGO", "OUIGO ESPAÑA S.A.U."),
    ("SUPRACAFE", "SUPRACAFE"),
    ("MERCADONA", "MERCADONA S.A."),
    ("CARREFOUR", "CARREFOUR"),
    ("MAKRO", "MAKRO"),
    ("DIA", "DIA S.A."),
    ("LIDL", "LIDL"),
    ("EROSKI", "EROSKI"),
    ("EHOSA", "EHOSA"),
    ("COCA COLA", "COCA-COLA"),
];

/// Resolve the supplier name: known-alias lookup first, then
/// legal-entity-suffix patterns over the document header, then a
/// plausible-header-line fallback. Returns `None` when nothing
/// qualifies.
pub fn detect(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }

    let text_normalized = normalize(text);
    for (alias, canonical) in KNOWN_SUPPLIERS {
        if text_normalized.contains(&normalize(alias)) {
            return Some((*canonical).to_string());
        }
    }

    let lines = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(HEADER_SCAN_LINES);

    for line in lines {
        let line_normalized = normalize(line);
        if SUPPLIER_SKIP_WORDS.iter().any(|w| line_normalized.contains(w)) {
            continue;
        }

        for pattern in CORP_SUFFIX_PATTERNS.iter() {
            if let Some(caps) = pattern.captures(line) {
                return Some(clean_company_name(&caps[1]));
            }
        }

        // A short all-caps line with no address/amount markers is most
        // likely the letterhead.
        let len = line_normalized.chars().count();
        if (4..=MAX_SUPPLIER_LEN).contains(&len)
            && PLAUSIBLE_HEADER.is_match(&line_normalized)
            && !ADDRESS_OR_AMOUNT.is_match(&line_normalized)
        {
            return Some(line.to_string());
        }
    }

    None
}

/// Collapse runs of whitespace, strip trailing punctuation and truncate
/// over-long names with an ellipsis marker.
fn clean_company_name(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let trimmed = collapsed.trim_end_matches(['-', '.', ',']).trim();
    if trimmed.chars().count() > MAX_SUPPLIER_LEN {
        let head: String = trimmed.chars().take(MAX_SUPPLIER_LEN).collect();
        format!("{head}...")
    } else {
        trimmed.to_string()
    }
}
