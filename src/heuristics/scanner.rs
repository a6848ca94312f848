// src/heuristics/scanner.rs

use super::normalize::normalize;
use super::patterns::{INVOICE_CONTEXT_WORDS, INVOICE_PATTERNS, LOOSE_TOKEN};

/// Radius of the context window captured around each pattern match.
const CONTEXT_RADIUS: usize = 60;

/// A proposed invoice-number substring together with the text that
/// surrounds it. Candidates only live for the duration of one
/// extraction call.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub value: String,
    pub context: String,
}

/// Run the ordered pattern list, then the keyword-anchored line scan,
/// over the raw text. Output order is pattern-list order, then
/// left-to-right within each pattern; duplicates are kept on purpose —
/// the same string seen with a stronger context should get the chance
/// to outscore its weaker sibling.
pub fn scan(text: &str) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    if text.is_empty() {
        return candidates;
    }

    for pattern in INVOICE_PATTERNS.iter() {
        for caps in pattern.captures_iter(text) {
            let full = caps.get(0).unwrap();
            let value = caps.get(1).map_or(full.as_str(), |m| m.as_str());
            let context = context_window(text, full.start(), full.end());
            candidates.push(Candidate {
                value: value.trim().to_string(),
                context: context.to_string(),
            });
        }
    }

    // Keyword-anchored pass: any line mentioning an invoice label gets
    // itself and the following line re-scanned with the loose token
    // pattern, with the label line serving as context.
    let lines: Vec<&str> = text.lines().collect();
    for (i, line) in lines.iter().enumerate() {
        let normalized = normalize(line);
        if !INVOICE_CONTEXT_WORDS.iter().any(|w| normalized.contains(w)) {
            continue;
        }
        let next = lines.get(i + 1).copied().unwrap_or("");
        for scan_line in [*line, next] {
            for m in LOOSE_TOKEN.find_iter(scan_line) {
                candidates.push(Candidate {
                    value: m.as_str().trim().to_string(),
                    context: line.to_string(),
                });
            }
        }
    }

    candidates
}

/// Symmetric ±60-char slice around a match, clipped to text bounds and
/// snapped to char boundaries.
fn context_window(text: &str, start: usize, end: usize) -> &str {
    let from = floor_char_boundary(text, start.saturating_sub(CONTEXT_RADIUS));
    let to = ceil_char_boundary(text, (end + CONTEXT_RADIUS).min(text.len()));
    &text[from..to]
}

fn floor_char_boundary(s: &str, mut i: usize) -> usize {
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

fn ceil_char_boundary(s: &str, mut i: usize) -> usize {
    while i < s.len() && !s.is_char_boundary(i) {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_labeled_series_code() {
        let text = "FACTURA Nº FV-2024-00531\nTotal: 120,00 €";
        let candidates = scan(text);
        assert!(candidates.iter().any(|c| c.value == "FV-2024-00531"));
    }

    #[test]
    fn context_carries_the_label() {
        let text = "FACTURA Nº FV-2024-00531";
        let candidates = scan(text);
        let c = candidates
            .iter()
            .find(|c| c.value == "FV-2024-00531")
            .unwrap();
        assert!(c.context.contains("FACTURA"));
    }

    #[test]
    fn line_scan_reaches_the_following_line() {
        // Label on one line, value on the next — only the line scan
        // pairs them up with the label as context.
        let text = "Número de factura:\nAX-99812\n";
        let candidates = scan(text);
        let c = candidates.iter().find(|c| c.value == "AX-99812").unwrap();
        assert!(normalize(&c.context).contains("FACTURA"));
    }

    #[test]
    fn empty_text_yields_nothing() {
        assert!(scan("").is_empty());
    }

    #[test]
    fn context_window_clips_at_accented_chars() {
        // A window edge falling inside a multi-byte char must not panic.
        let text = "ñññññññññññññññññññññññññññññññ 1234567 ñññññññññññññññññññ";
        let _ = scan(text);
    }

    #[test]
    fn duplicates_from_different_patterns_are_kept() {
        let text = "FACTURA FV-2024-00531";
        let candidates = scan(text);
        let hits = candidates
            .iter()
            .filter(|c| c.value == "FV-2024-00531")
            .count();
        assert!(hits > 1);
    }
}
