// src/heuristics/confidence.rs

use super::patterns::INVOICE_DOC_KEYWORD;

/// Ceiling — a heuristic result never reaches certainty.
const MAX_CONFIDENCE: f64 = 0.99;

/// Overall confidence for an extraction: 0.5 base, +0.25 per field
/// found, +0.10 when the invoice number is backed by an explicit
/// "factura"/"invoice" mention anywhere in the document.
pub fn score_confidence(
    text: &str,
    invoice_number: Option<&str>,
    supplier: Option<&str>,
) -> f64 {
    let mut score: f64 = 0.5;
    if invoice_number.is_some() {
        score += 0.25;
    }
    if supplier.is_some() {
        score += 0.25;
    }
    if invoice_number.is_some() && INVOICE_DOC_KEYWORD.is_match(text) {
        score += 0.10;
    }
    score.min(MAX_CONFIDENCE)
}
