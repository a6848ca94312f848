// src/heuristics/mod.rs

mod confidence;
mod normalize;
mod patterns;
mod scanner;
mod score;
mod supplier;

pub use score::score_invoice_number;

use serde::Deserialize;
use serde::Serialize;

/// Below this many characters the text is assumed to come from a
/// scanned PDF with no extractable layer.
const MIN_MEANINGFUL_TEXT: usize = 30;

/// Everything the heuristic pass can say about one document. Produced
/// fresh per extraction; the reconciliation step builds a new value
/// rather than mutating this one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub invoice_number: Option<String>,
    pub supplier: Option<String>,
    pub confidence: f64,
    pub notes: Vec<String>,
}

impl ExtractionResult {
    /// Copy with one more diagnostic note appended.
    pub fn with_note(mut self, note: &str) -> Self {
        self.notes.push(note.to_string());
        self
    }
}

/// Best invoice-number candidate for the raw text, if any survives
/// scoring.
pub fn extract_invoice_number(text: &str) -> Option<String> {
    score::best_candidate(&scanner::scan(text))
}

/// Supplier name, via alias table / legal-suffix / header-line lookup.
pub fn detect_supplier(text: &str) -> Option<String> {
    supplier::detect(text)
}

/// Confidence for an arbitrary (text, fields) combination — used by the
/// reconciliation step to re-estimate after merging.
pub fn confidence_for(text: &str, invoice_number: Option<&str>, supplier: Option<&str>) -> f64 {
    confidence::score_confidence(text, invoice_number, supplier)
}

/// Full local extraction pass. Total: any input, including the empty
/// string, yields a result — missing fields become diagnostic notes,
/// never errors.
pub fn extract(text: &str) -> ExtractionResult {
    let invoice_number = extract_invoice_number(text);
    let supplier = detect_supplier(text);
    let confidence =
        confidence::score_confidence(text, invoice_number.as_deref(), supplier.as_deref());

    let mut notes = Vec::new();
    if text.chars().count() < MIN_MEANINGFUL_TEXT {
        notes.push("Texto muy corto (posible PDF escaneado).".to_string());
    }
    if invoice_number.is_none() {
        notes.push("No se detectó número de factura.".to_string());
    }
    if supplier.is_none() {
        notes.push("No se detectó proveedor.".to_string());
    }

    ExtractionResult {
        invoice_number,
        supplier,
        confidence,
        notes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
MERCADONA, S.A.
Avda. Blasco Ibáñez 44, Valencia
FACTURA Nº FV-2024-00531
Fecha: 12/03/2024
Base imponible: 118,40
Total: 143,26 EUR
";

    #[test]
    fn empty_text_gives_base_confidence_and_notes() {
        let result = extract("");
        assert_eq!(result.invoice_number, None);
        assert_eq!(result.supplier, None);
        assert_eq!(result.confidence, 0.5);
        assert!(result.notes.iter().any(|n| n.contains("Texto muy corto")));
        assert!(
            result
                .notes
                .iter()
                .any(|n| n.contains("No se detectó número de factura"))
        );
    }

    #[test]
    fn end_to_end_labeled_invoice() {
        let result = extract(SAMPLE);
        assert_eq!(result.invoice_number.as_deref(), Some("FV-2024-00531"));
        assert_eq!(result.supplier.as_deref(), Some("MERCADONA S.A."));
        assert!(result.confidence >= 0.85);
        assert!(result.confidence <= 0.99);
        assert!(result.notes.is_empty());
    }

    #[test]
    fn phone_and_tax_id_do_not_win() {
        let text = "\
EHOSA
CIF: A28369898
Tel: 912345678
FACTURA Nº T-88412
";
        let result = extract(text);
        assert_eq!(result.invoice_number.as_deref(), Some("T-88412"));
        assert_eq!(result.supplier.as_deref(), Some("EHOSA"));
    }

    #[test]
    fn extraction_is_idempotent() {
        let first = extract(SAMPLE);
        let second = extract(SAMPLE);
        assert_eq!(first, second);
    }

    #[test]
    fn confidence_always_in_range() {
        for text in ["", "x", SAMPLE, "solo prosa sin datos útiles"] {
            let result = extract(text);
            assert!((0.0..=0.99).contains(&result.confidence));
        }
    }
}
