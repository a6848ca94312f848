// src/heuristics/score.rs

use super::normalize::normalize;
use super::patterns::{
    BARE_PHONE_DIGITS, CIF_NIF_SHAPES, HAS_SEPARATOR, INVALID_INVOICE_WORDS,
    INVOICE_CONTEXT_WORDS, LETTERS_THEN_DIGITS, LONG_DIGIT_RUN, PHONE_CONTEXT_WORDS, PHONE_SHAPE,
};
use super::scanner::Candidate;

/// Plausibility score for a (candidate, context) pair. Deterministic and
/// pure; a score of zero or less means the candidate is rejected.
///
/// Rejections are absolute: phone shapes, Spanish tax-ID shapes and
/// field-label words zero the candidate no matter how strong its
/// context. Among survivors, a context keyword is the single strongest
/// signal, and a bare digit run without one ends up implausible — that
/// is what keeps account and phone numbers from winning by coincidence.
pub fn score_invoice_number(candidate: &str, context: &str) -> i32 {
    let cand = candidate.trim();
    if cand.is_empty() {
        return 0;
    }
    let ctx = normalize(context);
    let has_context_keyword = INVOICE_CONTEXT_WORDS.iter().any(|w| ctx.contains(w));

    let mut score = 0;
    if has_context_keyword {
        score += 12;
    }

    if looks_like_phone(cand, &ctx) {
        return 0;
    }
    if looks_like_cif_nif(cand) {
        return 0;
    }
    let cand_normalized = normalize(cand);
    if INVALID_INVOICE_WORDS.iter().any(|w| cand_normalized.contains(w)) {
        return 0;
    }

    if LETTERS_THEN_DIGITS.is_match(cand) {
        score += 6;
    }
    if LONG_DIGIT_RUN.is_match(cand) {
        score += 2;
        if !has_context_keyword {
            score -= 8;
        }
    }
    if HAS_SEPARATOR.is_match(cand) {
        score += 2;
    }
    if cand.chars().any(|c| c.is_ascii_alphabetic()) {
        score += 2;
    }
    let len = cand.chars().count();
    if !(4..=25).contains(&len) {
        score -= 4;
    }
    score
}

/// Phone detection: either the full phone shape, or a bare 9–11 digit
/// run whose context mentions a phone label. `ctx` is already
/// normalized.
fn looks_like_phone(candidate: &str, ctx: &str) -> bool {
    if PHONE_SHAPE.is_match(candidate) {
        return true;
    }
    BARE_PHONE_DIGITS.is_match(candidate) && PHONE_CONTEXT_WORDS.iter().any(|w| ctx.contains(w))
}

fn looks_like_cif_nif(candidate: &str) -> bool {
    CIF_NIF_SHAPES.iter().any(|rx| rx.is_match(candidate))
}

/// Pick the best-scoring candidate, first-discovered winning ties.
/// Candidates scoring zero or less never qualify.
pub fn best_candidate(candidates: &[Candidate]) -> Option<String> {
    let mut best: Option<(&Candidate, i32)> = None;
    for candidate in candidates {
        let score = score_invoice_number(&candidate.value, &candidate.context);
        if score <= 0 {
            continue;
        }
        match best {
            Some((_, s)) if s >= score => {}
            _ => best = Some((candidate, score)),
        }
    }
    best.map(|(c, _)| c.value.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cand(value: &str, context: &str) -> Candidate {
        Candidate {
            value: value.to_string(),
            context: context.to_string(),
        }
    }

    #[test]
    fn rejects_tax_id_even_with_invoice_context() {
        assert_eq!(score_invoice_number("12345678Z", "FACTURA Nº 12345678Z"), 0);
        assert_eq!(score_invoice_number("B1234567C", "FACTURA B1234567C"), 0);
    }

    #[test]
    fn rejects_phone_shapes() {
        assert_eq!(score_invoice_number("912345678", "Tel: 912345678"), 0);
        assert_eq!(score_invoice_number("+34 612 34 56 78", "móvil"), 0);
        assert_eq!(score_invoice_number("612-345-678", "cualquier contexto"), 0);
    }

    #[test]
    fn rejects_blacklisted_words() {
        assert_eq!(score_invoice_number("CLIENTE-42", "FACTURA CLIENTE-42"), 0);
        assert_eq!(score_invoice_number("PEDIDO2024", ""), 0);
    }

    #[test]
    fn context_keyword_outranks_no_context() {
        let code = "FV-18223";
        let with = score_invoice_number(code, &format!("FACTURA: {code}"));
        let without = score_invoice_number(code, &format!("texto cualquiera {code}"));
        assert!(with > without);
    }

    #[test]
    fn bare_digit_run_needs_context_to_stay_plausible() {
        // With a label: 12 + 2 + (no separator/letter) = 14
        assert_eq!(score_invoice_number("20240091", "Nº factura 20240091"), 14);
        // Without: 2 - 8 = -6
        assert!(score_invoice_number("20240091", "saldo disponible") < 0);
    }

    #[test]
    fn series_code_shape_is_rewarded() {
        // letters+digits (+6), separator (+2), letter (+2)
        assert_eq!(score_invoice_number("FV-2024", "sin etiqueta cerca"), 10);
    }

    #[test]
    fn length_out_of_band_is_penalized() {
        let short = score_invoice_number("A-1", "sin etiqueta");
        let fits = score_invoice_number("A-1000", "sin etiqueta");
        assert!(fits > short);
    }

    #[test]
    fn empty_candidate_is_rejected() {
        assert_eq!(score_invoice_number("", "FACTURA"), 0);
        assert_eq!(score_invoice_number("   ", "FACTURA"), 0);
    }

    #[test]
    fn best_candidate_is_stable_on_ties() {
        let candidates = vec![
            cand("FV-1111", "FACTURA FV-1111"),
            cand("FV-2222", "FACTURA FV-2222"),
        ];
        // Same shape, same context strength — first discovered wins.
        assert_eq!(best_candidate(&candidates).as_deref(), Some("FV-1111"));
    }

    #[test]
    fn best_candidate_skips_rejected() {
        let candidates = vec![
            cand("912345678", "Tel: 912345678"),
            cand("FV-2024", "FACTURA FV-2024"),
        ];
        assert_eq!(best_candidate(&candidates).as_deref(), Some("FV-2024"));
    }

    #[test]
    fn no_positive_candidates_means_none() {
        let candidates = vec![cand("12345678Z", "CIF 12345678Z")];
        assert_eq!(best_candidate(&candidates), None);
    }
}
