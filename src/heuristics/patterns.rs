// src/heuristics/patterns.rs
//
// Every regex and keyword table the extraction heuristics rely on lives
// here, so rule precedence is explicit: pattern lists are matched in
// order, and earlier entries win ties downstream (the candidate picker
// keeps the first-discovered candidate among equal scores).

use lazy_static::lazy_static;
use regex::Regex;

/// Words that disqualify a candidate outright when they appear inside it
/// (normalized comparison). These are labels of *other* invoice fields.
pub const INVALID_INVOICE_WORDS: &[&str] = &[
    "CLIENTE",
    "CUSTOMER",
    "DESTINATARIO",
    "FECHA",
    "DATE",
    "TEL",
    "TFNO",
    "PHONE",
    "MOVIL",
    "WHATSAPP",
    "FAX",
    "EMAIL",
    "CORREO",
    "DIRECCION",
    "ADDRESS",
    "CIF",
    "NIF",
    "VAT",
    "IVA",
    "IBAN",
    "CUENTA",
    "ACCOUNT",
    "ALBARAN",
    "TICKET",
    "PEDIDO",
    "ORDER",
    "REFERENCIA",
];

/// Keywords whose presence in a (normalized) context window marks it as
/// invoice-number territory. "Nº" and "NÚMERO" are already in canonical
/// form here — the normalizer maps the ordinal sign to a plain "O" and
/// strips the accent. The degree sign in "N°" survives normalization,
/// so that spelling is listed literally.
pub const INVOICE_CONTEXT_WORDS: &[&str] = &[
    "FACTURA", "FAC", "INVOICE", "FACTURE", "BILL", "N°", "NO", "NUMERO", "#",
];

/// Keywords near a bare digit run that mark it as a phone number.
pub const PHONE_CONTEXT_WORDS: &[&str] = &["TEL", "TFNO", "PHONE", "MOVIL", "WHATSAPP", "FAX"];

lazy_static! {
    /// Ordered invoice-number shapes, most specific first:
    /// 1. value prefixed by a FACT/FACTURA label
    /// 2. short letter block, dash/slash, digits
    /// 3. letter block glued to digits
    /// 4. FV series codes
    /// 5. single letter + long digit run
    /// 6. three dash/slash-delimited segments
    /// 7. bare long digit run
    /// 8. date-like year + dash + digits
    pub static ref INVOICE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)\bFACT(?:URA)?\.?\s*(?:N[ºo°]\s*)?\.?\s*([A-Z0-9][A-Z0-9./-]{3,20})\b")
            .unwrap(),
        Regex::new(r"(?i)\b([A-Z]{1,4}[-/]\d{4,12})\b").unwrap(),
        Regex::new(r"(?i)\b([A-Z]{2,5}\d{3,12})\b").unwrap(),
        Regex::new(r"(?i)\b(FV[-/]?\d{1,3}[-/]?\d{4,12})\b").unwrap(),
        Regex::new(r"(?i)\b([A-Z]\d{7,15})\b").unwrap(),
        Regex::new(r"(?i)\b([A-Z0-9]{1,4}[-/][A-Z0-9]{1,4}[-/][A-Z0-9]{3,12})\b").unwrap(),
        Regex::new(r"\b(\d{7,12})\b").unwrap(),
        Regex::new(r"\b(\d{4}[-/]\d{6,10})\b").unwrap(),
    ];

    /// Loose alphanumeric token used by the keyword-anchored line scan.
    /// Deliberately case-sensitive: real invoice codes are printed in
    /// caps, and a looser match here would drown the scorer in prose.
    pub static ref LOOSE_TOKEN: Regex = Regex::new(r"[A-Z0-9][A-Z0-9./-]{3,20}").unwrap();

    /// Phone shape: optional +, then digits with space/dash filler.
    pub static ref PHONE_SHAPE: Regex = Regex::new(r"^\+?\d[\d\s-]{8,15}$").unwrap();

    /// Bare digit run in the phone-number length band.
    pub static ref BARE_PHONE_DIGITS: Regex = Regex::new(r"^\d{9,11}$").unwrap();

    /// Spanish tax IDs: NIF (8 digits + letter) and CIF (org letter +
    /// 7 digits + check char).
    pub static ref CIF_NIF_SHAPES: Vec<Regex> = vec![
        Regex::new(r"(?i)^\d{8}[A-Z]$").unwrap(),
        Regex::new(r"(?i)^[ABCDEFGHJNPQRSUVW]\d{7}[0-9A-J]$").unwrap(),
    ];

    /// Letters, optional separator, digits — the classic series code.
    pub static ref LETTERS_THEN_DIGITS: Regex = Regex::new(r"^[A-Z]+[-/]?\d+$").unwrap();

    /// Bare run of 7+ digits.
    pub static ref LONG_DIGIT_RUN: Regex = Regex::new(r"^\d{7,}$").unwrap();

    /// Separator characters that make a code look deliberate.
    pub static ref HAS_SEPARATOR: Regex = Regex::new(r"[-/.]").unwrap();

    /// Legal-entity suffixes tried in order on each candidate header
    /// line. Leading part is permissive on accented caps, digits and
    /// light punctuation; the lazy quantifier keeps the capture tight.
    pub static ref CORP_SUFFIX_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)\b([A-ZÁÉÍÓÚÑ0-9&.\s-]{2,}?S\.?A\.?U?)\b").unwrap(),
        Regex::new(r"(?i)\b([A-ZÁÉÍÓÚÑ0-9&.\s-]{2,}?S\.?L\.?U?)\b").unwrap(),
        Regex::new(r"(?i)\b([A-ZÁÉÍÓÚÑ0-9&.\s-]{2,}?LIMITADA)\b").unwrap(),
        Regex::new(r"(?i)\b([A-ZÁÉÍÓÚÑ0-9&.\s-]{2,}?GMBH)\b").unwrap(),
        Regex::new(r"(?i)\b([A-ZÁÉÍÓÚÑ0-9&.\s-]{2,}?SAS)\b").unwrap(),
        Regex::new(r"(?i)\b([A-ZÁÉÍÓÚÑ0-9&.\s-]{2,}?LTD)\b").unwrap(),
    ];

    /// A header line qualifying as a supplier-name fallback: caps,
    /// digits and light punctuation only (checked against the
    /// normalized line).
    pub static ref PLAUSIBLE_HEADER: Regex = Regex::new(r"^[A-ZÁÉÍÓÚÑ0-9&. \s-]+$").unwrap();

    /// Lines that are addresses, amounts, dates or phones — never a
    /// supplier name.
    pub static ref ADDRESS_OR_AMOUNT: Regex =
        Regex::new(r"(CALLE|AVDA|C/|€|EUROS?|IVA|FECHA|TEL)").unwrap();

    /// "factura"/"invoice" anywhere in the document, for the confidence
    /// keyword bonus.
    pub static ref INVOICE_DOC_KEYWORD: Regex = Regex::new(r"(?i)factura|invoice").unwrap();
}

/// Words that disqualify a line from supplier-header consideration.
pub const SUPPLIER_SKIP_WORDS: &[&str] = &[
    "FACTURA",
    "INVOICE",
    "FECHA",
    "DATE",
    "CLIENTE",
    "CUSTOMER",
    "DESTINATARIO",
    "TEL",
    "TFNO",
    "PHONE",
    "EMAIL",
    "DIRECCION",
    "ADDRESS",
    "CIF",
    "NIF",
    "VAT",
    "IVA",
    "IBAN",
    "CUENTA",
    "TOTAL",
    "BASE",
    "HTTP",
    "WWW",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_order_is_the_documented_precedence() {
        // The three-segment pattern (index 5) must come before the bare
        // digit run (index 6): "FV-2024-00531" is claimed by the former.
        assert!(INVOICE_PATTERNS[5].is_match("FV-2024-00531"));
        assert!(!INVOICE_PATTERNS[6].is_match("FV-2024-00531"));
    }

    #[test]
    fn labeled_pattern_captures_value_only() {
        let caps = INVOICE_PATTERNS[0].captures("FACTURA Nº A-2024/18").unwrap();
        assert_eq!(&caps[1], "A-2024/18");
    }

    #[test]
    fn loose_token_is_case_sensitive() {
        assert!(LOOSE_TOKEN.is_match("FV-18/2024"));
        assert!(!LOOSE_TOKEN.is_match("palabras en prosa"));
    }

    #[test]
    fn cif_nif_shapes_match_both_forms() {
        assert!(CIF_NIF_SHAPES[0].is_match("12345678Z"));
        assert!(CIF_NIF_SHAPES[1].is_match("B1234567C"));
        assert!(!CIF_NIF_SHAPES[0].is_match("FV-2024"));
    }
}
