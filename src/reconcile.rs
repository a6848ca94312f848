// src/reconcile.rs

use crate::config::{LlmBackend, LlmSection};
use crate::heuristics::{self, ExtractionResult, score_invoice_number};
use crate::llm_extract::{self, AiFields, LlmFailure};
use reqwest::Client;
use tracing::{info, warn};

/// Per-field merge of the local heuristic result with an external
/// pass, the candidate scorer acting as tie-break oracle against the
/// full document text. The external invoice number is adopted only when
/// it scores at least as well as the local one; the external supplier
/// wins whenever present. Confidence is recomputed from the merged
/// fields. A new result is produced — neither input is mutated.
pub fn merge_results(local: &ExtractionResult, ai: &AiFields, text: &str) -> ExtractionResult {
    let local_score = local
        .invoice_number
        .as_deref()
        .map_or(0, |c| score_invoice_number(c, text));
    let ai_score = ai
        .invoice_number
        .as_deref()
        .map_or(0, |c| score_invoice_number(c, text));

    let invoice_number = if ai.invoice_number.is_some() && ai_score >= local_score {
        ai.invoice_number.clone()
    } else {
        local
            .invoice_number
            .clone()
            .or_else(|| ai.invoice_number.clone())
    };

    let supplier = ai.supplier.clone().or_else(|| local.supplier.clone());

    let confidence =
        heuristics::confidence_for(text, invoice_number.as_deref(), supplier.as_deref());

    let mut notes = local.notes.clone();
    notes.push("Combinado con LLM.".to_string());

    ExtractionResult {
        invoice_number,
        supplier,
        confidence,
        notes,
    }
}

/// Reinforce the local result with the configured external capability.
/// Every failure mode degrades to the local result plus a note — this
/// never errors.
pub async fn reconcile(
    client: &Client,
    llm: &LlmSection,
    text: &str,
    local: ExtractionResult,
) -> ExtractionResult {
    if llm.backend == LlmBackend::Heuristics {
        return local.with_note("LLM no configurado.");
    }

    let endpoint = match llm_extract::resolve_endpoint(llm) {
        Ok(endpoint) => endpoint,
        Err(e) => {
            warn!(error = %e, "No usable LLM endpoint");
            return local.with_note("LLM no configurado.");
        }
    };

    if llm.backend == LlmBackend::Ollama && !llm_extract::check_ollama_health(client, llm).await {
        return local.with_note("LLM no disponible o error.");
    }

    match llm_extract::classify(client, &endpoint, text).await {
        Ok(ai) => {
            info!(
                ai_invoice = ?ai.invoice_number,
                ai_supplier = ?ai.supplier,
                "LLM fields received"
            );
            merge_results(&local, &ai, text)
        }
        Err(LlmFailure::Unavailable(e)) => {
            warn!(error = %e, "LLM pass unavailable — keeping local result");
            local.with_note("LLM no disponible o error.")
        }
        Err(LlmFailure::Malformed(e)) => {
            warn!(error = %e, "LLM answer unusable — keeping local result");
            local.with_note("LLM falló o JSON inválido.")
        }
    }
}
