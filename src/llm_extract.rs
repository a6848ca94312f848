// src/llm_extract.rs

use crate::config::{LlmBackend, LlmSection};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

/// The prompt that instructs the model to pull the two fields out of a
/// Spanish invoice. The model must answer with bare JSON.
const SYSTEM_PROMPT: &str = "Devuelve solo JSON válido.";

const USER_PROMPT_TEMPLATE: &str = r#"Devuelve SOLO JSON con claves "nro_factura" y "proveedor" basándote en el texto de una factura española.
Reglas: no uses NIF/CIF, teléfono, fecha o IBAN como número de factura; si no hay dato, usa "No encontrado".
Texto:
{TEXT}
Respuesta JSON:"#;

/// How many document lines are forwarded to the model.
const MAX_PROMPT_LINES: usize = 80;

/// Placeholder the prompt asks the model to emit for missing fields.
const NOT_FOUND_PLACEHOLDER: &str = "no encontrado";

/// Why an external pass produced nothing usable. Both variants are
/// recoverable: the caller falls back to the local result and records a
/// note, never an error.
#[derive(Debug)]
pub enum LlmFailure {
    /// Backend unconfigured, unreachable, or the request failed.
    Unavailable(String),
    /// The model answered, but not with the JSON shape we require.
    Malformed(String),
}

impl fmt::Display for LlmFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmFailure::Unavailable(e) => write!(f, "LLM unavailable: {e}"),
            LlmFailure::Malformed(e) => write!(f, "LLM response malformed: {e}"),
        }
    }
}

impl std::error::Error for LlmFailure {}

/// The two fields an external pass may contribute. Parsed strictly —
/// anything structurally different from the expected JSON is
/// `LlmFailure::Malformed`, and placeholder values collapse to `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AiFields {
    pub invoice_number: Option<String>,
    pub supplier: Option<String>,
}

/// Wire shape of the model's answer.
#[derive(Debug, Deserialize)]
struct AiRawResponse {
    nro_factura: Option<String>,
    proveedor: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Resolved endpoint configuration ready to make API calls.
pub struct ResolvedEndpoint {
    base_url: String,
    model: String,
    api_key: String,
}

/// Resolve the LLM config section into a concrete endpoint.
pub fn resolve_endpoint(llm: &LlmSection) -> Result<ResolvedEndpoint, LlmFailure> {
    match llm.backend {
        LlmBackend::Ollama => {
            info!(
                url = %llm.ollama.base_url,
                model = %llm.ollama.model,
                "Using Ollama (local) backend"
            );
            Ok(ResolvedEndpoint {
                base_url: llm.ollama.base_url.clone(),
                model: llm.ollama.model.clone(),
                api_key: "ollama".to_string(), // required by API but ignored
            })
        }
        LlmBackend::Remote => {
            let api_key = std::env::var("LLM_API_KEY").map_err(|_| {
                LlmFailure::Unavailable("LLM_API_KEY env var required for remote backend".into())
            })?;
            info!(
                url = %llm.remote.base_url,
                model = %llm.remote.model,
                "Using remote API backend"
            );
            Ok(ResolvedEndpoint {
                base_url: llm.remote.base_url.clone(),
                model: llm.remote.model.clone(),
                api_key,
            })
        }
        LlmBackend::Heuristics => Err(LlmFailure::Unavailable(
            "heuristics backend selected — no external capability".into(),
        )),
    }
}

/// Check if the Ollama server is reachable.
pub async fn check_ollama_health(client: &Client, llm: &LlmSection) -> bool {
    // Ollama's health endpoint is at the root (not under /v1)
    let health_url = llm
        .ollama
        .base_url
        .trim_end_matches("/v1")
        .trim_end_matches("/v1/");

    match client
        .get(health_url)
        .timeout(std::time::Duration::from_secs(3))
        .send()
        .await
    {
        Ok(resp) => {
            if resp.status().is_success() {
                info!("Ollama server is reachable");
                true
            } else {
                warn!(status = %resp.status(), "Ollama server returned non-OK status");
                false
            }
        }
        Err(e) => {
            warn!(error = %e, "Ollama server not reachable");
            false
        }
    }
}

/// Ask the model for the two fields. The document is truncated to its
/// first non-blank lines to stay inside context limits.
pub async fn classify(
    client: &Client,
    endpoint: &ResolvedEndpoint,
    text: &str,
) -> Result<AiFields, LlmFailure> {
    let excerpt: String = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(MAX_PROMPT_LINES)
        .collect::<Vec<_>>()
        .join("\n");

    let request = ChatRequest {
        model: endpoint.model.clone(),
        messages: vec![
            ChatMessage {
                role: "system".to_string(),
                content: SYSTEM_PROMPT.to_string(),
            },
            ChatMessage {
                role: "user".to_string(),
                content: USER_PROMPT_TEMPLATE.replace("{TEXT}", &excerpt),
            },
        ],
        temperature: 0.1,
    };

    let url = format!("{}/chat/completions", endpoint.base_url);

    let response = client
        .post(&url)
        .header("Authorization", format!("Bearer {}", endpoint.api_key))
        .json(&request)
        .send()
        .await
        .map_err(|e| LlmFailure::Unavailable(e.to_string()))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(LlmFailure::Unavailable(format!(
            "API error {status}: {body}"
        )));
    }

    let chat_response: ChatResponse = response
        .json()
        .await
        .map_err(|e| LlmFailure::Malformed(e.to_string()))?;
    let content = chat_response
        .choices
        .first()
        .map(|c| c.message.content.as_str())
        .ok_or_else(|| LlmFailure::Malformed("empty choices in response".into()))?;

    parse_ai_response(content)
}

/// Strict parse of the model's text answer into `AiFields`. Tolerates
/// markdown fences and surrounding chatter around the JSON object, but
/// nothing else.
pub fn parse_ai_response(content: &str) -> Result<AiFields, LlmFailure> {
    let stripped = content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    // Some models prepend reasoning text despite instructions; keep
    // only the outermost JSON object.
    let json_str = extract_json_object(stripped)?;

    let raw: AiRawResponse = serde_json::from_str(json_str)
        .map_err(|e| LlmFailure::Malformed(format!("not the expected JSON shape: {e}")))?;

    Ok(AiFields {
        invoice_number: sanitize_field(raw.nro_factura),
        supplier: sanitize_field(raw.proveedor),
    })
}

/// Map the prompt's "No encontrado" placeholder and blank strings to an
/// absent field.
fn sanitize_field(value: Option<String>) -> Option<String> {
    let value = value?;
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.to_lowercase() == NOT_FOUND_PLACEHOLDER {
        return None;
    }
    Some(trimmed.to_string())
}

/// Extract the outermost JSON object from a string that may contain
/// surrounding text (e.g. thinking tokens).
fn extract_json_object(s: &str) -> Result<&str, LlmFailure> {
    let start = s
        .find('{')
        .ok_or_else(|| LlmFailure::Malformed("no '{' in response".into()))?;
    let end = s
        .rfind('}')
        .ok_or_else(|| LlmFailure::Malformed("no '}' in response".into()))?;
    if end <= start {
        return Err(LlmFailure::Malformed("unbalanced JSON object".into()));
    }
    Ok(&s[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_json() {
        let fields =
            parse_ai_response(r#"{"nro_factura": "FV-2024-00531", "proveedor": "EHOSA"}"#).unwrap();
        assert_eq!(fields.invoice_number.as_deref(), Some("FV-2024-00531"));
        assert_eq!(fields.supplier.as_deref(), Some("EHOSA"));
    }

    #[test]
    fn strips_markdown_fences() {
        let content = "```json\n{\"nro_factura\": \"A-1\", \"proveedor\": null}\n```";
        let fields = parse_ai_response(content).unwrap();
        assert_eq!(fields.invoice_number.as_deref(), Some("A-1"));
        assert_eq!(fields.supplier, None);
    }

    #[test]
    fn recovers_json_from_surrounding_chatter() {
        let content =
            "Claro, aquí está:\n{\"nro_factura\": \"B-2\", \"proveedor\": \"LIDL\"}\nEspero que sirva.";
        let fields = parse_ai_response(content).unwrap();
        assert_eq!(fields.invoice_number.as_deref(), Some("B-2"));
    }

    #[test]
    fn placeholder_collapses_to_none() {
        let content = r#"{"nro_factura": "No encontrado", "proveedor": "  "}"#;
        let fields = parse_ai_response(content).unwrap();
        assert_eq!(fields.invoice_number, None);
        assert_eq!(fields.supplier, None);
    }

    #[test]
    fn missing_keys_are_absent_fields() {
        let fields = parse_ai_response(r#"{"proveedor": "MAKRO"}"#).unwrap();
        assert_eq!(fields.invoice_number, None);
        assert_eq!(fields.supplier.as_deref(), Some("MAKRO"));
    }

    #[test]
    fn non_json_is_malformed() {
        assert!(matches!(
            parse_ai_response("no tengo respuesta"),
            Err(LlmFailure::Malformed(_))
        ));
        assert!(matches!(
            parse_ai_response("{rotos]"),
            Err(LlmFailure::Malformed(_))
        ));
    }

    #[test]
    fn heuristics_backend_has_no_endpoint() {
        let llm = LlmSection::default();
        assert!(matches!(
            resolve_endpoint(&llm),
            Err(LlmFailure::Unavailable(_))
        ));
    }
}
