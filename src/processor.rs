// src/processor.rs

use crate::config::LlmSection;
use crate::heuristics;
use crate::pdf_extract::{self, PdfContent};
use crate::reconcile;
use reqwest::Client;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use std::{fs, io};
use tracing::{debug, info, warn};

/// File extensions the folder walk accepts. Image formats are listed so
/// scanned documents are acknowledged (and produce a low-confidence
/// record) rather than silently dropped; actual OCR is an external
/// capability this tool does not carry.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp", "tif", "tiff"];
const PDF_EXTENSION: &str = "pdf";

/// One processed document, ready for export.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentRecord {
    pub file: String,
    pub invoice_number: Option<String>,
    pub supplier: Option<String>,
    pub confidence: f64,
    pub notes: Vec<String>,
}

/// Process every accepted file in `dir`, one document fully finished
/// (including its reconciliation call) before the next begins. Results
/// come back as an explicit list — nothing outlives the call.
pub async fn process_folder(
    dir: &Path,
    llm: &LlmSection,
) -> Result<Vec<DocumentRecord>, Box<dyn std::error::Error>> {
    let client = Client::builder()
        .timeout(Duration::from_secs(llm.timeout_secs))
        .build()?;

    let mut filenames: Vec<String> = fs::read_dir(dir)?
        .collect::<Result<Vec<_>, io::Error>>()?
        .into_iter()
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| is_accepted(name))
        .collect();
    filenames.sort();

    info!(dir = %dir.display(), files = filenames.len(), "Documents to process");

    let mut records = Vec::with_capacity(filenames.len());
    for name in filenames {
        let span = tracing::info_span!("document", file = %name);
        let _guard = span.enter();

        let text = read_text(&dir.join(&name));
        let local = heuristics::extract(&text);
        let merged = reconcile::reconcile(&client, llm, &text, local).await;

        info!(
            invoice_number = ?merged.invoice_number,
            supplier = ?merged.supplier,
            confidence = merged.confidence,
            "Extraction result"
        );

        records.push(DocumentRecord {
            file: name,
            invoice_number: merged.invoice_number,
            supplier: merged.supplier,
            confidence: merged.confidence,
            notes: merged.notes,
        });
    }

    Ok(records)
}

/// Extension allow-list check (case-insensitive).
fn is_accepted(filename: &str) -> bool {
    match extension_of(filename) {
        Some(ext) => ext == PDF_EXTENSION || IMAGE_EXTENSIONS.contains(&ext.as_str()),
        None => false,
    }
}

fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
}

/// Best-effort text acquisition for one file. Everything that fails to
/// produce text yields an empty string — the extraction core turns that
/// into a low-confidence result with a note, never an error.
fn read_text(path: &Path) -> String {
    let Some(ext) = path.file_name().and_then(|n| n.to_str()).and_then(extension_of) else {
        return String::new();
    };

    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        debug!(file = %path.display(), "Image file — OCR not available, no text");
        return String::new();
    }

    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(file = %path.display(), error = %e, "Could not read file");
            return String::new();
        }
    };

    match pdf_extract::extract_text_from_pdf(&bytes) {
        PdfContent::Text(text) => text.trim().to_string(),
        PdfContent::ScannedImage => {
            info!(file = %path.display(), "Scanned PDF — no text layer");
            String::new()
        }
        PdfContent::Error(e) => {
            warn!(file = %path.display(), error = %e, "PDF extraction failed");
            String::new()
        }
    }
}
