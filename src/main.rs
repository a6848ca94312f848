mod config;
mod heuristics;
mod llm_extract;
mod pdf_extract;
mod processor;
mod reconcile;

use std::path::Path;
use tracing::info;

const DEFAULT_INPUT_DIR: &str = "facturas";
const DEFAULT_CONFIG_PATH: &str = ".config/factura_scan.toml";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // init tracing
    tracing_subscriber::fmt()
        .with_target(true)
        .with_level(true)
        .with_env_filter("info")
        .init();

    let args: Vec<String> = std::env::args().collect();
    let input_dir = args.get(1).map_or(DEFAULT_INPUT_DIR, String::as_str);
    let config_path = args.get(2).map_or(DEFAULT_CONFIG_PATH, String::as_str);

    let cfg = if Path::new(config_path).exists() {
        config::Config::load(config_path)?
    } else {
        info!(path = %config_path, "No config file — heuristics only");
        config::Config::default()
    };

    let records = processor::process_folder(Path::new(input_dir), &cfg.llm).await?;

    let with_invoice = records
        .iter()
        .filter(|r| r.invoice_number.is_some())
        .count();
    let with_supplier = records.iter().filter(|r| r.supplier.is_some()).count();
    info!(
        documents = records.len(),
        with_invoice, with_supplier, "Batch complete"
    );

    println!("{}", serde_json::to_string_pretty(&records)?);

    Ok(())
}
