//! Scan command implementation.

use crate::cli::ScanArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use labscan_domain::{HealthRecord, OcrProvider};
use labscan_extractor::{Document, DocumentProcessor, Extractor};
use labscan_ocr::PlainTextProvider;
use std::fmt::Display;
use std::sync::Arc;
use tracing::info;

/// Execute the scan command.
pub async fn execute_scan(args: ScanArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let extractor = Extractor::with_catalog(Arc::new(config.build_catalog()?), config.extractor.clone())?;

    let documents = args
        .files
        .iter()
        .map(Document::from_path)
        .collect::<std::io::Result<Vec<_>>>()?;
    info!(documents = documents.len(), "Scanning documents");

    if args.plain_text {
        run(PlainTextProvider::new(), extractor, documents, formatter).await
    } else {
        let provider = config.vision_provider(args.api_key)?;
        run(provider, extractor, documents, formatter).await
    }
}

async fn run<O>(
    ocr: O,
    extractor: Extractor,
    documents: Vec<Document>,
    formatter: &Formatter,
) -> Result<()>
where
    O: OcrProvider + Send + Sync + 'static,
    O::Error: Display,
{
    let names: Vec<String> = documents
        .iter()
        .map(|d| d.name.clone().unwrap_or_default())
        .collect();
    let total = documents.len();

    let processor = DocumentProcessor::new(ocr, extractor);
    let results = processor.process_batch(documents).await;

    let mut records: Vec<HealthRecord> = Vec::with_capacity(total);
    for (name, result) in names.iter().zip(results) {
        match result {
            Ok(record) => records.push(record),
            Err(e) => eprintln!("{}", formatter.error(&format!("{}: {}", name, e))),
        }
    }

    if !records.is_empty() {
        println!("{}", formatter.format_records(&records)?);
    }

    let failed = total - records.len();
    if failed > 0 {
        return Err(CliError::DocumentsFailed { failed, total });
    }
    Ok(())
}
