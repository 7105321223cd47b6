//! Document pipeline: OCR, extraction and record assembly
//!
//! Each document is an independent task. OCR runs on the blocking thread
//! pool under a timeout; extraction follows on the same pool since it is
//! CPU-bound. Batches bound the number of documents in flight. A batch
//! permit is held by the OCR call itself, so a document that times out
//! keeps its slot until the abandoned call returns.

use crate::error::PipelineError;
use crate::extractor::Extractor;
use labscan_domain::{HealthRecord, OcrProvider};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tracing::{info, warn};

/// A document waiting to be processed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// File name, carried into the record when known
    pub name: Option<String>,

    /// Raw bytes (image, PDF, or text for the plain-text provider)
    pub bytes: Vec<u8>,
}

impl Document {
    /// Create a named document
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: Some(name.into()),
            bytes,
        }
    }

    /// Create a document without a name
    pub fn anonymous(bytes: Vec<u8>) -> Self {
        Self { name: None, bytes }
    }

    /// Read a document from disk, naming it after the file
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        Ok(Self { name, bytes })
    }
}

/// Runs documents through OCR and extraction
///
/// # Examples
///
/// ```
/// use labscan_extractor::{Document, DocumentProcessor, Extractor, ExtractorConfig};
/// use labscan_ocr::MockOcrProvider;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let extractor = Extractor::new(ExtractorConfig::default())?;
/// let processor = DocumentProcessor::new(MockOcrProvider::new("Hb: 13.5 g/dl"), extractor);
///
/// let record = processor.process(Document::new("cbc.jpg", vec![1, 2, 3])).await?;
/// assert_eq!(record.record_type, "Complete Blood Count");
/// # Ok(())
/// # }
/// ```
pub struct DocumentProcessor<O> {
    ocr: Arc<O>,
    extractor: Arc<Extractor>,
    ocr_timeout: Duration,
    max_concurrent: usize,
}

impl<O> Clone for DocumentProcessor<O> {
    fn clone(&self) -> Self {
        Self {
            ocr: Arc::clone(&self.ocr),
            extractor: Arc::clone(&self.extractor),
            ocr_timeout: self.ocr_timeout,
            max_concurrent: self.max_concurrent,
        }
    }
}

impl<O> DocumentProcessor<O>
where
    O: OcrProvider + Send + Sync + 'static,
    O::Error: std::fmt::Display,
{
    /// Create a processor owning its OCR provider and extractor
    pub fn new(ocr: O, extractor: Extractor) -> Self {
        Self::from_shared(Arc::new(ocr), Arc::new(extractor))
    }

    /// Create a processor over shared collaborators
    ///
    /// Timeout and batch concurrency come from the extractor's configuration.
    pub fn from_shared(ocr: Arc<O>, extractor: Arc<Extractor>) -> Self {
        let config = extractor.config();
        let ocr_timeout = config.ocr_timeout();
        let max_concurrent = config.max_concurrent_documents.max(1);
        Self {
            ocr,
            extractor,
            ocr_timeout,
            max_concurrent,
        }
    }

    /// Override the OCR timeout
    pub fn with_ocr_timeout(mut self, timeout: Duration) -> Self {
        self.ocr_timeout = timeout;
        self
    }

    /// Process one document into a health record
    pub async fn process(&self, document: Document) -> Result<HealthRecord, PipelineError> {
        self.run(document, None).await
    }

    async fn run(
        &self,
        document: Document,
        permit: Option<OwnedSemaphorePermit>,
    ) -> Result<HealthRecord, PipelineError> {
        let Document { name, bytes } = document;
        let ocr = Arc::clone(&self.ocr);

        let recognition = tokio::task::spawn_blocking(move || {
            let output = ocr.recognize(&bytes).map_err(|e| e.to_string());
            drop(permit);
            output
        });

        let output = match tokio::time::timeout(self.ocr_timeout, recognition).await {
            Ok(joined) => joined?.map_err(|e| {
                warn!(document = ?name, error = %e, "OCR failed");
                PipelineError::OcrUnavailable(e)
            })?,
            Err(_) => {
                warn!(document = ?name, "OCR timed out");
                return Err(PipelineError::Timeout(self.ocr_timeout.as_secs()));
            }
        };

        let extractor = Arc::clone(&self.extractor);
        let text = output.text.clone();
        let result = tokio::task::spawn_blocking(move || extractor.extract(&text)).await?;

        info!(
            document = ?name,
            pages = output.page_count,
            biomarkers = result.biomarker_count(),
            "Document processed"
        );

        Ok(HealthRecord::from_extraction(result, &output, name))
    }

    /// Process documents concurrently, returning results in input order
    pub async fn process_batch(
        &self,
        documents: Vec<Document>,
    ) -> Vec<Result<HealthRecord, PipelineError>> {
        let count = documents.len();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut tasks = JoinSet::new();

        for (index, document) in documents.into_iter().enumerate() {
            let processor = self.clone();
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let permit = semaphore.acquire_owned().await.ok();
                (index, processor.run(document, permit).await)
            });
        }

        let mut results: Vec<Option<Result<HealthRecord, PipelineError>>> =
            (0..count).map(|_| None).collect();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => results[index] = Some(result),
                Err(e) => warn!(error = %e, "Document task failed"),
            }
        }

        results
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| {
                    Err(PipelineError::Join("document task did not complete".to_string()))
                })
            })
            .collect()
    }
}
