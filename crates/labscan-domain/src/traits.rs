//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the extraction core and its
//! collaborators. Implementations live in other crates.

use crate::Entity;

/// Text recognized from one document
#[derive(Debug, Clone, PartialEq)]
pub struct OcrOutput {
    /// Full recognized text
    pub text: String,

    /// Provider-reported confidence [0.0, 1.0]
    pub confidence: f64,

    /// Number of pages the provider saw
    pub page_count: usize,
}

impl OcrOutput {
    /// Create a new OCR output, clamping confidence into [0.0, 1.0]
    pub fn new(text: impl Into<String>, confidence: f64, page_count: usize) -> Self {
        Self {
            text: text.into(),
            confidence: confidence.clamp(0.0, 1.0),
            page_count,
        }
    }
}

/// Trait for OCR engines
///
/// Implemented by the infrastructure layer (labscan-ocr). Calls may block on
/// network I/O; async callers should run them on a blocking thread.
pub trait OcrProvider {
    /// Error type for OCR operations
    type Error;

    /// Recognize the text of a document (image bytes, or a PDF treated as an image)
    fn recognize(&self, document: &[u8]) -> Result<OcrOutput, Self::Error>;
}

/// Trait for auxiliary named-entity recognition
///
/// Implemented by the application layer (labscan-extractor). Recognition is
/// best-effort: an implementation that returns nothing is valid.
pub trait EntityRecognizer {
    /// Tag entities in normalized text
    fn recognize(&self, text: &str) -> Vec<Entity>;
}
