//! LabScan OCR Provider Layer
//!
//! Pluggable OCR implementations of the `OcrProvider` trait from
//! `labscan-domain`. The extraction core never calls these directly; the
//! document pipeline runs them before extraction.
//!
//! # Providers
//!
//! - `MockOcrProvider`: Deterministic mock for testing
//! - `PlainTextProvider`: Passes already-extracted text through unchanged
//! - `VisionProvider`: Google Cloud Vision document text detection
//!
//! # Examples
//!
//! ```
//! use labscan_ocr::MockOcrProvider;
//! use labscan_domain::traits::OcrProvider;
//!
//! let provider = MockOcrProvider::new("Hb: 13.5 g/dl");
//! let output = provider.recognize(b"image bytes").unwrap();
//! assert_eq!(output.text, "Hb: 13.5 g/dl");
//! ```

#![warn(missing_docs)]

pub mod plain;
pub mod vision;

use labscan_domain::traits::{OcrOutput, OcrProvider};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use plain::PlainTextProvider;
pub use vision::VisionProvider;

/// Errors that can occur during OCR
#[derive(Error, Debug)]
pub enum OcrError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// The service answered with an error payload
    #[error("OCR API error: {0}")]
    Api(String),

    /// Response could not be interpreted
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// The document cannot be processed (empty, unsupported)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Generic error
    #[error("OCR error: {0}")]
    Other(String),
}

/// Mock OCR provider for deterministic testing
///
/// Returns pre-configured text without touching the network. Specific
/// documents (matched by their exact bytes) can be given their own output or
/// made to fail.
///
/// # Examples
///
/// ```
/// use labscan_ocr::MockOcrProvider;
/// use labscan_domain::traits::OcrProvider;
///
/// let mut provider = MockOcrProvider::default();
/// provider.add_response(b"page-1".to_vec(), "Glucose: 95 mg/dl");
/// provider.add_error(b"corrupt".to_vec());
///
/// assert_eq!(provider.recognize(b"page-1").unwrap().text, "Glucose: 95 mg/dl");
/// assert!(provider.recognize(b"corrupt").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct MockOcrProvider {
    default_output: OcrOutput,
    responses: Arc<Mutex<HashMap<Vec<u8>, Option<OcrOutput>>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockOcrProvider {
    /// Create a mock returning `text` for every document (confidence 0.95, one page)
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_output(OcrOutput::new(text, 0.95, 1))
    }

    /// Create a mock returning a fixed output for every document
    pub fn with_output(output: OcrOutput) -> Self {
        Self {
            default_output: output,
            responses: Arc::new(Mutex::new(HashMap::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Return `text` for one specific document
    pub fn add_response(&mut self, document: Vec<u8>, text: impl Into<String>) {
        let output = OcrOutput::new(text, self.default_output.confidence, 1);
        self.lock_responses().insert(document, Some(output));
    }

    /// Fail recognition for one specific document
    pub fn add_error(&mut self, document: Vec<u8>) {
        self.lock_responses().insert(document, None);
    }

    /// Get the number of times recognize was called
    pub fn call_count(&self) -> usize {
        *self
            .call_count
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_responses(&self) -> std::sync::MutexGuard<'_, HashMap<Vec<u8>, Option<OcrOutput>>> {
        self.responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MockOcrProvider {
    fn default() -> Self {
        Self::new("")
    }
}

impl OcrProvider for MockOcrProvider {
    type Error = OcrError;

    fn recognize(&self, document: &[u8]) -> Result<OcrOutput, Self::Error> {
        *self
            .call_count
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) += 1;

        match self.lock_responses().get(document) {
            Some(Some(output)) => Ok(output.clone()),
            Some(None) => Err(OcrError::Other("Mock error".to_string())),
            None => Ok(self.default_output.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_provider_default() {
        let provider = MockOcrProvider::new("Hb: 13.5 g/dl");
        let output = provider.recognize(b"anything").unwrap();
        assert_eq!(output.text, "Hb: 13.5 g/dl");
        assert_eq!(output.page_count, 1);
    }

    #[test]
    fn test_mock_provider_specific_responses() {
        let mut provider = MockOcrProvider::default();
        provider.add_response(b"a".to_vec(), "first");
        provider.add_response(b"b".to_vec(), "second");

        assert_eq!(provider.recognize(b"a").unwrap().text, "first");
        assert_eq!(provider.recognize(b"b").unwrap().text, "second");
        assert_eq!(provider.recognize(b"c").unwrap().text, "");
    }

    #[test]
    fn test_mock_provider_error() {
        let mut provider = MockOcrProvider::default();
        provider.add_error(b"bad".to_vec());

        let result = provider.recognize(b"bad");
        assert!(matches!(result, Err(OcrError::Other(_))));
    }

    #[test]
    fn test_mock_provider_clone_shares_call_count() {
        let provider1 = MockOcrProvider::new("text");
        let provider2 = provider1.clone();

        provider1.recognize(b"x").unwrap();
        provider2.recognize(b"y").unwrap();

        assert_eq!(provider1.call_count(), 2);
        assert_eq!(provider2.call_count(), 2);
    }
}
