//! Plain-text provider
//!
//! For documents whose text is already machine-readable (text exports, test
//! fixtures). No recognition happens; the bytes are decoded as UTF-8.

use crate::OcrError;
use labscan_domain::traits::{OcrOutput, OcrProvider};

/// Page separator used by text exports of multi-page reports
const FORM_FEED: char = '\u{000C}';

/// Provider that treats document bytes as text
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextProvider;

impl PlainTextProvider {
    /// Create a new plain-text provider
    pub fn new() -> Self {
        Self
    }
}

impl OcrProvider for PlainTextProvider {
    type Error = OcrError;

    fn recognize(&self, document: &[u8]) -> Result<OcrOutput, Self::Error> {
        if document.is_empty() {
            return Err(OcrError::InvalidInput("empty document".to_string()));
        }

        let text = String::from_utf8_lossy(document);
        let page_count = text.split(FORM_FEED).filter(|p| !p.trim().is_empty()).count();

        Ok(OcrOutput::new(text.replace(FORM_FEED, "\n"), 1.0, page_count.max(1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_passthrough() {
        let output = PlainTextProvider::new().recognize(b"Hb: 13.5 g/dl").unwrap();
        assert_eq!(output.text, "Hb: 13.5 g/dl");
        assert_eq!(output.confidence, 1.0);
        assert_eq!(output.page_count, 1);
    }

    #[test]
    fn test_plain_text_counts_pages() {
        let output = PlainTextProvider::new()
            .recognize(b"page one\x0cpage two\x0c")
            .unwrap();
        assert_eq!(output.page_count, 2);
        assert!(!output.text.contains(FORM_FEED));
    }

    #[test]
    fn test_plain_text_rejects_empty() {
        let result = PlainTextProvider::new().recognize(b"");
        assert!(matches!(result, Err(OcrError::InvalidInput(_))));
    }

    #[test]
    fn test_plain_text_lossy_decoding() {
        let output = PlainTextProvider::new().recognize(&[b'o', b'k', 0xFF]).unwrap();
        assert!(output.text.starts_with("ok"));
    }
}
