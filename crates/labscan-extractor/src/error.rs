//! Error types for the Extractor

use thiserror::Error;

/// Errors raised while building an extractor
///
/// Extraction itself never fails; these only surface at construction time,
/// when the catalog or configuration is loaded.
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Catalog row is inconsistent (missing bounds, no patterns, duplicate name)
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// A recognition pattern failed to compile or has too few capture groups
    #[error("Pattern error for '{name}': {reason}")]
    Pattern {
        /// Biomarker the pattern belongs to
        name: String,
        /// What went wrong
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(String),

    /// I/O error reading a configuration or catalog file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for ExtractorError {
    fn from(e: toml::de::Error) -> Self {
        ExtractorError::TomlParse(e.to_string())
    }
}

/// Errors raised while processing a document end to end
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The OCR provider failed
    #[error("OCR unavailable: {0}")]
    OcrUnavailable(String),

    /// OCR did not finish within the configured timeout
    #[error("OCR timed out after {0}s")]
    Timeout(u64),

    /// The blocking OCR task panicked or was cancelled
    #[error("Task failed: {0}")]
    Join(String),
}

impl From<tokio::task::JoinError> for PipelineError {
    fn from(e: tokio::task::JoinError) -> Self {
        PipelineError::Join(e.to_string())
    }
}
