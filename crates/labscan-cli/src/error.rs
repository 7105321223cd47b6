//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Extractor construction error
    #[error("Extractor error: {0}")]
    Extractor(#[from] labscan_extractor::ExtractorError),

    /// Document pipeline error
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] labscan_extractor::PipelineError),

    /// Some documents in a scan could not be processed
    #[error("{failed} of {total} document(s) failed")]
    DocumentsFailed {
        /// Number of failed documents
        failed: usize,
        /// Number of documents scanned
        total: usize,
    },
}
