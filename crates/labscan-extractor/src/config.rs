//! Configuration for the Extractor

use crate::error::ExtractorError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration for extraction and the document pipeline
///
/// Every field has a default, so a TOML file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Repair digits OCR misread as `o`, `i` or `l` inside numeric tokens
    pub ocr_correction: bool,

    /// Run the pattern entity recognizer (otherwise entities are empty)
    pub entity_recognition: bool,

    /// Shortest accepted facility name (characters)
    pub facility_min_len: usize,

    /// Longest accepted facility name (characters)
    pub facility_max_len: usize,

    /// Test type reported when nothing identifies one
    pub default_test_type: String,

    /// Facility reported when no candidate line is plausible
    pub default_facility: String,

    /// Facility reported by the empty result
    pub unknown_facility: String,

    /// Maximum time for one OCR call (seconds)
    pub ocr_timeout_secs: u64,

    /// Documents processed at once by a batch
    pub max_concurrent_documents: usize,
}

impl ExtractorConfig {
    /// Get the OCR timeout as a Duration
    pub fn ocr_timeout(&self) -> Duration {
        Duration::from_secs(self.ocr_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ExtractorError> {
        if self.facility_min_len == 0 {
            return Err(ExtractorError::Config(
                "facility_min_len must be greater than 0".to_string(),
            ));
        }
        if self.facility_min_len > self.facility_max_len {
            return Err(ExtractorError::Config(
                "facility_min_len cannot exceed facility_max_len".to_string(),
            ));
        }
        if self.default_test_type.trim().is_empty() {
            return Err(ExtractorError::Config(
                "default_test_type must not be empty".to_string(),
            ));
        }
        if self.default_facility.trim().is_empty() || self.unknown_facility.trim().is_empty() {
            return Err(ExtractorError::Config(
                "facility defaults must not be empty".to_string(),
            ));
        }
        if self.ocr_timeout_secs == 0 {
            return Err(ExtractorError::Config(
                "ocr_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.max_concurrent_documents == 0 {
            return Err(ExtractorError::Config(
                "max_concurrent_documents must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ExtractorError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ExtractorError> {
        toml::to_string_pretty(self)
            .map_err(|e| ExtractorError::Config(format!("Failed to serialize to TOML: {}", e)))
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ExtractorError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            ocr_correction: true,
            entity_recognition: true,
            facility_min_len: 5,
            facility_max_len: 100,
            default_test_type: "Medical Test".to_string(),
            default_facility: "Medical Facility".to_string(),
            unknown_facility: "Unknown Facility".to_string(),
            ocr_timeout_secs: 60,
            max_concurrent_documents: 4,
        }
    }
}
