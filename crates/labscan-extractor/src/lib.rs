//! LabScan Extractor
//!
//! Turns the raw text of a scanned lab report into typed, classified
//! biomarker readings plus report metadata.
//!
//! # Overview
//!
//! OCR output is noisy: mixed case, broken whitespace, digits read as letters,
//! several spellings for the same unit, and many phrasings per biomarker. The
//! extractor normalizes the text once and then runs independent, pattern-based
//! extractors over it, each falling back to a default when it finds nothing.
//!
//! # Architecture
//!
//! ```text
//! Text → Normalizer → { Biomarkers, Test type, Facility, Date, Entities }
//!                   → Confidence → ExtractionResult
//!
//! Document → OCR (blocking pool, timeout) → Extractor → HealthRecord
//! ```
//!
//! # Key Features
//!
//! - **Catalog-driven matching**: one row per biomarker, extendable from TOML
//! - **Status classification**: normal, borderline (within 10%), abnormal
//! - **Never fails**: broken sub-extractors degrade to defaults
//! - **Batch pipeline**: bounded concurrent OCR and extraction
//!
//! # Example Usage
//!
//! ```
//! use labscan_extractor::{Extractor, ExtractorConfig};
//!
//! let extractor = Extractor::new(ExtractorConfig::default()).unwrap();
//! let result = extractor.extract("BP: 150/95 mmHg\nDate: 15/03/2024");
//!
//! let bp = result.get("blood_pressure").unwrap();
//! assert_eq!(bp.display_value(), "150/95");
//! assert_eq!(result.date.to_string(), "2024-03-15");
//! ```

#![warn(missing_docs)]

mod biomarkers;
mod catalog;
mod confidence;
mod config;
mod entities;
mod error;
mod extractor;
mod metadata;
mod normalize;
mod pipeline;
mod validation;


pub use biomarkers::extract_biomarkers;
pub use catalog::{builtin_defs, BiomarkerDef, BiomarkerSpec, Bounds, Catalog, UnitMode};
pub use confidence::score_confidence;
pub use config::ExtractorConfig;
pub use entities::{NoopRecognizer, PatternRecognizer, PATTERN_CONFIDENCE};
pub use error::{ExtractorError, PipelineError};
pub use extractor::Extractor;
pub use metadata::{extract_date, extract_facility, extract_test_type};
pub use normalize::{normalize, normalize_lines};
pub use pipeline::{Document, DocumentProcessor};
pub use validation::{validate_biomarkers, ValidationReport, EXTREME_FACTOR};
