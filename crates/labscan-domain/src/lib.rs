//! LabScan Domain Layer
//!
//! This crate contains the core value types and pure business rules for
//! LabScan. It defines the concepts every other layer exchanges and the trait
//! interfaces for the collaborators the extraction core consumes.
//!
//! ## Key Concepts
//!
//! - **Biomarker reading**: one classified measurement (value, unit, range, status)
//! - **Status**: normal, borderline or abnormal against the reference range
//! - **Extraction result**: every reading plus metadata found in one document
//! - **Health record**: the result packaged with OCR details for storage
//!
//! ## Architecture
//!
//! - Minimal external dependencies (dates, identifiers, serialization)
//! - Pure logic only: no I/O, no global state
//! - OCR and entity recognition are reached through traits; their
//!   implementations live in other crates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod entity;
pub mod reading;
pub mod record;
pub mod result;
pub mod status;
pub mod traits;

// Re-exports for convenience
pub use entity::{Entity, EntityLabel};
pub use reading::{BiomarkerReading, Measurement};
pub use record::{HealthRecord, ProcessingMetadata, RecordId};
pub use result::ExtractionResult;
pub use status::{classify, classify_composite, BiomarkerStatus};
pub use traits::{EntityRecognizer, OcrOutput, OcrProvider};
