//! Extraction result module - everything found in one document

use crate::{BiomarkerReading, BiomarkerStatus, Entity};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Result of extracting one document's text
///
/// Built once per extraction call and immutable afterwards. Readings are keyed
/// by biomarker name in a sorted map, so two extractions of the same text
/// compare (and serialize) identically.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionResult {
    /// Readings keyed by biomarker name
    pub biomarkers: BTreeMap<String, BiomarkerReading>,

    /// Detected test type (e.g. "Lipid Panel")
    pub test_type: String,

    /// Issuing facility
    pub facility: String,

    /// Test date, serialized as `YYYY-MM-DD`
    pub date: NaiveDate,

    /// Auxiliary named entities
    pub entities: Vec<Entity>,

    /// Extraction confidence [0.0, 1.0], two decimals
    pub confidence_score: f64,

    /// Length of the raw input text in characters
    pub text_length: usize,

    /// When the extraction ran
    pub processed_at: DateTime<Utc>,
}

impl ExtractionResult {
    /// The result returned when nothing could be extracted
    ///
    /// No readings, no entities, confidence 0.0 and the date of `processed_at`.
    pub fn empty(
        test_type: impl Into<String>,
        facility: impl Into<String>,
        text_length: usize,
        processed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            biomarkers: BTreeMap::new(),
            test_type: test_type.into(),
            facility: facility.into(),
            date: processed_at.date_naive(),
            entities: Vec::new(),
            confidence_score: 0.0,
            text_length,
            processed_at,
        }
    }

    /// Number of biomarkers found
    pub fn biomarker_count(&self) -> usize {
        self.biomarkers.len()
    }

    /// Look up a reading by biomarker name
    pub fn get(&self, name: &str) -> Option<&BiomarkerReading> {
        self.biomarkers.get(name)
    }

    /// Readings whose status is borderline or abnormal
    pub fn flagged(&self) -> impl Iterator<Item = &BiomarkerReading> {
        self.biomarkers
            .values()
            .filter(|r| r.status != BiomarkerStatus::Normal)
    }
}
