//! Record module - an extraction packaged for storage

use crate::{BiomarkerReading, ExtractionResult, OcrOutput};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Unique identifier for a health record based on UUIDv7
///
/// UUIDv7 provides:
/// - Chronological sortability (records list in upload order)
/// - 128-bit uniqueness
/// - No coordination required for generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(u128);

impl RecordId {
    /// Generate a new UUIDv7-based RecordId
    ///
    /// # Examples
    ///
    /// ```
    /// use labscan_domain::RecordId;
    ///
    /// let id = RecordId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a RecordId from a raw u128 value
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse a RecordId from its UUID string form
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid record id: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }

    /// Milliseconds since Unix epoch encoded in the identifier
    pub fn timestamp(&self) -> u64 {
        // UUIDv7: top 48 bits are Unix millisecond timestamp
        (self.0 >> 80) as u64
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// How a record was produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessingMetadata {
    /// When extraction ran
    pub processed_at: DateTime<Utc>,

    /// Pages reported by OCR
    pub ocr_pages: usize,

    /// Characters of recognized text
    pub text_length: usize,

    /// Number of readings extracted
    pub biomarkers_found: usize,

    /// Number of auxiliary entities tagged
    pub entities_found: usize,

    /// Extraction confidence [0.0, 1.0]
    pub extraction_confidence: f64,
}

/// A processed lab report, ready for the persistence layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthRecord {
    /// Record identifier
    pub id: RecordId,

    /// Test date
    pub date: NaiveDate,

    /// Test type (e.g. "Complete Blood Count")
    #[serde(rename = "type")]
    pub record_type: String,

    /// Issuing facility
    pub facility: String,

    /// Readings keyed by biomarker name
    pub biomarkers: BTreeMap<String, BiomarkerReading>,

    /// File name of the source document, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_document: Option<String>,

    /// OCR confidence carried through from the provider
    pub ocr_confidence: f64,

    /// Processing details
    pub processing_metadata: ProcessingMetadata,
}

impl HealthRecord {
    /// Package an extraction and its OCR output as a new record
    pub fn from_extraction(
        result: ExtractionResult,
        ocr: &OcrOutput,
        original_document: Option<String>,
    ) -> Self {
        let processing_metadata = ProcessingMetadata {
            processed_at: result.processed_at,
            ocr_pages: ocr.page_count,
            text_length: result.text_length,
            biomarkers_found: result.biomarkers.len(),
            entities_found: result.entities.len(),
            extraction_confidence: result.confidence_score,
        };

        Self {
            id: RecordId::new(),
            date: result.date,
            record_type: result.test_type,
            facility: result.facility,
            biomarkers: result.biomarkers,
            original_document,
            ocr_confidence: ocr.confidence,
            processing_metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BiomarkerStatus;
    use chrono::TimeZone;

    #[test]
    fn test_record_id_string_round_trip() {
        let id = RecordId::new();
        let parsed = RecordId::from_string(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
        assert!(RecordId::from_string("not-a-uuid").is_err());
    }

    #[test]
    fn test_from_extraction_carries_fields() {
        let processed_at = Utc.with_ymd_and_hms(2024, 3, 15, 8, 0, 0).unwrap();
        let mut result = ExtractionResult::empty("Complete Blood Count", "apollo diagnostics", 512, processed_at);
        result.biomarkers.insert(
            "hemoglobin".to_string(),
            BiomarkerReading::single("hemoglobin", 13.5, "g/dl", "12.0-16.0", BiomarkerStatus::Normal),
        );
        result.confidence_score = 0.41;
        let ocr = OcrOutput::new("...", 0.92, 2);

        let record = HealthRecord::from_extraction(result, &ocr, Some("cbc.jpg".to_string()));

        assert_eq!(record.record_type, "Complete Blood Count");
        assert_eq!(record.ocr_confidence, 0.92);
        assert_eq!(record.processing_metadata.ocr_pages, 2);
        assert_eq!(record.processing_metadata.biomarkers_found, 1);
        assert_eq!(record.processing_metadata.extraction_confidence, 0.41);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "Complete Blood Count");
        assert_eq!(json["original_document"], "cbc.jpg");
        assert_eq!(json["id"], record.id.to_string());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: identifier ordering matches u128 ordering
        #[test]
        fn test_record_id_ordering(a: u128, b: u128) {
            prop_assert_eq!(RecordId::from_value(a) < RecordId::from_value(b), a < b);
        }

        /// Property: string form round-trips
        #[test]
        fn test_record_id_string_roundtrip(value: u128) {
            let id = RecordId::from_value(value);
            match RecordId::from_string(&id.to_string()) {
                Ok(parsed) => prop_assert_eq!(id, parsed),
                Err(e) => return Err(TestCaseError::fail(e)),
            }
        }
    }
}
