//! Reading module - one classified biomarker measurement

use crate::BiomarkerStatus;
use serde::Serialize;

/// The numeric part of a reading
///
/// Serialized untagged so a reading renders as `{value, ...}` or
/// `{systolic, diastolic, ...}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Measurement {
    /// A single value (hemoglobin, glucose, ...)
    Single {
        /// Measured value
        value: f64,
    },

    /// A systolic/diastolic pair (blood pressure)
    Composite {
        /// Systolic component
        systolic: f64,
        /// Diastolic component
        diastolic: f64,
    },
}

/// A biomarker reading extracted from one document
///
/// Readings are created fresh per extraction and never mutated. The `name`
/// is the key of the reading in [`crate::ExtractionResult::biomarkers`], so it
/// is not repeated in the serialized form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BiomarkerReading {
    /// Catalog name of the biomarker (e.g. `hemoglobin`)
    #[serde(skip)]
    pub name: String,

    /// Measured value(s)
    #[serde(flatten)]
    pub measurement: Measurement,

    /// Unit as reported in the document, or the catalog's canonical unit
    pub unit: String,

    /// Human-readable reference range (e.g. `12.0-16.0`, `<200`)
    #[serde(rename = "range")]
    pub range_label: String,

    /// Classification against the reference range
    pub status: BiomarkerStatus,
}

impl BiomarkerReading {
    /// Create a single-valued reading
    pub fn single(
        name: impl Into<String>,
        value: f64,
        unit: impl Into<String>,
        range_label: impl Into<String>,
        status: BiomarkerStatus,
    ) -> Self {
        Self {
            name: name.into(),
            measurement: Measurement::Single { value },
            unit: unit.into(),
            range_label: range_label.into(),
            status,
        }
    }

    /// Create a systolic/diastolic reading
    pub fn composite(
        name: impl Into<String>,
        systolic: f64,
        diastolic: f64,
        unit: impl Into<String>,
        range_label: impl Into<String>,
        status: BiomarkerStatus,
    ) -> Self {
        Self {
            name: name.into(),
            measurement: Measurement::Composite { systolic, diastolic },
            unit: unit.into(),
            range_label: range_label.into(),
            status,
        }
    }

    /// The single value, if this is not a composite reading
    pub fn value(&self) -> Option<f64> {
        match self.measurement {
            Measurement::Single { value } => Some(value),
            Measurement::Composite { .. } => None,
        }
    }

    /// Render the measurement for display (`13.5` or `150/95`)
    pub fn display_value(&self) -> String {
        match self.measurement {
            Measurement::Single { value } => format!("{}", value),
            Measurement::Composite { systolic, diastolic } => format!("{}/{}", systolic, diastolic),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_reading_serialization() {
        let reading = BiomarkerReading::single(
            "hemoglobin",
            13.5,
            "g/dl",
            "12.0-16.0",
            BiomarkerStatus::Normal,
        );
        let json = serde_json::to_value(&reading).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "value": 13.5,
                "unit": "g/dl",
                "range": "12.0-16.0",
                "status": "normal"
            })
        );
    }

    #[test]
    fn test_composite_reading_serialization() {
        let reading = BiomarkerReading::composite(
            "blood_pressure",
            150.0,
            95.0,
            "mmHg",
            "120/80",
            BiomarkerStatus::Abnormal,
        );
        let json = serde_json::to_value(&reading).unwrap();
        assert_eq!(json["systolic"], 150.0);
        assert_eq!(json["diastolic"], 95.0);
        assert_eq!(json["status"], "abnormal");
        assert!(json.get("value").is_none());
        assert!(json.get("name").is_none());
    }

    #[test]
    fn test_display_value() {
        let single = BiomarkerReading::single("albumin", 4.2, "g/dl", "3.5-5.0", BiomarkerStatus::Normal);
        assert_eq!(single.display_value(), "4.2");
        assert_eq!(single.value(), Some(4.2));

        let bp = BiomarkerReading::composite("blood_pressure", 120.0, 80.0, "mmHg", "120/80", BiomarkerStatus::Normal);
        assert_eq!(bp.display_value(), "120/80");
        assert_eq!(bp.value(), None);
    }
}
