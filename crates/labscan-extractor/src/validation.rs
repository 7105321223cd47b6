//! Post-extraction sanity checks
//!
//! Validation never changes readings. It reports what a reviewer should look
//! at: names the catalog does not know, values far outside anything
//! plausible, and borderline values worth retesting. Negative or non-finite
//! values cannot come from a lab report and are errors.

use crate::catalog::Catalog;
use labscan_domain::{BiomarkerReading, BiomarkerStatus, Measurement};
use serde::Serialize;
use std::collections::BTreeMap;

/// Multiple of the normal maximum above which a value is suspicious
pub const EXTREME_FACTOR: f64 = 5.0;

/// Outcome of validating a set of readings
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    /// False only when `errors` is non-empty
    pub valid: bool,

    /// Issues worth a look that do not invalidate the readings
    pub warnings: Vec<String>,

    /// Issues that make the readings unusable
    pub errors: Vec<String>,

    /// Follow-up actions for the patient or clinician
    pub suggestions: Vec<String>,
}

impl ValidationReport {
    /// Whether there is nothing to report
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.errors.is_empty() && self.suggestions.is_empty()
    }
}

/// Check readings against the catalog
///
/// # Examples
///
/// ```
/// use labscan_extractor::{validate_biomarkers, Catalog};
/// use labscan_domain::{BiomarkerReading, BiomarkerStatus};
/// use std::collections::BTreeMap;
///
/// let catalog = Catalog::builtin().unwrap();
/// let mut readings = BTreeMap::new();
/// readings.insert(
///     "blood_sugar".to_string(),
///     BiomarkerReading::single("blood_sugar", 600.0, "mg/dl", "70-100", BiomarkerStatus::Abnormal),
/// );
///
/// let report = validate_biomarkers(&readings, &catalog);
/// assert!(report.valid);
/// assert_eq!(report.warnings.len(), 1);
/// ```
pub fn validate_biomarkers(
    readings: &BTreeMap<String, BiomarkerReading>,
    catalog: &Catalog,
) -> ValidationReport {
    let mut report = ValidationReport::default();

    for (name, reading) in readings {
        if let Some(value) = impossible_value(reading) {
            report
                .errors
                .push(format!("{} has impossible value {}", name, value));
            continue;
        }

        let Some(spec) = catalog.get(name) else {
            report.warnings.push(format!("Unknown biomarker: {}", name));
            continue;
        };

        if let (Some(value), Some(max)) = (reading.value(), spec.bounds.max()) {
            if spec.to_canonical(value, &reading.unit) > max * EXTREME_FACTOR {
                report
                    .warnings
                    .push(format!("{} value {} seems extremely high", name, value));
            }
        }

        if reading.status == BiomarkerStatus::Borderline {
            report.suggestions.push(format!(
                "Consider retesting {} as value is borderline",
                name
            ));
        }
    }

    report.valid = report.errors.is_empty();
    report
}

/// The first negative or non-finite component of a reading
fn impossible_value(reading: &BiomarkerReading) -> Option<f64> {
    let values = match reading.measurement {
        Measurement::Single { value } => vec![value],
        Measurement::Composite {
            systolic,
            diastolic,
        } => vec![systolic, diastolic],
    };
    values.into_iter().find(|v| !v.is_finite() || *v < 0.0)
}
