//! Biomarker extraction
//!
//! Applies every catalog row against normalized text. Within a row, patterns
//! are tried in order and the first match that parses (and is not disqualified
//! by the word before it) wins; later occurrences are ignored. Values in a
//! non-canonical unit are converted for classification only.

use crate::catalog::{Bounds, BiomarkerSpec, Catalog};
use labscan_domain::{classify, classify_composite, BiomarkerReading};
use regex::Captures;
use std::collections::BTreeMap;
use tracing::debug;

/// Extract one reading per catalog row found in normalized text
///
/// # Examples
///
/// ```
/// use labscan_extractor::{extract_biomarkers, Catalog};
///
/// let catalog = Catalog::builtin().unwrap();
/// let readings = extract_biomarkers("hb: 13.5 g/dl bp: 150/95 mmhg", &catalog);
///
/// assert_eq!(readings["hemoglobin"].value(), Some(13.5));
/// assert_eq!(readings["blood_pressure"].display_value(), "150/95");
/// ```
pub fn extract_biomarkers(text: &str, catalog: &Catalog) -> BTreeMap<String, BiomarkerReading> {
    catalog
        .iter()
        .filter_map(|spec| find_reading(text, spec).map(|r| (spec.name.clone(), r)))
        .collect()
}

fn find_reading(text: &str, spec: &BiomarkerSpec) -> Option<BiomarkerReading> {
    for pattern in &spec.patterns {
        for caps in pattern.captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };

            if preceded_by_qualifier(text, whole.start(), &spec.excluded_qualifiers) {
                debug!(biomarker = %spec.name, matched = whole.as_str(), "Skipping qualified match");
                continue;
            }

            match read_match(&caps, spec) {
                Some(reading) => return Some(reading),
                None => {
                    debug!(biomarker = %spec.name, matched = whole.as_str(), "Skipping unparseable match");
                }
            }
        }
    }
    None
}

fn read_match(caps: &Captures, spec: &BiomarkerSpec) -> Option<BiomarkerReading> {
    match spec.bounds {
        Bounds::Range { min, max } => {
            let value = parse_number(caps.get(1)?.as_str())?;
            let unit = captured_unit(caps, 2, spec);
            let status = classify(spec.to_canonical(value, &unit), min, max);
            Some(BiomarkerReading::single(
                spec.name.clone(),
                value,
                unit,
                spec.range_label.clone(),
                status,
            ))
        }
        Bounds::Composite {
            systolic_max,
            diastolic_max,
        } => {
            let systolic = parse_number(caps.get(1)?.as_str())?;
            let diastolic = parse_number(caps.get(2)?.as_str())?;
            let unit = captured_unit(caps, 3, spec);
            let status = classify_composite(systolic, diastolic, systolic_max, diastolic_max);
            Some(BiomarkerReading::composite(
                spec.name.clone(),
                systolic,
                diastolic,
                unit,
                spec.range_label.clone(),
                status,
            ))
        }
    }
}

fn captured_unit(caps: &Captures, group: usize, spec: &BiomarkerSpec) -> String {
    caps.get(group)
        .map(|m| m.as_str().trim())
        .filter(|u| !u.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| spec.canonical_unit.clone())
}

/// Parse a captured number, dropping thousands separators
fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Whether the word right before `start` is one of `qualifiers`
fn preceded_by_qualifier(text: &str, start: usize, qualifiers: &[String]) -> bool {
    if qualifiers.is_empty() {
        return false;
    }
    let before = text[..start].trim_end_matches(|c: char| !c.is_alphanumeric());
    let word = before
        .rsplit(|c: char| !c.is_alphanumeric())
        .next()
        .unwrap_or_default();
    qualifiers.iter().any(|q| q == word)
}
