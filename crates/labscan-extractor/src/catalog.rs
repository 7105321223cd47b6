//! Biomarker catalog
//!
//! One row per tracked biomarker: the phrasings that name it, the units it is
//! reported in, and the bounds its status is classified against. Rows are
//! compiled into regular expressions once, when the catalog is built, and the
//! catalog is read-only afterwards.
//!
//! Extra rows can be supplied as TOML and merged onto the built-in table:
//!
//! ```toml
//! [[biomarkers]]
//! name = "vitamin_d"
//! synonyms = ["vitamin d", "25-oh vitamin d"]
//! units = ["ng/ml"]
//! canonical_unit = "ng/mL"
//! range = "30-100"
//! min = 30.0
//! max = 100.0
//!
//! [biomarkers.conversions]
//! "nmol/l" = 0.4
//! ```
//!
//! Values reported in a unit listed under `conversions` are multiplied by its
//! factor before classification. The reading itself keeps the value and unit
//! as written.

use crate::error::ExtractorError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// A reading value: integers, decimals, or thousands-grouped integers (`7,500`)
const NUMBER: &str = r"(\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+\.?\d*)";

/// Systolic/diastolic pair for composite readings
const PAIR: &str = r"(\d{2,3})\s*/\s*(\d{2,3})";

/// A short parenthesised alias after the name, as in `SGPT (ALT)`
const ALIAS: &str = r"(?:\s*\([^)]{1,20}\))?";

/// How a row's unit appears after the number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitMode {
    /// One of the units must follow and is reported as written
    #[default]
    Captured,
    /// A unit may follow; the canonical unit is reported when it does not
    Optional,
    /// A fixed unit (such as `%`) must follow; the canonical unit is reported
    Implicit,
}

/// Normal bounds for a biomarker
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bounds {
    /// Inclusive normal range for a single value
    Range {
        /// Lower bound
        min: f64,
        /// Upper bound
        max: f64,
    },
    /// Upper bounds for a systolic/diastolic pair
    Composite {
        /// Highest normal systolic value
        systolic_max: f64,
        /// Highest normal diastolic value
        diastolic_max: f64,
    },
}

impl Bounds {
    /// Whether readings carry a value pair
    pub fn is_composite(&self) -> bool {
        matches!(self, Bounds::Composite { .. })
    }

    /// Upper bound of a single-value range
    pub fn max(&self) -> Option<f64> {
        match self {
            Bounds::Range { max, .. } => Some(*max),
            Bounds::Composite { .. } => None,
        }
    }
}

/// A catalog row as written by hand, before compilation
///
/// This is also the TOML shape of `[[biomarkers]]` extension rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiomarkerDef {
    /// Unique key, e.g. `hemoglobin`
    pub name: String,

    /// Phrasings that name the biomarker; spaces match any whitespace
    #[serde(default)]
    pub synonyms: Vec<String>,

    /// Raw patterns used verbatim after the generated ones
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Unit spellings, as they appear in normalized text
    #[serde(default)]
    pub units: Vec<String>,

    /// How the unit appears after the number
    #[serde(default)]
    pub unit_mode: UnitMode,

    /// Unit reported when none is captured
    pub canonical_unit: String,

    /// Human-readable normal range
    pub range: String,

    /// Lower normal bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    /// Upper normal bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    /// Highest normal systolic value (composite rows)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub systolic_max: Option<f64>,

    /// Highest normal diastolic value (composite rows)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diastolic_max: Option<f64>,

    /// Words that disqualify a match when they come right before it
    #[serde(default)]
    pub excluded_qualifiers: Vec<String>,

    /// Factors taking a value in another unit to the canonical unit
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub conversions: BTreeMap<String, f64>,
}

impl BiomarkerDef {
    fn bounds(&self) -> Result<Bounds, ExtractorError> {
        match (self.min, self.max, self.systolic_max, self.diastolic_max) {
            (min, Some(max), None, None) => {
                let min = min.unwrap_or(0.0);
                if min > max {
                    return Err(ExtractorError::Catalog(format!(
                        "{}: min {} exceeds max {}",
                        self.name, min, max
                    )));
                }
                Ok(Bounds::Range { min, max })
            }
            (None, None, Some(systolic_max), Some(diastolic_max)) => Ok(Bounds::Composite {
                systolic_max,
                diastolic_max,
            }),
            _ => Err(ExtractorError::Catalog(format!(
                "{}: needs either max (and optional min) or systolic_max and diastolic_max",
                self.name
            ))),
        }
    }

    fn conversions(&self) -> Result<BTreeMap<String, f64>, ExtractorError> {
        self.conversions
            .iter()
            .map(|(unit, factor)| {
                if !factor.is_finite() || *factor <= 0.0 {
                    return Err(ExtractorError::Catalog(format!(
                        "{}: conversion factor for '{}' must be positive, got {}",
                        self.name, unit, factor
                    )));
                }
                Ok((unit.to_lowercase(), *factor))
            })
            .collect()
    }

    fn unit_group(&self) -> Result<String, ExtractorError> {
        let mut units: Vec<&str> = self.units.iter().map(String::as_str).collect();
        // Longest first so `cells/μl` is preferred over `/μl`
        units.sort_by(|a, b| b.len().cmp(&a.len()));
        let alternatives = units
            .iter()
            .map(|u| regex::escape(u))
            .collect::<Vec<_>>()
            .join("|");

        match (self.unit_mode, alternatives.is_empty()) {
            (UnitMode::Optional, true) => Ok(String::new()),
            (_, true) => Err(ExtractorError::Catalog(format!(
                "{}: unit mode {:?} requires at least one unit",
                self.name, self.unit_mode
            ))),
            (UnitMode::Captured, false) => Ok(format!(r"\s*({})", alternatives)),
            (UnitMode::Optional, false) => Ok(format!(r"\s*({})?", alternatives)),
            (UnitMode::Implicit, false) => Ok(format!(r"\s*(?:{})", alternatives)),
        }
    }

    fn compile(&self) -> Result<BiomarkerSpec, ExtractorError> {
        let bounds = self.bounds()?;
        let conversions = self.conversions()?;
        let value = if bounds.is_composite() { PAIR } else { NUMBER };
        let unit = self.unit_group()?;

        let mut sources: Vec<String> = self
            .synonyms
            .iter()
            .filter(|s| !s.trim().is_empty())
            .map(|s| format!(r"\b{}{}\s*[:=\-]?\s*{}{}", phrase_pattern(s), ALIAS, value, unit))
            .collect();
        sources.extend(self.patterns.iter().cloned());

        if sources.is_empty() {
            return Err(ExtractorError::Catalog(format!(
                "{}: no synonyms or patterns",
                self.name
            )));
        }

        let required_groups = if bounds.is_composite() { 2 } else { 1 };
        let patterns = sources
            .iter()
            .map(|source| {
                let re = Regex::new(source).map_err(|e| ExtractorError::Pattern {
                    name: self.name.clone(),
                    reason: e.to_string(),
                })?;
                // captures_len counts the implicit whole-match group
                if re.captures_len() - 1 < required_groups {
                    return Err(ExtractorError::Pattern {
                        name: self.name.clone(),
                        reason: format!(
                            "'{}' needs at least {} capture group(s)",
                            source, required_groups
                        ),
                    });
                }
                Ok(re)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(BiomarkerSpec {
            name: self.name.clone(),
            patterns,
            canonical_unit: self.canonical_unit.clone(),
            range_label: self.range.clone(),
            bounds,
            excluded_qualifiers: self
                .excluded_qualifiers
                .iter()
                .map(|q| q.to_lowercase())
                .collect(),
            conversions,
        })
    }
}

/// Regex for a phrase whose words may be separated by any whitespace
pub(crate) fn phrase_pattern(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .map(|word| regex::escape(&word.to_lowercase()))
        .collect::<Vec<_>>()
        .join(r"\s*")
}

/// A compiled catalog row
#[derive(Debug, Clone)]
pub struct BiomarkerSpec {
    /// Unique key
    pub name: String,

    /// Recognition patterns, tried in order
    pub patterns: Vec<Regex>,

    /// Unit reported when none is captured
    pub canonical_unit: String,

    /// Human-readable normal range
    pub range_label: String,

    /// Classification bounds
    pub bounds: Bounds,

    /// Words that disqualify a match when they come right before it
    pub excluded_qualifiers: Vec<String>,

    /// Lowercase unit to canonical-unit factor
    pub conversions: BTreeMap<String, f64>,
}

impl BiomarkerSpec {
    /// A value in `unit` expressed in the canonical unit
    ///
    /// Units without a conversion are taken to be canonical already.
    pub fn to_canonical(&self, value: f64, unit: &str) -> f64 {
        match self.conversions.get(&unit.to_lowercase()) {
            Some(factor) => value * factor,
            None => value,
        }
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    biomarkers: Vec<BiomarkerDef>,
}

/// The compiled, read-only biomarker catalog
///
/// # Examples
///
/// ```
/// use labscan_extractor::Catalog;
///
/// let catalog = Catalog::builtin().unwrap();
/// assert!(catalog.get("hemoglobin").is_some());
/// assert!(catalog.get("blood_pressure").unwrap().bounds.is_composite());
/// ```
#[derive(Debug, Clone)]
pub struct Catalog {
    specs: Vec<BiomarkerSpec>,
}

impl Catalog {
    /// Compile a catalog from row definitions
    ///
    /// Fails on duplicate names, rows without bounds or patterns, and
    /// patterns that do not compile.
    pub fn from_defs(defs: &[BiomarkerDef]) -> Result<Self, ExtractorError> {
        let mut seen = HashSet::new();
        let mut specs = Vec::with_capacity(defs.len());

        for def in defs {
            if def.name.trim().is_empty() {
                return Err(ExtractorError::Catalog("row with empty name".to_string()));
            }
            if !seen.insert(def.name.as_str()) {
                return Err(ExtractorError::Catalog(format!(
                    "duplicate biomarker '{}'",
                    def.name
                )));
            }
            specs.push(def.compile()?);
        }

        Ok(Self { specs })
    }

    /// The built-in catalog
    pub fn builtin() -> Result<Self, ExtractorError> {
        Self::from_defs(&builtin_defs())
    }

    /// The built-in catalog with TOML rows merged on top
    ///
    /// A row whose name matches a built-in row replaces it in place; other
    /// rows are appended.
    pub fn with_extensions(toml_str: &str) -> Result<Self, ExtractorError> {
        let file: CatalogFile = toml::from_str(toml_str)?;
        let mut defs = builtin_defs();

        let mut added = HashSet::new();
        for row in file.biomarkers {
            if !added.insert(row.name.clone()) {
                return Err(ExtractorError::Catalog(format!(
                    "duplicate biomarker '{}' in extension",
                    row.name
                )));
            }
            match defs.iter_mut().find(|d| d.name == row.name) {
                Some(existing) => *existing = row,
                None => defs.push(row),
            }
        }

        Self::from_defs(&defs)
    }

    /// The built-in catalog extended from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ExtractorError> {
        let contents = std::fs::read_to_string(path)?;
        Self::with_extensions(&contents)
    }

    /// Look up a row by name
    pub fn get(&self, name: &str) -> Option<&BiomarkerSpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    /// Whether a biomarker name is known
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Rows in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &BiomarkerSpec> {
        self.specs.iter()
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether the catalog has no rows
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

struct Row {
    name: &'static str,
    synonyms: &'static [&'static str],
    units: &'static [&'static str],
    unit_mode: UnitMode,
    canonical_unit: &'static str,
    range: &'static str,
    bounds: Bounds,
    excluded: &'static [&'static str],
    conversions: &'static [(&'static str, f64)],
}

const MG_DL: &[&str] = &["mg/dl"];
const G_DL: &[&str] = &["g/dl", "g%"];
const PER_UL: &[&str] = &["/μl", "/ul", "cells/μl", "cells/ul", "/cumm", "/mm3"];
const ENZYME: &[&str] = &["u/l", "iu/l"];

const fn range(min: f64, max: f64) -> Bounds {
    Bounds::Range { min, max }
}

const BUILTIN: &[Row] = &[
    Row {
        name: "hemoglobin",
        synonyms: &["hemoglobin", "haemoglobin", "hgb", "hb"],
        units: G_DL,
        unit_mode: UnitMode::Captured,
        canonical_unit: "g/dL",
        range: "12.0-16.0",
        bounds: range(12.0, 16.0),
        excluded: &[],
        conversions: &[],
    },
    Row {
        name: "blood_sugar",
        synonyms: &[
            "fasting blood sugar",
            "fasting glucose",
            "random glucose",
            "blood sugar",
            "blood glucose",
            "glucose",
        ],
        units: &["mg/dl", "mmol/l"],
        unit_mode: UnitMode::Captured,
        canonical_unit: "mg/dL",
        range: "70-100",
        bounds: range(70.0, 100.0),
        excluded: &[],
        conversions: &[("mmol/l", 18.016)],
    },
    Row {
        name: "cholesterol",
        synonyms: &["total cholesterol", "cholesterol, total", "cholesterol", "chol"],
        units: MG_DL,
        unit_mode: UnitMode::Captured,
        canonical_unit: "mg/dL",
        range: "<200",
        bounds: range(0.0, 200.0),
        excluded: &["ldl", "hdl", "vldl"],
        conversions: &[],
    },
    Row {
        name: "ldl_cholesterol",
        synonyms: &[
            "ldl cholesterol",
            "ldl-cholesterol",
            "ldl-c",
            "ldl",
            "low density lipoprotein",
        ],
        units: MG_DL,
        unit_mode: UnitMode::Captured,
        canonical_unit: "mg/dL",
        range: "<100",
        bounds: range(0.0, 100.0),
        excluded: &["non"],
        conversions: &[],
    },
    Row {
        name: "hdl_cholesterol",
        synonyms: &[
            "hdl cholesterol",
            "hdl-cholesterol",
            "hdl-c",
            "hdl",
            "high density lipoprotein",
        ],
        units: MG_DL,
        unit_mode: UnitMode::Captured,
        canonical_unit: "mg/dL",
        range: ">40",
        bounds: range(40.0, 999.0),
        excluded: &["non"],
        conversions: &[],
    },
    Row {
        name: "triglycerides",
        synonyms: &["triglycerides", "triglyceride", "trigs", "tg"],
        units: MG_DL,
        unit_mode: UnitMode::Captured,
        canonical_unit: "mg/dL",
        range: "<150",
        bounds: range(0.0, 150.0),
        excluded: &[],
        conversions: &[],
    },
    Row {
        name: "wbc",
        synonyms: &[
            "total leukocyte count",
            "white blood cells",
            "white blood cell count",
            "leukocytes",
            "tlc",
            "wbc",
        ],
        units: PER_UL,
        unit_mode: UnitMode::Captured,
        canonical_unit: "/μL",
        range: "4000-11000",
        bounds: range(4000.0, 11000.0),
        excluded: &[],
        conversions: &[],
    },
    Row {
        name: "platelets",
        synonyms: &["platelet count", "platelets", "thrombocytes", "plt"],
        units: PER_UL,
        unit_mode: UnitMode::Captured,
        canonical_unit: "/μL",
        range: "150000-450000",
        bounds: range(150_000.0, 450_000.0),
        excluded: &[],
        conversions: &[],
    },
    Row {
        name: "hematocrit",
        synonyms: &["hematocrit", "haematocrit", "packed cell volume", "pcv", "hct"],
        units: &["%"],
        unit_mode: UnitMode::Implicit,
        canonical_unit: "%",
        range: "36-46",
        bounds: range(36.0, 46.0),
        excluded: &[],
        conversions: &[],
    },
    Row {
        name: "alt",
        synonyms: &["alanine aminotransferase", "sgpt", "alt"],
        units: ENZYME,
        unit_mode: UnitMode::Captured,
        canonical_unit: "U/L",
        range: "7-45",
        bounds: range(7.0, 45.0),
        excluded: &[],
        conversions: &[],
    },
    Row {
        name: "ast",
        synonyms: &["aspartate aminotransferase", "sgot", "ast"],
        units: ENZYME,
        unit_mode: UnitMode::Captured,
        canonical_unit: "U/L",
        range: "8-40",
        bounds: range(8.0, 40.0),
        excluded: &[],
        conversions: &[],
    },
    Row {
        name: "bilirubin_total",
        synonyms: &["total bilirubin", "bilirubin total", "bilirubin, total", "bil total"],
        units: MG_DL,
        unit_mode: UnitMode::Captured,
        canonical_unit: "mg/dL",
        range: "0.3-1.2",
        bounds: range(0.3, 1.2),
        excluded: &[],
        conversions: &[],
    },
    Row {
        name: "albumin",
        synonyms: &["serum albumin", "albumin", "alb"],
        units: &["g/dl"],
        unit_mode: UnitMode::Captured,
        canonical_unit: "g/dL",
        range: "3.5-5.0",
        bounds: range(3.5, 5.0),
        excluded: &[],
        conversions: &[],
    },
    Row {
        name: "creatinine",
        synonyms: &["serum creatinine", "creatinine", "creat"],
        units: MG_DL,
        unit_mode: UnitMode::Captured,
        canonical_unit: "mg/dL",
        range: "0.6-1.2",
        bounds: range(0.6, 1.2),
        excluded: &[],
        conversions: &[],
    },
    Row {
        name: "blood_urea",
        synonyms: &["blood urea nitrogen", "blood urea", "bun", "urea"],
        units: MG_DL,
        unit_mode: UnitMode::Captured,
        canonical_unit: "mg/dL",
        range: "7-20",
        bounds: range(7.0, 20.0),
        excluded: &[],
        conversions: &[],
    },
    Row {
        name: "hba1c",
        synonyms: &["glycated hemoglobin", "glycosylated hemoglobin", "hba1c", "a1c"],
        units: &["%"],
        unit_mode: UnitMode::Implicit,
        canonical_unit: "%",
        range: "4.0-5.6",
        bounds: range(4.0, 5.6),
        excluded: &[],
        conversions: &[],
    },
    Row {
        name: "tsh",
        synonyms: &["thyroid stimulating hormone", "tsh"],
        units: &["miu/l", "μiu/ml", "uiu/ml", "miu/ml"],
        unit_mode: UnitMode::Captured,
        canonical_unit: "mIU/L",
        range: "0.4-4.0",
        bounds: range(0.4, 4.0),
        excluded: &[],
        conversions: &[],
    },
    Row {
        name: "blood_pressure",
        synonyms: &["blood pressure", "bp"],
        units: &["mmhg", "mm hg"],
        unit_mode: UnitMode::Optional,
        canonical_unit: "mmHg",
        range: "120/80",
        bounds: Bounds::Composite {
            systolic_max: 120.0,
            diastolic_max: 80.0,
        },
        excluded: &[],
        conversions: &[],
    },
];

/// The built-in rows as editable definitions
pub fn builtin_defs() -> Vec<BiomarkerDef> {
    BUILTIN
        .iter()
        .map(|row| {
            let (min, max, systolic_max, diastolic_max) = match row.bounds {
                Bounds::Range { min, max } => (Some(min), Some(max), None, None),
                Bounds::Composite {
                    systolic_max,
                    diastolic_max,
                } => (None, None, Some(systolic_max), Some(diastolic_max)),
            };
            BiomarkerDef {
                name: row.name.to_string(),
                synonyms: row.synonyms.iter().map(|s| s.to_string()).collect(),
                patterns: Vec::new(),
                units: row.units.iter().map(|s| s.to_string()).collect(),
                unit_mode: row.unit_mode,
                canonical_unit: row.canonical_unit.to_string(),
                range: row.range.to_string(),
                min,
                max,
                systolic_max,
                diastolic_max,
                excluded_qualifiers: row.excluded.iter().map(|s| s.to_string()).collect(),
                conversions: row
                    .conversions
                    .iter()
                    .map(|(unit, factor)| (unit.to_string(), *factor))
                    .collect(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(name: &str) -> BiomarkerDef {
        BiomarkerDef {
            name: name.to_string(),
            synonyms: vec![name.to_string()],
            patterns: Vec::new(),
            units: vec!["mg/dl".to_string()],
            unit_mode: UnitMode::Captured,
            canonical_unit: "mg/dL".to_string(),
            range: "0-10".to_string(),
            min: Some(0.0),
            max: Some(10.0),
            systolic_max: None,
            diastolic_max: None,
            excluded_qualifiers: Vec::new(),
            conversions: BTreeMap::new(),
        }
    }

    #[test]
    fn test_builtin_catalog_compiles() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.len(), BUILTIN.len());
        for name in [
            "hemoglobin",
            "blood_sugar",
            "cholesterol",
            "ldl_cholesterol",
            "hdl_cholesterol",
            "triglycerides",
            "wbc",
            "platelets",
            "hematocrit",
            "alt",
            "ast",
            "bilirubin_total",
            "albumin",
            "creatinine",
            "blood_urea",
            "hba1c",
            "tsh",
            "blood_pressure",
        ] {
            assert!(catalog.contains(name), "missing {}", name);
        }
    }

    #[test]
    fn test_every_row_has_patterns() {
        let catalog = Catalog::builtin().unwrap();
        assert!(catalog.iter().all(|s| !s.patterns.is_empty()));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = Catalog::from_defs(&[def("x"), def("x")]);
        assert!(matches!(result, Err(ExtractorError::Catalog(_))));
    }

    #[test]
    fn test_missing_bounds_rejected() {
        let mut row = def("x");
        row.max = None;
        assert!(matches!(Catalog::from_defs(&[row]), Err(ExtractorError::Catalog(_))));
    }

    #[test]
    fn test_mixed_bounds_rejected() {
        let mut row = def("x");
        row.systolic_max = Some(120.0);
        assert!(matches!(Catalog::from_defs(&[row]), Err(ExtractorError::Catalog(_))));
    }

    #[test]
    fn test_row_without_patterns_rejected() {
        let mut row = def("x");
        row.synonyms.clear();
        assert!(matches!(Catalog::from_defs(&[row]), Err(ExtractorError::Catalog(_))));
    }

    #[test]
    fn test_invalid_raw_pattern_rejected() {
        let mut row = def("x");
        row.patterns.push("(unclosed".to_string());
        assert!(matches!(
            Catalog::from_defs(&[row]),
            Err(ExtractorError::Pattern { .. })
        ));
    }

    #[test]
    fn test_capture_group_count_checked() {
        let mut row = def("x");
        row.patterns.push(r"x\s*\d+".to_string());
        assert!(matches!(
            Catalog::from_defs(&[row]),
            Err(ExtractorError::Pattern { .. })
        ));

        let mut bp = def("pressure");
        bp.min = None;
        bp.max = None;
        bp.systolic_max = Some(120.0);
        bp.diastolic_max = Some(80.0);
        bp.synonyms.clear();
        bp.patterns.push(r"pressure (\d+)".to_string());
        assert!(matches!(
            Catalog::from_defs(&[bp]),
            Err(ExtractorError::Pattern { .. })
        ));
    }

    #[test]
    fn test_extension_adds_and_replaces_rows() {
        let toml_str = r#"
            [[biomarkers]]
            name = "vitamin_d"
            synonyms = ["vitamin d"]
            units = ["ng/ml"]
            canonical_unit = "ng/mL"
            range = "30-100"
            min = 30.0
            max = 100.0

            [[biomarkers]]
            name = "hemoglobin"
            synonyms = ["hb"]
            units = ["g/dl"]
            canonical_unit = "g/dL"
            range = "13.0-17.0"
            min = 13.0
            max = 17.0
        "#;

        let catalog = Catalog::with_extensions(toml_str).unwrap();
        assert_eq!(catalog.len(), BUILTIN.len() + 1);
        assert_eq!(catalog.get("hemoglobin").unwrap().range_label, "13.0-17.0");
        assert_eq!(catalog.get("hemoglobin").unwrap().patterns.len(), 1);
        assert!(catalog.contains("vitamin_d"));
        // Replaced rows keep their position
        assert_eq!(catalog.iter().next().unwrap().name, "hemoglobin");
    }

    #[test]
    fn test_extension_duplicate_rejected() {
        let toml_str = r#"
            [[biomarkers]]
            name = "ferritin"
            synonyms = ["ferritin"]
            units = ["ng/ml"]
            canonical_unit = "ng/mL"
            range = "20-250"
            max = 250.0

            [[biomarkers]]
            name = "ferritin"
            synonyms = ["ferritin"]
            units = ["ng/ml"]
            canonical_unit = "ng/mL"
            range = "20-250"
            max = 250.0
        "#;
        assert!(matches!(
            Catalog::with_extensions(toml_str),
            Err(ExtractorError::Catalog(_))
        ));
    }

    #[test]
    fn test_extension_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.toml");
        std::fs::write(
            &path,
            "[[biomarkers]]\nname = \"ferritin\"\nsynonyms = [\"ferritin\"]\nunits = [\"ng/ml\"]\ncanonical_unit = \"ng/mL\"\nrange = \"20-250\"\nmin = 20.0\nmax = 250.0\n",
        )
        .unwrap();

        let catalog = Catalog::from_file(&path).unwrap();
        assert!(catalog.contains("ferritin"));
    }

    #[test]
    fn test_conversions_normalize_units() {
        let catalog = Catalog::builtin().unwrap();
        let glucose = catalog.get("blood_sugar").unwrap();
        assert!((glucose.to_canonical(5.5, "mmol/l") - 99.088).abs() < 1e-9);
        assert!((glucose.to_canonical(5.5, "MMOL/L") - 99.088).abs() < 1e-9);
        assert_eq!(glucose.to_canonical(95.0, "mg/dl"), 95.0);
    }

    #[test]
    fn test_invalid_conversion_factor_rejected() {
        let mut row = def("x");
        row.conversions.insert("mmol/l".to_string(), 0.0);
        assert!(matches!(Catalog::from_defs(&[row]), Err(ExtractorError::Catalog(_))));
    }

    #[test]
    fn test_extension_conversions() {
        let toml_str = r#"
            [[biomarkers]]
            name = "vitamin_d"
            synonyms = ["vitamin d"]
            units = ["ng/ml", "nmol/l"]
            canonical_unit = "ng/mL"
            range = "30-100"
            min = 30.0
            max = 100.0

            [biomarkers.conversions]
            "nmol/l" = 0.4
        "#;
        let catalog = Catalog::with_extensions(toml_str).unwrap();
        let spec = catalog.get("vitamin_d").unwrap();
        assert!((spec.to_canonical(75.0, "nmol/l") - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_phrase_pattern() {
        assert_eq!(phrase_pattern("blood  sugar"), r"blood\s*sugar");
        assert_eq!(phrase_pattern("ldl-c"), r"ldl\-c");
    }
}
