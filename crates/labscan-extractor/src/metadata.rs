//! Metadata extraction: test type, issuing facility and test date
//!
//! Each extractor walks an ordered list of candidate patterns, takes the first
//! plausible candidate, and otherwise falls back to a default.

use crate::catalog::phrase_pattern;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use labscan_domain::BiomarkerReading;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::debug;

struct TestTypeDef {
    name: &'static str,
    keywords: &'static [&'static str],
    implied_by: &'static [&'static str],
}

/// Test types in keyword-matching order
const TEST_TYPES: &[TestTypeDef] = &[
    TestTypeDef {
        name: "Complete Blood Count",
        keywords: &["complete blood count", "cbc", "hemogram", "haemogram", "hematology"],
        implied_by: &["hemoglobin", "wbc", "platelets", "hematocrit"],
    },
    TestTypeDef {
        name: "Lipid Panel",
        keywords: &["lipid profile", "lipid panel", "cholesterol test", "lipogram"],
        implied_by: &["cholesterol", "ldl_cholesterol", "hdl_cholesterol", "triglycerides"],
    },
    TestTypeDef {
        name: "Liver Function Test",
        keywords: &["liver function test", "lft", "hepatic panel", "liver profile"],
        implied_by: &["alt", "ast", "bilirubin_total", "albumin"],
    },
    TestTypeDef {
        name: "Kidney Function Test",
        keywords: &["kidney function test", "kft", "rft", "renal function", "renal profile"],
        implied_by: &["creatinine", "blood_urea"],
    },
    TestTypeDef {
        name: "Thyroid Function Test",
        keywords: &["thyroid function test", "tft", "thyroid profile", "t3", "t4"],
        implied_by: &["tsh"],
    },
    TestTypeDef {
        name: "Diabetes Test",
        keywords: &["diabetes", "diabetic profile", "glucose tolerance test", "gtt"],
        implied_by: &["blood_sugar", "hba1c"],
    },
];

/// Order in which extracted biomarkers imply a test type
const INFERENCE_ORDER: [&str; 6] = [
    "Lipid Panel",
    "Liver Function Test",
    "Complete Blood Count",
    "Kidney Function Test",
    "Thyroid Function Test",
    "Diabetes Test",
];

static TEST_TYPE_RES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    TEST_TYPES
        .iter()
        .map(|t| (t.name, whole_words(t.keywords)))
        .collect()
});

/// Institution words that mark a facility line
const FACILITY_KEYWORDS: &[&str] = &[
    "hospital",
    "clinic",
    "medical center",
    "diagnostics",
    "lab",
    "laboratory",
    "healthcare",
    "pathology",
];

static FACILITY_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:report\s*from|issued\s*by)\s*:?\s*(.+)$").expect("valid regex")
});

static FACILITY_KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| whole_words(FACILITY_KEYWORDS));

const NUMERIC_DATE: &str = r"\d{4}[-/.]\d{1,2}[-/.]\d{1,2}|\d{1,2}[-/.]\d{1,2}[-/.]\d{2,4}";
const MONTH: &str = r"(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?";

static PREFIXED_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b(?:date|collected\s*on|reported\s*on)\s*:?\s*({})\b",
        NUMERIC_DATE
    ))
    .expect("valid regex")
});

static BARE_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b({})\b", NUMERIC_DATE)).expect("valid regex")
});

static DAY_MONTH_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b(\d{{1,2}})(?:st|nd|rd|th)?\s*{}\s*,?\s*(\d{{4}})\b",
        MONTH
    ))
    .expect("valid regex")
});

static MONTH_DAY_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b{}\s*(\d{{1,2}})(?:st|nd|rd|th)?\s*,?\s*(\d{{4}})\b",
        MONTH
    ))
    .expect("valid regex")
});

/// Formats for numeric dates with a four-digit year, in priority order
const FOUR_DIGIT_YEAR_FORMATS: &[&str] = &[
    "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%m/%d/%Y", "%m-%d-%Y", "%Y-%m-%d", "%Y/%m/%d",
];

/// Formats for numeric dates with a two-digit year
const TWO_DIGIT_YEAR_FORMATS: &[&str] = &["%d/%m/%y", "%d-%m-%y", "%d.%m.%y", "%m/%d/%y", "%m-%d-%y"];

fn whole_words(words: &[&str]) -> Regex {
    let alternatives = words
        .iter()
        .map(|w| phrase_pattern(w))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b(?:{})\b", alternatives)).expect("valid regex")
}

/// Identify the kind of test a report describes
///
/// Keywords are checked first, in group order. Without a keyword, the
/// extracted biomarkers imply a type; failing both, `default` is returned.
pub fn extract_test_type(
    text: &str,
    biomarkers: &BTreeMap<String, BiomarkerReading>,
    default: &str,
) -> String {
    if let Some((name, _)) = TEST_TYPE_RES.iter().find(|(_, re)| re.is_match(text)) {
        return name.to_string();
    }

    for name in INFERENCE_ORDER {
        let implied = TEST_TYPES
            .iter()
            .find(|t| t.name == name)
            .is_some_and(|t| t.implied_by.iter().any(|b| biomarkers.contains_key(*b)));
        if implied {
            debug!(test_type = name, "Test type inferred from biomarkers");
            return name.to_string();
        }
    }

    default.to_string()
}

/// Find the issuing facility among normalized lines
///
/// Explicit `report from` / `issued by` lines are preferred over lines that
/// merely contain an institution word. Candidates whose length falls outside
/// `min_len..=max_len` characters are passed over.
pub fn extract_facility(lines: &[String], min_len: usize, max_len: usize, default: &str) -> String {
    let plausible = |candidate: &str| {
        let len = candidate.chars().count();
        (min_len..=max_len).contains(&len)
    };

    let prefixed = lines.iter().filter_map(|line| {
        FACILITY_PREFIX_RE
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| trim_candidate(m.as_str()))
    });
    let keyworded = lines
        .iter()
        .filter(|line| FACILITY_KEYWORD_RE.is_match(line))
        .map(|line| trim_candidate(line));

    for candidate in prefixed.chain(keyworded) {
        if plausible(candidate) {
            return candidate.to_string();
        }
        debug!(candidate, "Facility candidate rejected by length");
    }

    default.to_string()
}

fn trim_candidate(candidate: &str) -> &str {
    candidate.trim_matches(|c: char| c.is_whitespace() || matches!(c, ':' | '-' | ','))
}

/// Find the test date, defaulting to the date of `now`
///
/// Prefixed numeric dates win over bare ones, which win over dates written
/// with a month name. Years outside `1900..=now.year + 1` are ignored.
pub fn extract_date(text: &str, now: DateTime<Utc>) -> NaiveDate {
    let max_year = now.year() + 1;

    let numeric = [&*PREFIXED_DATE_RE, &*BARE_DATE_RE]
        .into_iter()
        .flat_map(|re| re.captures_iter(text))
        .filter_map(|caps| caps.get(1).and_then(|m| parse_numeric_date(m.as_str())));

    let day_month_year = DAY_MONTH_YEAR_RE.captures_iter(text).filter_map(|caps| {
        let day = caps.get(1)?.as_str().parse().ok()?;
        let year = caps.get(3)?.as_str().parse().ok()?;
        NaiveDate::from_ymd_opt(year, month_number(caps.get(2)?.as_str())?, day)
    });

    let month_day_year = MONTH_DAY_YEAR_RE.captures_iter(text).filter_map(|caps| {
        let day = caps.get(2)?.as_str().parse().ok()?;
        let year = caps.get(3)?.as_str().parse().ok()?;
        NaiveDate::from_ymd_opt(year, month_number(caps.get(1)?.as_str())?, day)
    });

    numeric
        .chain(day_month_year)
        .chain(month_day_year)
        .find(|date| {
            let plausible = (1900..=max_year).contains(&date.year());
            if !plausible {
                debug!(%date, "Implausible date skipped");
            }
            plausible
        })
        .unwrap_or_else(|| now.date_naive())
}

/// Parse a numeric date against the format list matching its year width
fn parse_numeric_date(candidate: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = candidate.split(['-', '/', '.']).collect();
    let formats = if parts.iter().any(|p| p.len() == 4) {
        FOUR_DIGIT_YEAR_FORMATS
    } else if parts.last().is_some_and(|p| p.len() == 2) {
        TWO_DIGIT_YEAR_FORMATS
    } else {
        return None;
    };

    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(candidate, fmt).ok())
}

fn month_number(name: &str) -> Option<u32> {
    let month = match name.get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use labscan_domain::BiomarkerStatus;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn readings(names: &[&str]) -> BTreeMap<String, BiomarkerReading> {
        names
            .iter()
            .map(|n| {
                (
                    n.to_string(),
                    BiomarkerReading::single(*n, 1.0, "u", "0-1", BiomarkerStatus::Normal),
                )
            })
            .collect()
    }

    fn lines(text: &[&str]) -> Vec<String> {
        text.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_test_type_keywords() {
        let none = BTreeMap::new();
        assert_eq!(extract_test_type("complete blood count report", &none, "Medical Test"), "Complete Blood Count");
        assert_eq!(extract_test_type("lipid  profile", &none, "Medical Test"), "Lipid Panel");
        assert_eq!(extract_test_type("lft results", &none, "Medical Test"), "Liver Function Test");
        assert_eq!(extract_test_type("renal function", &none, "Medical Test"), "Kidney Function Test");
        assert_eq!(extract_test_type("free t4 1.2", &none, "Medical Test"), "Thyroid Function Test");
    }

    #[test]
    fn test_test_type_keywords_are_whole_words() {
        let none = BTreeMap::new();
        // "cbc" inside another word is not a keyword
        assert_eq!(extract_test_type("abcbcd", &none, "Medical Test"), "Medical Test");
    }

    #[test]
    fn test_test_type_keyword_group_order() {
        let none = BTreeMap::new();
        assert_eq!(extract_test_type("lipid profile and cbc", &none, "Medical Test"), "Complete Blood Count");
    }

    #[test]
    fn test_test_type_inferred_from_biomarkers() {
        assert_eq!(
            extract_test_type("report", &readings(&["hemoglobin", "cholesterol"]), "Medical Test"),
            "Lipid Panel"
        );
        assert_eq!(extract_test_type("report", &readings(&["tsh"]), "Medical Test"), "Thyroid Function Test");
        assert_eq!(extract_test_type("report", &readings(&["hba1c"]), "Medical Test"), "Diabetes Test");
        assert_eq!(extract_test_type("report", &readings(&["creatinine"]), "Medical Test"), "Kidney Function Test");
    }

    #[test]
    fn test_test_type_default() {
        assert_eq!(extract_test_type("", &BTreeMap::new(), "Medical Test"), "Medical Test");
        assert_eq!(extract_test_type("", &readings(&["unknown"]), "Other"), "Other");
    }

    #[test]
    fn test_facility_prefix_wins() {
        let text = lines(&["city hospital", "report from: apollo diagnostics, chennai"]);
        assert_eq!(extract_facility(&text, 5, 100, "Medical Facility"), "apollo diagnostics, chennai");
    }

    #[test]
    fn test_facility_keyword_line() {
        let text = lines(&["patient: john", "st. mary's hospital -", "hb: 13.5 g/dl"]);
        assert_eq!(extract_facility(&text, 5, 100, "Medical Facility"), "st. mary's hospital");
    }

    #[test]
    fn test_facility_length_bounds() {
        let short = lines(&["lab"]);
        assert_eq!(extract_facility(&short, 5, 100, "Medical Facility"), "Medical Facility");

        let long_line = format!("{} hospital", "x".repeat(120));
        let long = vec![long_line];
        assert_eq!(extract_facility(&long, 5, 100, "Medical Facility"), "Medical Facility");

        let boundary = lines(&["a lab"]);
        assert_eq!(extract_facility(&boundary, 5, 100, "Medical Facility"), "a lab");
    }

    #[test]
    fn test_facility_rejected_candidate_falls_through() {
        let text = lines(&["issued by: dr", "green valley clinic"]);
        assert_eq!(extract_facility(&text, 5, 100, "Medical Facility"), "green valley clinic");
    }

    #[test]
    fn test_facility_keywords_whole_word() {
        let text = lines(&["label printed here"]);
        assert_eq!(extract_facility(&text, 5, 100, "Medical Facility"), "Medical Facility");
    }

    #[test]
    fn test_prefixed_date() {
        assert_eq!(extract_date("date: 15/03/2024", now()), ymd(2024, 3, 15));
        assert_eq!(extract_date("collected on 2024-02-29", now()), ymd(2024, 2, 29));
    }

    #[test]
    fn test_prefixed_date_beats_earlier_bare_date() {
        let text = "dob 01/01/1980 reported on: 05.04.2024";
        assert_eq!(extract_date(text, now()), ymd(2024, 4, 5));
    }

    #[test]
    fn test_month_first_when_day_first_invalid() {
        assert_eq!(extract_date("date: 03/25/2024", now()), ymd(2024, 3, 25));
    }

    #[test]
    fn test_two_digit_year() {
        assert_eq!(extract_date("date: 15/03/24", now()), ymd(2024, 3, 15));
    }

    #[test]
    fn test_month_name_dates() {
        assert_eq!(extract_date("sample drawn 15 mar 2024", now()), ymd(2024, 3, 15));
        assert_eq!(extract_date("march 15, 2024", now()), ymd(2024, 3, 15));
        assert_eq!(extract_date("1st january 2023", now()), ymd(2023, 1, 1));
    }

    #[test]
    fn test_implausible_dates_skipped() {
        assert_eq!(extract_date("date: 01/01/1850 then 02/02/2024", now()), ymd(2024, 2, 2));
        assert_eq!(extract_date("date: 01/01/2030", now()), now().date_naive());
    }

    #[test]
    fn test_invalid_dates_skipped() {
        assert_eq!(extract_date("date: 45/45/2024", now()), now().date_naive());
    }

    #[test]
    fn test_no_date_defaults_to_reference() {
        assert_eq!(extract_date("hb: 13.5 g/dl", now()), ymd(2024, 6, 1));
    }
}
