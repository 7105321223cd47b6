//! Auxiliary named-entity recognition
//!
//! Entities are a side signal: nothing else in an extraction depends on them,
//! and a recognizer that finds nothing is always acceptable.

use labscan_domain::{Entity, EntityLabel, EntityRecognizer};
use regex::Regex;
use std::sync::LazyLock;

/// Confidence attached to every pattern-recognized entity
pub const PATTERN_CONFIDENCE: f64 = 0.8;

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:\d{4}[-/.]\d{1,2}[-/.]\d{1,2}|\d{1,2}[-/.]\d{1,2}[-/.]\d{2,4}|\d{1,2}\s*(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s*,?\s*\d{4})\b",
    )
    .expect("valid regex")
});

static QUANTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b\d+(?:\.\d+)?\s*(?:mg/dl|g/dl|mmol/l|iu/l|u/l|miu/l|μiu/ml|ng/ml|mmhg|cells/μl|/μl|/ul|/cumm|/mm3|%)",
    )
    .expect("valid regex")
});

static ORG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:[a-z][a-z.'&]*\s+){0,4}(?:hospital|clinic|medical\s+center|diagnostics|laboratory|lab|healthcare|pathology)\b",
    )
    .expect("valid regex")
});

/// Recognizer that never finds anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRecognizer;

impl EntityRecognizer for NoopRecognizer {
    fn recognize(&self, _text: &str) -> Vec<Entity> {
        Vec::new()
    }
}

/// Regex-based recognizer for dates, quantities and organisations
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternRecognizer;

impl EntityRecognizer for PatternRecognizer {
    fn recognize(&self, text: &str) -> Vec<Entity> {
        let mut entities: Vec<Entity> = [
            (&*DATE_RE, EntityLabel::Date),
            (&*QUANTITY_RE, EntityLabel::Quantity),
            (&*ORG_RE, EntityLabel::Org),
        ]
        .into_iter()
        .flat_map(|(re, label)| {
            re.find_iter(text).map(move |m| Entity {
                text: m.as_str().to_string(),
                label,
                start: m.start(),
                end: m.end(),
                confidence: PATTERN_CONFIDENCE,
            })
        })
        .collect();

        entities.sort_by_key(|e| (e.start, e.end));
        entities
    }
}
