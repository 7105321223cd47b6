//! Core Extractor implementation

use crate::biomarkers::extract_biomarkers;
use crate::catalog::Catalog;
use crate::config::ExtractorConfig;
use crate::confidence::score_confidence;
use crate::entities::{NoopRecognizer, PatternRecognizer};
use crate::error::ExtractorError;
use crate::metadata::{extract_date, extract_facility, extract_test_type};
use crate::normalize::{normalize, normalize_lines};
use crate::validation::{validate_biomarkers, ValidationReport};
use chrono::{DateTime, Utc};
use labscan_domain::{BiomarkerReading, EntityRecognizer, ExtractionResult};
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// The Extractor turns OCR text into an [`ExtractionResult`]
///
/// Extraction is synchronous, deterministic for a given reference time, and
/// never fails: a sub-extractor that breaks is replaced by its default, and a
/// broken run as a whole yields the empty result. The extractor is
/// `Send + Sync` and is meant to be shared behind an `Arc`.
///
/// # Examples
///
/// ```
/// use labscan_extractor::{Extractor, ExtractorConfig};
///
/// let extractor = Extractor::new(ExtractorConfig::default()).unwrap();
/// let result = extractor.extract("Hb: 13.5 g/dl, Glucose: 95 mg/dl");
///
/// assert_eq!(result.biomarker_count(), 2);
/// assert!(result.confidence_score > 0.0);
/// ```
pub struct Extractor {
    catalog: Arc<Catalog>,
    config: ExtractorConfig,
    recognizer: Box<dyn EntityRecognizer + Send + Sync>,
}

impl Extractor {
    /// Create an extractor over the built-in catalog
    pub fn new(config: ExtractorConfig) -> Result<Self, ExtractorError> {
        Self::with_catalog(Arc::new(Catalog::builtin()?), config)
    }

    /// Create an extractor over a shared catalog
    pub fn with_catalog(
        catalog: Arc<Catalog>,
        config: ExtractorConfig,
    ) -> Result<Self, ExtractorError> {
        config.validate()?;

        let recognizer: Box<dyn EntityRecognizer + Send + Sync> = if config.entity_recognition {
            Box::new(PatternRecognizer)
        } else {
            Box::new(NoopRecognizer)
        };

        Ok(Self {
            catalog,
            config,
            recognizer,
        })
    }

    /// Replace the entity recognizer
    pub fn with_recognizer(mut self, recognizer: impl EntityRecognizer + Send + Sync + 'static) -> Self {
        self.recognizer = Box::new(recognizer);
        self
    }

    /// The catalog readings are matched against
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract from text, using the current time as the reference clock
    pub fn extract(&self, text: &str) -> ExtractionResult {
        self.extract_at(text, Utc::now())
    }

    /// Extract from text against an explicit reference clock
    ///
    /// `now` supplies the default date and `processed_at`, so two calls with
    /// the same text and time produce equal results.
    pub fn extract_at(&self, text: &str, now: DateTime<Utc>) -> ExtractionResult {
        let text_length = text.chars().count();

        if text.trim().is_empty() {
            debug!("Empty input, returning empty result");
            return self.empty_result(text_length, now);
        }

        match panic::catch_unwind(AssertUnwindSafe(|| self.run(text, text_length, now))) {
            Ok(result) => result,
            Err(_) => {
                error!(text_length, "Extraction failed, returning empty result");
                self.empty_result(text_length, now)
            }
        }
    }

    /// Check readings against this extractor's catalog
    pub fn validate(&self, readings: &BTreeMap<String, BiomarkerReading>) -> ValidationReport {
        validate_biomarkers(readings, &self.catalog)
    }

    fn run(&self, text: &str, text_length: usize, now: DateTime<Utc>) -> ExtractionResult {
        let config = &self.config;
        let normalized = normalize(text, config.ocr_correction);

        let biomarkers = guarded("biomarkers", BTreeMap::new, || {
            extract_biomarkers(&normalized, &self.catalog)
        });

        let test_type = guarded(
            "test_type",
            || config.default_test_type.clone(),
            || extract_test_type(&normalized, &biomarkers, &config.default_test_type),
        );

        let facility = guarded(
            "facility",
            || config.default_facility.clone(),
            || {
                let lines = normalize_lines(text, config.ocr_correction);
                extract_facility(
                    &lines,
                    config.facility_min_len,
                    config.facility_max_len,
                    &config.default_facility,
                )
            },
        );

        let date = guarded("date", || now.date_naive(), || extract_date(&normalized, now));

        let entities = guarded("entities", Vec::new, || self.recognizer.recognize(&normalized));

        let confidence_score = score_confidence(biomarkers.len(), text_length, &normalized);

        info!(
            biomarkers = biomarkers.len(),
            confidence = confidence_score,
            test_type = %test_type,
            "Extraction complete"
        );

        ExtractionResult {
            biomarkers,
            test_type,
            facility,
            date,
            entities,
            confidence_score,
            text_length,
            processed_at: now,
        }
    }

    fn empty_result(&self, text_length: usize, now: DateTime<Utc>) -> ExtractionResult {
        ExtractionResult::empty(
            self.config.default_test_type.clone(),
            self.config.unknown_facility.clone(),
            text_length,
            now,
        )
    }
}

/// Run one sub-extractor, substituting its default if it panics
fn guarded<T>(stage: &'static str, default: impl FnOnce() -> T, f: impl FnOnce() -> T) -> T {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(_) => {
            warn!(stage, "Sub-extractor failed, using default");
            default()
        }
    }
}
