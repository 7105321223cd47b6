//! Extraction confidence scoring

/// Words whose presence suggests the text really is a lab report
const REPORT_KEYWORDS: [&str; 10] = [
    "test",
    "result",
    "normal",
    "abnormal",
    "range",
    "laboratory",
    "clinic",
    "hospital",
    "doctor",
    "patient",
];

const BIOMARKER_WEIGHT: f64 = 0.5;
const LENGTH_WEIGHT: f64 = 0.2;
const KEYWORD_WEIGHT: f64 = 0.3;

/// Score how much an extraction can be trusted, in `[0.0, 1.0]`
///
/// Combines the number of readings found, the length of the raw text in
/// characters, and the share of report keywords present in the normalized
/// text. The score is exactly 0.0 when nothing was extracted, and is rounded
/// to two decimals.
///
/// # Examples
///
/// ```
/// use labscan_extractor::score_confidence;
///
/// assert_eq!(score_confidence(0, 5000, "test result normal"), 0.0);
/// assert_eq!(score_confidence(5, 1000, ""), 0.7);
/// ```
pub fn score_confidence(biomarker_count: usize, text_chars: usize, normalized: &str) -> f64 {
    if biomarker_count == 0 {
        return 0.0;
    }

    let biomarker_score = (biomarker_count as f64 * 0.2).min(1.0);
    let length_score = (text_chars as f64 / 1000.0).min(1.0);
    let present = REPORT_KEYWORDS
        .iter()
        .filter(|k| normalized.contains(*k))
        .count();
    let keyword_score = present as f64 / REPORT_KEYWORDS.len() as f64;

    let confidence = BIOMARKER_WEIGHT * biomarker_score
        + LENGTH_WEIGHT * length_score
        + KEYWORD_WEIGHT * keyword_score;

    (confidence.clamp(0.0, 1.0) * 100.0).round() / 100.0
}
