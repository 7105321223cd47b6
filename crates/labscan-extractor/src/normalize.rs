//! Text normalization
//!
//! Turns noisy OCR output into the canonical form every pattern in the crate
//! is written against: lowercase, single-spaced, one spelling per unit, and
//! (optionally) digits restored where OCR read them as letters.

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Unit spellings folded before matching, applied in order
const UNIT_REWRITES: [(&str, &str); 3] = [("mg%", "mg/dl"), ("gm%", "g/dl"), ("gm/dl", "g/dl")];

static NUMERIC_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9a-z.]+").expect("valid regex"));

/// Normalize raw text for pattern matching
///
/// Lowercases, folds the micro sign to Greek mu, rewrites unit spellings,
/// optionally repairs numeric tokens, and collapses whitespace. The transform
/// is idempotent.
///
/// # Examples
///
/// ```
/// use labscan_extractor::normalize;
///
/// assert_eq!(normalize("  Hb :  l3.5\tGM/DL ", true), "hb : 13.5 g/dl");
/// assert_eq!(normalize("Cholesterol", true), "cholesterol");
/// ```
pub fn normalize(text: &str, ocr_correction: bool) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    normalize_words(&collapsed, ocr_correction)
}

/// Normalize text line by line, dropping lines that end up empty
///
/// Joining the result with single spaces gives the same string as
/// [`normalize`] on the whole text.
pub fn normalize_lines(text: &str, ocr_correction: bool) -> Vec<String> {
    text.lines()
        .map(|line| normalize(line, ocr_correction))
        .filter(|line| !line.is_empty())
        .collect()
}

fn normalize_words(text: &str, ocr_correction: bool) -> String {
    let mut out = text.to_lowercase().replace('\u{00B5}', "\u{03BC}");

    for (from, to) in UNIT_REWRITES {
        if out.contains(from) {
            out = out.replace(from, to);
        }
    }

    if ocr_correction {
        out = NUMERIC_TOKEN_RE
            .replace_all(&out, |caps: &Captures| repair_numeric_token(&caps[0]))
            .into_owned();
    }

    out
}

/// Restore digits in a token OCR produced from a number
///
/// Only tokens that already contain a digit and whose letters are all
/// `o`, `i` or `l` are touched.
fn repair_numeric_token(token: &str) -> String {
    let has_digit = token.bytes().any(|b| b.is_ascii_digit());
    let only_confusable = token
        .bytes()
        .filter(u8::is_ascii_alphabetic)
        .all(|b| matches!(b, b'o' | b'i' | b'l'));

    if !has_digit || !only_confusable {
        return token.to_string();
    }

    token
        .chars()
        .map(|c| match c {
            'o' => '0',
            'i' | 'l' => '1',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_lowercase_and_whitespace() {
        assert_eq!(normalize("HEMOGLOBIN\n\n  13.5\t g/dL", true), "hemoglobin 13.5 g/dl");
        assert_eq!(normalize("   ", true), "");
    }

    #[test]
    fn test_unit_rewrites() {
        assert_eq!(normalize("Glucose 95 mg%", false), "glucose 95 mg/dl");
        assert_eq!(normalize("Hb 13 gm%", false), "hb 13 g/dl");
        assert_eq!(normalize("Hb 13 GM/DL", false), "hb 13 g/dl");
    }

    #[test]
    fn test_micro_sign_folded() {
        assert_eq!(normalize("WBC 7500 /\u{00B5}L", false), "wbc 7500 /\u{03BC}l");
    }

    #[test]
    fn test_ocr_correction_numeric_tokens() {
        assert_eq!(normalize("Hb: 1o.5", true), "hb: 10.5");
        assert_eq!(normalize("Hb: l3.5", true), "hb: 13.5");
        assert_eq!(normalize("Plt: 2oo000", true), "plt: 200000");
    }

    #[test]
    fn test_ocr_correction_leaves_words_alone() {
        assert_eq!(normalize("Cholesterol Total", true), "cholesterol total");
        assert_eq!(normalize("Clinical Lab", true), "clinical lab");
        assert_eq!(normalize("HbA1c", true), "hba1c");
        assert_eq!(normalize("T3 T4", true), "t3 t4");
    }

    #[test]
    fn test_ocr_correction_disabled() {
        assert_eq!(normalize("Hb: l3.5", false), "hb: l3.5");
    }

    #[test]
    fn test_normalize_lines() {
        let lines = normalize_lines("City Hospital\n\n  Report  \nHb: 13.5 g/dl", true);
        assert_eq!(lines, vec!["city hospital", "report", "hb: 13.5 g/dl"]);
    }

    proptest! {
        /// Property: normalization is idempotent
        #[test]
        fn test_normalize_idempotent(text in "[ -~\n\t\u{00B5}]{0,80}", correct in any::<bool>()) {
            let once = normalize(&text, correct);
            prop_assert_eq!(normalize(&once, correct), once);
        }

        /// Property: joined lines equal the whole-text normalization
        #[test]
        fn test_lines_join_to_normalize(text in "[ -~\n]{0,80}") {
            prop_assert_eq!(normalize_lines(&text, true).join(" "), normalize(&text, true));
        }

        /// Property: letter-only words are never rewritten
        #[test]
        fn test_words_untouched(word in "[a-z]{1,12}") {
            prop_assert_eq!(normalize(&word, true), word);
        }
    }
}
