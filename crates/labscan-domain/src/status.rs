//! Status module - classification of a measurement against its normal range

use serde::Serialize;

/// Fraction a value may fall outside a normal bound and still be borderline
pub const BORDERLINE_MARGIN: f64 = 0.1;

/// Clinical status of a reading relative to its reference range
///
/// Statuses are ordered by severity, so the worse of two statuses is their `max`:
/// - Normal: inside the reference range
/// - Borderline: outside the range, but within 10% of the violated bound
/// - Abnormal: further out than that
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BiomarkerStatus {
    /// Inside the reference range
    Normal,

    /// Just outside the reference range
    Borderline,

    /// Clearly outside the reference range
    Abnormal,
}

impl BiomarkerStatus {
    /// Get the status name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            BiomarkerStatus::Normal => "normal",
            BiomarkerStatus::Borderline => "borderline",
            BiomarkerStatus::Abnormal => "abnormal",
        }
    }

    /// Parse a status from a string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "normal" => Some(BiomarkerStatus::Normal),
            "borderline" => Some(BiomarkerStatus::Borderline),
            "abnormal" => Some(BiomarkerStatus::Abnormal),
            _ => None,
        }
    }
}

impl std::fmt::Display for BiomarkerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BiomarkerStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid status: {}", s))
    }
}

/// Classify a value against its normal bounds
///
/// Bounds are inclusive. The borderline band scales the bounds, never the
/// value, so `min_normal = 0` with `value = 0` is simply normal.
///
/// # Examples
///
/// ```
/// use labscan_domain::{classify, BiomarkerStatus};
///
/// assert_eq!(classify(13.5, 12.0, 16.0), BiomarkerStatus::Normal);
/// assert_eq!(classify(17.0, 12.0, 16.0), BiomarkerStatus::Borderline);
/// assert_eq!(classify(20.0, 12.0, 16.0), BiomarkerStatus::Abnormal);
/// ```
pub fn classify(value: f64, min_normal: f64, max_normal: f64) -> BiomarkerStatus {
    if min_normal <= value && value <= max_normal {
        BiomarkerStatus::Normal
    } else if min_normal * (1.0 - BORDERLINE_MARGIN) <= value
        && value <= max_normal * (1.0 + BORDERLINE_MARGIN)
    {
        BiomarkerStatus::Borderline
    } else {
        BiomarkerStatus::Abnormal
    }
}

/// Classify a two-component reading such as blood pressure
///
/// Each component is classified against `[0, max]`; the reading takes the
/// worse of the two statuses.
pub fn classify_composite(
    systolic: f64,
    diastolic: f64,
    systolic_max: f64,
    diastolic_max: f64,
) -> BiomarkerStatus {
    classify(systolic, 0.0, systolic_max).max(classify(diastolic, 0.0, diastolic_max))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_bands() {
        assert_eq!(classify(13.5, 12.0, 16.0), BiomarkerStatus::Normal);
        assert_eq!(classify(17.0, 12.0, 16.0), BiomarkerStatus::Borderline);
        assert_eq!(classify(11.0, 12.0, 16.0), BiomarkerStatus::Borderline);
        assert_eq!(classify(20.0, 12.0, 16.0), BiomarkerStatus::Abnormal);
        assert_eq!(classify(10.0, 12.0, 16.0), BiomarkerStatus::Abnormal);
    }

    #[test]
    fn test_classify_inclusive_bounds() {
        assert_eq!(classify(12.0, 12.0, 16.0), BiomarkerStatus::Normal);
        assert_eq!(classify(16.0, 12.0, 16.0), BiomarkerStatus::Normal);
    }

    #[test]
    fn test_classify_zero_lower_bound() {
        assert_eq!(classify(0.0, 0.0, 200.0), BiomarkerStatus::Normal);
        assert_eq!(classify(215.0, 0.0, 200.0), BiomarkerStatus::Borderline);
        assert_eq!(classify(221.0, 0.0, 200.0), BiomarkerStatus::Abnormal);
    }

    #[test]
    fn test_classify_composite() {
        assert_eq!(classify_composite(118.0, 78.0, 120.0, 80.0), BiomarkerStatus::Normal);
        assert_eq!(classify_composite(125.0, 78.0, 120.0, 80.0), BiomarkerStatus::Borderline);
        assert_eq!(classify_composite(118.0, 85.0, 120.0, 80.0), BiomarkerStatus::Borderline);
        assert_eq!(classify_composite(150.0, 95.0, 120.0, 80.0), BiomarkerStatus::Abnormal);
        // One component abnormal is enough
        assert_eq!(classify_composite(110.0, 95.0, 120.0, 80.0), BiomarkerStatus::Abnormal);
    }

    #[test]
    fn test_status_ordering() {
        assert!(BiomarkerStatus::Normal < BiomarkerStatus::Borderline);
        assert!(BiomarkerStatus::Borderline < BiomarkerStatus::Abnormal);
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("Normal".parse::<BiomarkerStatus>(), Ok(BiomarkerStatus::Normal));
        assert_eq!(BiomarkerStatus::parse("ABNORMAL"), Some(BiomarkerStatus::Abnormal));
        assert!("high".parse::<BiomarkerStatus>().is_err());
    }
}
