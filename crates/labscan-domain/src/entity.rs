//! Entity module - auxiliary named-entity annotations

use serde::Serialize;

/// Category of a recognized entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityLabel {
    /// Organisation (hospital, laboratory)
    Org,
    /// Person (doctor, patient)
    Person,
    /// Calendar date
    Date,
    /// Bare number
    Cardinal,
    /// Number with a unit
    Quantity,
}

impl EntityLabel {
    /// Get the label as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityLabel::Org => "ORG",
            EntityLabel::Person => "PERSON",
            EntityLabel::Date => "DATE",
            EntityLabel::Cardinal => "CARDINAL",
            EntityLabel::Quantity => "QUANTITY",
        }
    }
}

/// A span of the normalized text tagged with a label
///
/// Entities are a best-effort signal; no other field of an extraction
/// depends on them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    /// Matched text
    pub text: String,

    /// Entity category
    pub label: EntityLabel,

    /// Byte offset of the first character in the normalized text
    pub start: usize,

    /// Byte offset one past the last character
    pub end: usize,

    /// Recognizer confidence [0.0, 1.0]
    pub confidence: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_serialization() {
        let entity = Entity {
            text: "city hospital".to_string(),
            label: EntityLabel::Org,
            start: 0,
            end: 13,
            confidence: 0.8,
        };
        let json = serde_json::to_value(&entity).unwrap();
        assert_eq!(json["label"], "ORG");
        assert_eq!(json["end"], 13);
    }
}
