//! Loading rule sets from JSON documents.
//!
//! A rule document looks like:
//!
//! ```json
//! {
//!   "rules": [
//!     {
//!       "id": "DQ-01",
//!       "title": "Missing values",
//!       "columns": ["*"],
//!       "severity": "medium",
//!       "check": {
//!         "kind": "missing_values",
//!         "medium_threshold": 0.2,
//!         "high_threshold": 0.4,
//!         "sensitive_columns": ["age", "income_level"]
//!       }
//!     }
//!   ]
//! }
//! ```
//!
//! Unknown fields are rejected at every level, so a misspelled threshold
//! fails to parse instead of falling back to its default.

use super::{RuleDefinition, RuleSet};
use crate::error::RuleDefinitionError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleDocument {
    rules: Vec<RuleDefinition>,
}

impl RuleSet {
    /// Parse and validate a rule document.
    pub fn from_json_str(json: &str) -> Result<Self, RuleDefinitionError> {
        let document: RuleDocument = serde_json::from_str(json)?;
        debug!("Parsed rule document with {} rules", document.rules.len());
        Self::new(document.rules)
    }

    /// Read, parse and validate a rule document from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RuleDefinitionError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let rule_set = Self::from_json_str(&content)?;
        info!("Loaded {} rules from {}", rule_set.len(), path.display());
        Ok(rule_set)
    }

    /// Render the rule set as a pretty-printed rule document.
    pub fn to_json_string(&self) -> Result<String, RuleDefinitionError> {
        let document = RuleDocument {
            rules: self.rules.clone(),
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleCheck;
    use crate::types::Severity;
    use std::io::Write;

    const MINIMAL: &str = r#"{
        "rules": [
            {
                "id": "DQ-04",
                "title": "Negative values",
                "columns": ["weekly_purchases"],
                "severity": "medium",
                "check": { "kind": "impossible_negative" }
            },
            {
                "id": "DQ-02",
                "title": "Empty dataset",
                "severity": "high",
                "check": { "kind": "empty_dataset" }
            }
        ]
    }"#;

    #[test]
    fn test_from_json_str() {
        let set = RuleSet::from_json_str(MINIMAL).unwrap();
        assert_eq!(set.len(), 2);

        let first = &set.rules()[0];
        assert_eq!(first.id.as_str(), "DQ-02");
        assert_eq!(first.severity, Severity::High);
        assert_eq!(first.check, RuleCheck::EmptyDataset);

        let negative = set.get("DQ-04").unwrap();
        assert!(negative.columns.matches("weekly_purchases"));
        assert!(negative.explanation_template().contains("negative values"));
    }

    #[test]
    fn test_defaults_for_optional_fields() {
        let json = r#"{"rules": [{
            "id": "DQ-09",
            "title": "Ratio out of bounds",
            "columns": ["*_rate"],
            "severity": "medium",
            "check": { "kind": "ratio_out_of_bounds" }
        }]}"#;
        let set = RuleSet::from_json_str(json).unwrap();
        assert_eq!(
            set.rules()[0].check,
            RuleCheck::RatioOutOfBounds {
                lower: 0.0,
                upper: 1.0
            }
        );
    }

    #[test]
    fn test_unknown_severity_is_a_parse_error() {
        let json = r#"{"rules": [{
            "id": "DQ-02",
            "title": "Empty dataset",
            "severity": "critical",
            "check": { "kind": "empty_dataset" }
        }]}"#;
        assert!(matches!(
            RuleSet::from_json_str(json),
            Err(RuleDefinitionError::Parse(_))
        ));
    }

    #[test]
    fn test_unknown_check_kind_is_a_parse_error() {
        let json = r#"{"rules": [{
            "id": "DQ-99",
            "title": "Mystery",
            "columns": ["*"],
            "severity": "low",
            "check": { "kind": "vibes" }
        }]}"#;
        assert!(matches!(
            RuleSet::from_json_str(json),
            Err(RuleDefinitionError::Parse(_))
        ));
    }

    #[test]
    fn test_misspelled_check_field_is_a_parse_error() {
        let json = r#"{"rules": [{
            "id": "DQ-08",
            "title": "Duplicate identifiers",
            "columns": ["*"],
            "severity": "medium",
            "check": { "kind": "duplicate_identifiers", "max_duplicate_ration": 0.5 }
        }]}"#;
        assert!(matches!(
            RuleSet::from_json_str(json),
            Err(RuleDefinitionError::Parse(_))
        ));
    }

    #[test]
    fn test_misspelled_definition_field_is_a_parse_error() {
        let json = r#"{"rules": [{
            "id": "DQ-02",
            "title": "Empty dataset",
            "severity": "high",
            "severty": "high",
            "check": { "kind": "empty_dataset" }
        }]}"#;
        assert!(matches!(
            RuleSet::from_json_str(json),
            Err(RuleDefinitionError::Parse(_))
        ));
    }

    #[test]
    fn test_misspelled_relation_field_is_a_parse_error() {
        let json = r#"{"rules": [{
            "id": "DQ-10",
            "title": "Behavioral inconsistency",
            "severity": "medium",
            "check": {
                "kind": "cross_column",
                "relation": {
                    "left": ["monthly_spend"],
                    "comparison": "le",
                    "right": ["weekly_purchases"],
                    "scal": 5.0
                }
            }
        }]}"#;
        assert!(matches!(
            RuleSet::from_json_str(json),
            Err(RuleDefinitionError::Parse(_))
        ));
    }

    #[test]
    fn test_sensitive_columns_are_optional() {
        let json = r#"{"rules": [{
            "id": "DQ-01",
            "title": "Missing values",
            "columns": ["*"],
            "severity": "medium",
            "check": {
                "kind": "missing_values",
                "medium_threshold": 0.2,
                "high_threshold": 0.4,
                "sensitive_columns": ["age"]
            }
        }]}"#;
        let set = RuleSet::from_json_str(json).unwrap();
        assert_eq!(
            set.rules()[0].check,
            RuleCheck::MissingValues {
                medium_threshold: 0.2,
                high_threshold: 0.4,
                sensitive_columns: Some(["age".to_string()].into()),
            }
        );
    }

    #[test]
    fn test_missing_scope_is_malformed() {
        let json = r#"{"rules": [{
            "id": "DQ-04",
            "title": "Negative values",
            "severity": "medium",
            "check": { "kind": "impossible_negative" }
        }]}"#;
        assert!(matches!(
            RuleSet::from_json_str(json),
            Err(RuleDefinitionError::MalformedRule { .. })
        ));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();

        let set = RuleSet::from_path(file.path()).unwrap();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_from_missing_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = RuleSet::from_path(dir.path().join("nope.json"));
        assert!(matches!(result, Err(RuleDefinitionError::Io(_))));
    }

    #[test]
    fn test_standard_rules_survive_a_document_round_trip() {
        let standard = RuleSet::standard();
        let json = standard.to_json_string().unwrap();
        assert_eq!(RuleSet::from_json_str(&json).unwrap(), standard);
    }
}
