//! Structured, validated quality rules.
//!
//! A [`RuleSet`] is the only input the rule engine needs besides the
//! profile. Rules are validated when the set is built, so the engine never
//! sees a structurally invalid definition.

mod loader;
mod scope;
mod standard;
mod template;

pub use scope::{ColumnPattern, ColumnScope};

pub(crate) use template::{format_percent, render_explanation};

use crate::error::RuleDefinitionError;
use crate::types::{ColumnType, ColumnTypeHints, Severity};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use tracing::debug;

// ============================================================================
// Rule identifiers
// ============================================================================

/// Rule identifier such as `DQ-01`.
///
/// Ordered naturally, so `DQ-2` sorts before `DQ-10`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(String);

impl RuleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RuleId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl Ord for RuleId {
    fn cmp(&self, other: &Self) -> Ordering {
        natural_cmp(&self.0, &other.0).then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for RuleId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Split into maximal runs of ASCII digits and non-digits.
fn chunks(s: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut prev_digit = None;

    for (i, c) in s.char_indices() {
        let is_digit = c.is_ascii_digit();
        if prev_digit.is_some_and(|prev| prev != is_digit) {
            out.push(&s[start..i]);
            start = i;
        }
        prev_digit = Some(is_digit);
    }
    if start < s.len() {
        out.push(&s[start..]);
    }
    out
}

fn natural_cmp(a: &str, b: &str) -> Ordering {
    let a_chunks = chunks(a);
    let b_chunks = chunks(b);

    for (x, y) in a_chunks.iter().zip(&b_chunks) {
        let ord = match (x.parse::<u64>(), y.parse::<u64>()) {
            (Ok(x_num), Ok(y_num)) => x_num.cmp(&y_num),
            _ => x.cmp(y),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a_chunks.len().cmp(&b_chunks.len())
}

// ============================================================================
// Rule definitions
// ============================================================================

/// Direction of a cross-column comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparison {
    /// Left side must be at least the right side.
    Ge,
    /// Left side must be at most the right side.
    Le,
}

impl Comparison {
    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::Ge => ">=",
            Comparison::Le => "<=",
        }
    }
}

fn default_scale() -> f64 {
    1.0
}

fn default_upper() -> f64 {
    1.0
}

/// Relation between column means: `prod(mean(left)) <cmp> scale * prod(mean(right))`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AggregateRelation {
    pub left: Vec<String>,
    pub comparison: Comparison,
    pub right: Vec<String>,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

impl AggregateRelation {
    /// All columns the relation reads, left side first.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.left.iter().chain(&self.right).map(String::as_str)
    }

    /// Whether `lhs <cmp> rhs` holds within a relative tolerance of `rhs`.
    pub fn holds(&self, lhs: f64, rhs: f64, tolerance: f64) -> bool {
        let slack = tolerance * rhs.abs();
        match self.comparison {
            Comparison::Ge => lhs >= rhs - slack,
            Comparison::Le => lhs <= rhs + slack,
        }
    }
}

impl fmt::Display for AggregateRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = |cols: &[String]| {
            cols.iter()
                .map(|c| format!("mean({})", c))
                .collect::<Vec<_>>()
                .join(" * ")
        };
        write!(f, "{} {} ", side(self.left.as_slice()), self.comparison.symbol())?;
        if self.scale != 1.0 {
            write!(f, "{} * ", self.scale)?;
        }
        f.write_str(&side(self.right.as_slice()))
    }
}

/// The predicate a rule applies, with its thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum RuleCheck {
    /// `missing_ratio >= medium_threshold` raises the rule severity,
    /// `missing_ratio > high_threshold` raises `high`.
    ///
    /// With `sensitive_columns` set, columns outside it are only `low` in the
    /// medium band. Without it every column is sensitive.
    MissingValues {
        medium_threshold: f64,
        high_threshold: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sensitive_columns: Option<BTreeSet<String>>,
    },
    /// `row_count == 0`.
    EmptyDataset,
    /// Value type differs from the documented column type.
    UnexpectedType {
        expected: BTreeMap<String, ColumnType>,
    },
    /// Numeric column with a negative minimum.
    ImpossibleNegative,
    /// Numeric `outlier_ratio > max_outlier_ratio`.
    ExtremeOutliers { max_outlier_ratio: f64 },
    /// Date `invalid_date_ratio > max_invalid_ratio`.
    InvalidDates { max_invalid_ratio: f64 },
    /// Categorical values outside the documented set.
    UnexpectedCategory {
        expected: BTreeMap<String, BTreeSet<String>>,
    },
    /// Identifier column with a duplicate share above the threshold.
    DuplicateIdentifiers {
        #[serde(default)]
        max_duplicate_ratio: f64,
    },
    /// Numeric values outside `[lower, upper]`.
    RatioOutOfBounds {
        #[serde(default)]
        lower: f64,
        #[serde(default = "default_upper")]
        upper: f64,
    },
    /// Aggregate relation between columns, checked once per dataset.
    CrossColumn {
        relation: AggregateRelation,
        #[serde(default)]
        tolerance: f64,
    },
}

impl RuleCheck {
    /// Whether the check looks at the dataset as a whole rather than per column.
    pub fn is_dataset_level(&self) -> bool {
        matches!(self, RuleCheck::EmptyDataset | RuleCheck::CrossColumn { .. })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RuleCheck::MissingValues { .. } => "missing_values",
            RuleCheck::EmptyDataset => "empty_dataset",
            RuleCheck::UnexpectedType { .. } => "unexpected_type",
            RuleCheck::ImpossibleNegative => "impossible_negative",
            RuleCheck::ExtremeOutliers { .. } => "extreme_outliers",
            RuleCheck::InvalidDates { .. } => "invalid_dates",
            RuleCheck::UnexpectedCategory { .. } => "unexpected_category",
            RuleCheck::DuplicateIdentifiers { .. } => "duplicate_identifiers",
            RuleCheck::RatioOutOfBounds { .. } => "ratio_out_of_bounds",
            RuleCheck::CrossColumn { .. } => "cross_column",
        }
    }

    /// Explanation used when a rule does not provide its own.
    pub fn default_explanation(&self) -> &'static str {
        match self {
            RuleCheck::MissingValues { .. } => {
                "Column '{column}' has {percent}% missing values, exceeding the {threshold_percent}% threshold."
            }
            RuleCheck::EmptyDataset => {
                "Dataset contains 0 rows. Cannot perform quality analysis on empty data."
            }
            RuleCheck::UnexpectedType { .. } => {
                "Column '{column}' holds {value} values but is documented as {detail}."
            }
            RuleCheck::ImpossibleNegative => {
                "Column '{column}' contains {count} negative values ({percent}%, minimum {value}), which should not be possible for this field."
            }
            RuleCheck::ExtremeOutliers { .. } => {
                "Column '{column}' has {percent}% outliers (values outside [{detail}])."
            }
            RuleCheck::InvalidDates { .. } => {
                "Column '{column}' has {percent}% unparseable dates, exceeding the {threshold_percent}% threshold."
            }
            RuleCheck::UnexpectedCategory { .. } => {
                "Column '{column}' contains unexpected categories: {value}."
            }
            RuleCheck::DuplicateIdentifiers { .. } => {
                "Identifier column '{column}' has {value} duplicate values ({percent}%)."
            }
            RuleCheck::RatioOutOfBounds { .. } => {
                "Ratio column '{column}' has values outside [{detail}] (observed {value})."
            }
            RuleCheck::CrossColumn { .. } => "Behavioral inconsistency: {detail}.",
        }
    }

    fn validate(&self, rule_id: &str) -> Result<(), RuleDefinitionError> {
        let check_ratio = |field: &str, value: f64| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(RuleDefinitionError::malformed(
                    rule_id,
                    format!("{} must be between 0.0 and 1.0, got {}", field, value),
                ))
            }
        };

        match self {
            RuleCheck::MissingValues {
                medium_threshold,
                high_threshold,
                ..
            } => {
                check_ratio("medium_threshold", *medium_threshold)?;
                check_ratio("high_threshold", *high_threshold)?;
                if medium_threshold > high_threshold {
                    return Err(RuleDefinitionError::malformed(
                        rule_id,
                        format!(
                            "medium_threshold ({}) is above high_threshold ({})",
                            medium_threshold, high_threshold
                        ),
                    ));
                }
            }
            RuleCheck::UnexpectedType { expected } => {
                if expected.is_empty() {
                    return Err(RuleDefinitionError::malformed(
                        rule_id,
                        "expected column types are empty",
                    ));
                }
            }
            RuleCheck::ExtremeOutliers { max_outlier_ratio } => {
                check_ratio("max_outlier_ratio", *max_outlier_ratio)?;
            }
            RuleCheck::InvalidDates { max_invalid_ratio } => {
                check_ratio("max_invalid_ratio", *max_invalid_ratio)?;
            }
            RuleCheck::UnexpectedCategory { expected } => {
                if expected.is_empty() {
                    return Err(RuleDefinitionError::malformed(
                        rule_id,
                        "expected categories are empty",
                    ));
                }
                if let Some((column, _)) = expected.iter().find(|(_, values)| values.is_empty()) {
                    return Err(RuleDefinitionError::malformed(
                        rule_id,
                        format!("column '{}' has no expected categories", column),
                    ));
                }
            }
            RuleCheck::DuplicateIdentifiers {
                max_duplicate_ratio,
            } => {
                check_ratio("max_duplicate_ratio", *max_duplicate_ratio)?;
            }
            RuleCheck::RatioOutOfBounds { lower, upper } => {
                if !(lower.is_finite() && upper.is_finite()) || lower > upper {
                    return Err(RuleDefinitionError::malformed(
                        rule_id,
                        format!("invalid bounds [{}, {}]", lower, upper),
                    ));
                }
            }
            RuleCheck::CrossColumn {
                relation,
                tolerance,
            } => {
                if relation.left.is_empty() || relation.right.is_empty() {
                    return Err(RuleDefinitionError::malformed(
                        rule_id,
                        "both sides of the relation need at least one column",
                    ));
                }
                if relation.columns().any(|c| c.trim().is_empty()) {
                    return Err(RuleDefinitionError::malformed(
                        rule_id,
                        "relation references an empty column name",
                    ));
                }
                if !(relation.scale.is_finite() && relation.scale >= 0.0) {
                    return Err(RuleDefinitionError::malformed(
                        rule_id,
                        format!("scale must be a non-negative number, got {}", relation.scale),
                    ));
                }
                if !(tolerance.is_finite() && *tolerance >= 0.0) {
                    return Err(RuleDefinitionError::malformed(
                        rule_id,
                        format!("tolerance must be a non-negative number, got {}", tolerance),
                    ));
                }
            }
            RuleCheck::EmptyDataset | RuleCheck::ImpossibleNegative => {}
        }
        Ok(())
    }
}

/// A single documented quality rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleDefinition {
    pub id: RuleId,
    /// Issue type reported when the rule fires, e.g. "Missing values".
    pub title: String,
    /// Columns the rule applies to; ignored by dataset-level checks.
    #[serde(default)]
    pub columns: ColumnScope,
    pub severity: Severity,
    /// Explanation template; the check's default is used when empty.
    #[serde(default)]
    pub explanation: String,
    pub check: RuleCheck,
}

impl RuleDefinition {
    /// The explanation template to render for an issue.
    pub fn explanation_template(&self) -> &str {
        if self.explanation.trim().is_empty() {
            self.check.default_explanation()
        } else {
            &self.explanation
        }
    }

    /// Validate the definition and return an error if it is malformed.
    pub fn validate(&self) -> Result<(), RuleDefinitionError> {
        let rule_id = self.id.as_str();

        if rule_id.trim().is_empty() {
            return Err(RuleDefinitionError::malformed(
                rule_id,
                "rule id must not be empty",
            ));
        }

        if self.title.trim().is_empty() {
            return Err(RuleDefinitionError::malformed(
                rule_id,
                "rule title must not be empty",
            ));
        }

        if !self.check.is_dataset_level() && self.columns.is_empty() {
            return Err(RuleDefinitionError::malformed(
                rule_id,
                format!("'{}' rules need a column scope", self.check.kind()),
            ));
        }

        self.check.validate(rule_id)
    }
}

// ============================================================================
// Rule sets
// ============================================================================

/// A validated collection of rules, kept in rule id order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    rules: Vec<RuleDefinition>,
}

impl RuleSet {
    /// Build a rule set, failing on the first malformed or duplicate rule.
    pub fn new(mut rules: Vec<RuleDefinition>) -> Result<Self, RuleDefinitionError> {
        let mut seen = HashSet::new();
        for rule in &rules {
            rule.validate()?;
            if !seen.insert(rule.id.as_str()) {
                return Err(RuleDefinitionError::malformed(
                    rule.id.as_str(),
                    "duplicate rule id",
                ));
            }
        }

        rules.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[RuleDefinition] {
        &self.rules
    }

    pub fn iter(&self) -> impl Iterator<Item = &RuleDefinition> {
        self.rules.iter()
    }

    pub fn get(&self, id: &str) -> Option<&RuleDefinition> {
        self.rules.iter().find(|rule| rule.id.as_str() == id)
    }

    /// Rules whose id, title or explanation contains `keyword` (case-insensitive).
    pub fn search(&self, keyword: &str) -> Vec<&RuleDefinition> {
        let keyword = keyword.to_lowercase();
        let matches: Vec<&RuleDefinition> = self
            .rules
            .iter()
            .filter(|rule| {
                rule.id.as_str().to_lowercase().contains(&keyword)
                    || rule.title.to_lowercase().contains(&keyword)
                    || rule.explanation_template().to_lowercase().contains(&keyword)
            })
            .collect();
        debug!("Found {} rules matching '{}'", matches.len(), keyword);
        matches
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Documented column types, usable as profiler hints.
    ///
    /// The union of every `unexpected_type` table; earlier rules win on
    /// conflicting entries.
    pub fn column_type_hints(&self) -> ColumnTypeHints {
        let mut hints = ColumnTypeHints::new();
        for rule in &self.rules {
            if let RuleCheck::UnexpectedType { expected } = &rule.check {
                for (column, column_type) in expected {
                    hints.entry(column.clone()).or_insert(*column_type);
                }
            }
        }
        hints
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rule(id: &str, check: RuleCheck) -> RuleDefinition {
        RuleDefinition {
            id: RuleId::new(id),
            title: "Test rule".to_string(),
            columns: ColumnScope::all(),
            severity: Severity::Medium,
            explanation: String::new(),
            check,
        }
    }

    // ==================== RuleId tests ====================

    #[test]
    fn test_rule_id_natural_order() {
        let mut ids = vec![
            RuleId::new("DQ-10"),
            RuleId::new("DQ-2"),
            RuleId::new("DQ-01"),
            RuleId::new("AB-3"),
        ];
        ids.sort();
        let ids: Vec<&str> = ids.iter().map(RuleId::as_str).collect();
        assert_eq!(ids, vec!["AB-3", "DQ-01", "DQ-2", "DQ-10"]);
    }

    #[test]
    fn test_rule_id_ordering_is_consistent_with_eq() {
        assert_ne!(RuleId::new("DQ-1").cmp(&RuleId::new("DQ-01")), Ordering::Equal);
        assert_eq!(RuleId::new("DQ-1").cmp(&RuleId::new("DQ-1")), Ordering::Equal);
    }

    #[test]
    fn test_rule_id_serializes_as_string() {
        assert_eq!(
            serde_json::to_string(&RuleId::new("DQ-04")).unwrap(),
            "\"DQ-04\""
        );
    }

    // ==================== RuleSet validation tests ====================

    #[test]
    fn test_rule_set_sorts_by_id() {
        let set = RuleSet::new(vec![
            rule("DQ-10", RuleCheck::ImpossibleNegative),
            rule("DQ-2", RuleCheck::EmptyDataset),
        ])
        .unwrap();
        let ids: Vec<&str> = set.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["DQ-2", "DQ-10"]);
        assert!(set.get("DQ-10").is_some());
        assert!(set.get("DQ-3").is_none());
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let err = RuleSet::new(vec![
            rule("DQ-01", RuleCheck::ImpossibleNegative),
            rule("DQ-01", RuleCheck::EmptyDataset),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            RuleDefinitionError::MalformedRule { ref rule_id, .. } if rule_id == "DQ-01"
        ));
    }

    #[test]
    fn test_rejects_empty_id() {
        assert!(RuleSet::new(vec![rule("  ", RuleCheck::EmptyDataset)]).is_err());
    }

    #[test]
    fn test_rejects_inverted_missing_thresholds() {
        let check = RuleCheck::MissingValues {
            medium_threshold: 0.5,
            high_threshold: 0.2,
            sensitive_columns: None,
        };
        assert!(RuleSet::new(vec![rule("DQ-01", check)]).is_err());
    }

    #[test]
    fn test_rejects_ratio_outside_unit_interval() {
        let check = RuleCheck::ExtremeOutliers {
            max_outlier_ratio: 5.0,
        };
        assert!(RuleSet::new(vec![rule("DQ-05", check)]).is_err());
    }

    #[test]
    fn test_rejects_empty_scope_for_column_rules() {
        let mut negative = rule("DQ-04", RuleCheck::ImpossibleNegative);
        negative.columns = ColumnScope::default();
        assert!(RuleSet::new(vec![negative]).is_err());

        let mut empty = rule("DQ-02", RuleCheck::EmptyDataset);
        empty.columns = ColumnScope::default();
        assert!(RuleSet::new(vec![empty]).is_ok());
    }

    #[test]
    fn test_rejects_bad_relation() {
        let check = RuleCheck::CrossColumn {
            relation: AggregateRelation {
                left: vec!["monthly_spend".to_string()],
                comparison: Comparison::Ge,
                right: vec![],
                scale: 1.0,
            },
            tolerance: 0.1,
        };
        assert!(RuleSet::new(vec![rule("DQ-10", check)]).is_err());
    }

    #[test]
    fn test_rejects_inverted_bounds_and_empty_tables() {
        let bounds = RuleCheck::RatioOutOfBounds {
            lower: 1.0,
            upper: 0.0,
        };
        assert!(RuleSet::new(vec![rule("DQ-09", bounds)]).is_err());

        let categories = RuleCheck::UnexpectedCategory {
            expected: BTreeMap::from([("gender".to_string(), BTreeSet::new())]),
        };
        assert!(RuleSet::new(vec![rule("DQ-07", categories)]).is_err());
    }

    // ==================== Relation tests ====================

    #[test]
    fn test_relation_holds_with_tolerance() {
        let relation = AggregateRelation {
            left: vec!["monthly_spend".to_string()],
            comparison: Comparison::Ge,
            right: vec![
                "weekly_purchases".to_string(),
                "average_order_value".to_string(),
            ],
            scale: 1.0,
        };
        assert!(relation.holds(100.0, 100.0, 0.0));
        assert!(!relation.holds(90.0, 100.0, 0.0));
        assert!(relation.holds(90.0, 100.0, 0.1));
        assert_eq!(
            relation.to_string(),
            "mean(monthly_spend) >= mean(weekly_purchases) * mean(average_order_value)"
        );
    }

    #[test]
    fn test_column_type_hints_union() {
        let set = RuleSet::new(vec![rule(
            "DQ-03",
            RuleCheck::UnexpectedType {
                expected: BTreeMap::from([
                    ("age".to_string(), ColumnType::Numeric),
                    ("user_id".to_string(), ColumnType::Identifier),
                ]),
            },
        )])
        .unwrap();

        let hints = set.column_type_hints();
        assert_eq!(hints.get("age"), Some(&ColumnType::Numeric));
        assert_eq!(hints.get("user_id"), Some(&ColumnType::Identifier));
        assert_eq!(hints.len(), 2);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let mut negative = rule("DQ-04", RuleCheck::ImpossibleNegative);
        negative.title = "Negative values".to_string();
        let set = RuleSet::new(vec![negative, rule("DQ-02", RuleCheck::EmptyDataset)]).unwrap();

        let ids: Vec<&str> = set.search("NEGATIVE").iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["DQ-04"]);
        assert_eq!(set.search("dq-0").len(), 2);
        assert!(set.search("unicorn").is_empty());
    }

    #[test]
    fn test_default_explanation_used_when_blank() {
        let r = rule("DQ-02", RuleCheck::EmptyDataset);
        assert!(r.explanation_template().starts_with("Dataset contains 0 rows"));
    }
}
