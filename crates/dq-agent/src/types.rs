//! Value types shared by the profiler, the rule engine and the aggregator.
//!
//! Everything here is created fresh per assessment run and never mutated
//! after construction.

use crate::rules::RuleId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ============================================================================
// Profile Types
// ============================================================================

/// Semantic type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Numeric,
    Categorical,
    Date,
    Identifier,
}

impl ColumnType {
    /// Whether values that look like `value_type` satisfy this expected type.
    ///
    /// Identifiers are a role rather than a value shape: numeric codes and
    /// string keys both qualify, dates do not.
    pub fn accepts(self, value_type: ColumnType) -> bool {
        match self {
            ColumnType::Identifier => value_type != ColumnType::Date,
            expected => expected == value_type,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ColumnType::Numeric => "numeric",
            ColumnType::Categorical => "categorical",
            ColumnType::Date => "date",
            ColumnType::Identifier => "identifier",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Explicit column types that override inference, keyed by column name.
pub type ColumnTypeHints = BTreeMap<String, ColumnType>;

/// Descriptive statistics of a numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator).
    pub std: f64,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
}

/// IQR fences outside which values count as outliers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlierBounds {
    pub lower: f64,
    pub upper: f64,
}

/// Type-specific facts of a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColumnFacts {
    Numeric {
        /// `None` when no value could be parsed.
        stats: Option<NumericStats>,
        outlier_bounds: Option<OutlierBounds>,
        outlier_count: usize,
        outlier_ratio: f64,
        /// Parsed values below zero.
        negative_count: usize,
    },
    Categorical {
        observed_categories: BTreeSet<String>,
    },
    Date {
        invalid_count: usize,
        invalid_date_ratio: f64,
    },
    Identifier,
}

impl ColumnFacts {
    pub fn column_type(&self) -> ColumnType {
        match self {
            ColumnFacts::Numeric { .. } => ColumnType::Numeric,
            ColumnFacts::Categorical { .. } => ColumnType::Categorical,
            ColumnFacts::Date { .. } => ColumnType::Date,
            ColumnFacts::Identifier => ColumnType::Identifier,
        }
    }
}

/// Facts about a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    /// What the values alone look like, ignoring hints and name patterns.
    pub value_type: ColumnType,
    /// Non-missing cells before any type-specific parsing.
    pub value_count: usize,
    pub missing_count: usize,
    pub missing_ratio: f64,
    pub distinct_count: usize,
    pub facts: ColumnFacts,
}

impl ColumnProfile {
    /// The effective column type (hint, identifier pattern or inference).
    pub fn column_type(&self) -> ColumnType {
        self.facts.column_type()
    }

    pub fn numeric_stats(&self) -> Option<&NumericStats> {
        match &self.facts {
            ColumnFacts::Numeric { stats, .. } => stats.as_ref(),
            _ => None,
        }
    }

    pub fn outlier_bounds(&self) -> Option<&OutlierBounds> {
        match &self.facts {
            ColumnFacts::Numeric { outlier_bounds, .. } => outlier_bounds.as_ref(),
            _ => None,
        }
    }

    pub fn outlier_ratio(&self) -> Option<f64> {
        match self.facts {
            ColumnFacts::Numeric { outlier_ratio, .. } => Some(outlier_ratio),
            _ => None,
        }
    }

    pub fn negative_count(&self) -> Option<usize> {
        match self.facts {
            ColumnFacts::Numeric { negative_count, .. } => Some(negative_count),
            _ => None,
        }
    }

    pub fn invalid_date_ratio(&self) -> Option<f64> {
        match self.facts {
            ColumnFacts::Date {
                invalid_date_ratio, ..
            } => Some(invalid_date_ratio),
            _ => None,
        }
    }

    pub fn observed_categories(&self) -> Option<&BTreeSet<String>> {
        match &self.facts {
            ColumnFacts::Categorical {
                observed_categories,
            } => Some(observed_categories),
            _ => None,
        }
    }
}

/// Facts about a whole dataset, columns in dataset order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetProfile {
    pub row_count: usize,
    pub column_count: usize,
    pub columns: Vec<ColumnProfile>,
}

impl DatasetProfile {
    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }
}

// ============================================================================
// Assessment Types
// ============================================================================

/// Issue severity, ordered `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final verdict for a dataset, ordered `Accept < Warning < Reject`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    Accept,
    Warning,
    Reject,
}

impl Decision {
    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Accept => "ACCEPT",
            Decision::Warning => "WARNING",
            Decision::Reject => "REJECT",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fact a rule measured when it raised an issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MeasuredValue {
    Ratio(f64),
    Count(usize),
    Number(f64),
    Type(ColumnType),
    Categories(Vec<String>),
}

impl fmt::Display for MeasuredValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeasuredValue::Ratio(r) => write!(f, "{:.4}", r),
            MeasuredValue::Count(n) => write!(f, "{}", n),
            MeasuredValue::Number(v) => write!(f, "{:.2}", v),
            MeasuredValue::Type(t) => write!(f, "{}", t),
            MeasuredValue::Categories(values) => write!(f, "{}", values.join(", ")),
        }
    }
}

/// A single rule violation.
///
/// Serializes to the canonical report shape
/// `{type, severity, rule_reference, explanation, column}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    #[serde(rename = "type")]
    pub issue_type: String,
    pub severity: Severity,
    #[serde(rename = "rule_reference")]
    pub rule_id: RuleId,
    pub explanation: String,
    /// `None` for dataset-level and cross-column rules.
    pub column: Option<String>,
    #[serde(skip)]
    pub measured_value: MeasuredValue,
}

/// Basic counts attached to a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportStats {
    pub row_count: usize,
    pub column_count: usize,
    pub issues_count: usize,
}

/// Final quality assessment of one dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub decision: Decision,
    pub summary: String,
    pub issues: Vec<Issue>,
    pub stats: ReportStats,
}

impl Report {
    /// Issues raised by a given rule, in report order.
    pub fn issues_for_rule<'a>(&'a self, rule_id: &'a str) -> impl Iterator<Item = &'a Issue> {
        self.issues
            .iter()
            .filter(move |issue| issue.rule_id.as_str() == rule_id)
    }

    pub fn high_severity_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.severity == Severity::High)
            .count()
    }
}

// Profiles and reports are shared across threads in batch runs.
static_assertions::assert_impl_all!(DatasetProfile: Send, Sync);
static_assertions::assert_impl_all!(Report: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decision_ordering() {
        assert!(Decision::Accept < Decision::Warning);
        assert!(Decision::Warning < Decision::Reject);
        assert_eq!(
            [Decision::Reject, Decision::Accept, Decision::Warning]
                .into_iter()
                .max(),
            Some(Decision::Reject)
        );
    }

    #[test]
    fn test_severity_serialization() {
        assert_eq!(serde_json::to_string(&Severity::Medium).unwrap(), "\"medium\"");
        assert_eq!(serde_json::to_string(&Decision::Warning).unwrap(), "\"WARNING\"");
        assert!(Severity::Low < Severity::High);
    }

    #[test]
    fn test_identifier_accepts_any_non_date_value_type() {
        assert!(ColumnType::Identifier.accepts(ColumnType::Numeric));
        assert!(ColumnType::Identifier.accepts(ColumnType::Categorical));
        assert!(!ColumnType::Identifier.accepts(ColumnType::Date));
        assert!(ColumnType::Numeric.accepts(ColumnType::Numeric));
        assert!(!ColumnType::Numeric.accepts(ColumnType::Categorical));
    }

    #[test]
    fn test_issue_canonical_shape() {
        let issue = Issue {
            issue_type: "Missing values".to_string(),
            severity: Severity::Medium,
            rule_id: RuleId::new("DQ-01"),
            explanation: "Column 'age' has 25.0% missing values.".to_string(),
            column: Some("age".to_string()),
            measured_value: MeasuredValue::Ratio(0.25),
        };

        let value = serde_json::to_value(&issue).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "type": "Missing values",
                "severity": "medium",
                "rule_reference": "DQ-01",
                "explanation": "Column 'age' has 25.0% missing values.",
                "column": "age"
            })
        );
    }

    #[test]
    fn test_column_profile_accessors() {
        let profile = ColumnProfile {
            name: "last_purchase_date".to_string(),
            value_type: ColumnType::Date,
            value_count: 10,
            missing_count: 0,
            missing_ratio: 0.0,
            distinct_count: 10,
            facts: ColumnFacts::Date {
                invalid_count: 1,
                invalid_date_ratio: 0.1,
            },
        };

        assert_eq!(profile.column_type(), ColumnType::Date);
        assert_eq!(profile.invalid_date_ratio(), Some(0.1));
        assert_eq!(profile.outlier_ratio(), None);
        assert!(profile.numeric_stats().is_none());
        assert!(profile.observed_categories().is_none());
    }
}
