//! Deterministic rule engine.
//!
//! Rules are applied in rule id order and, within a rule, to columns in
//! dataset order, so the issue sequence is stable across runs.

use crate::rules::{
    AggregateRelation, RuleCheck, RuleDefinition, RuleSet, format_percent, render_explanation,
};
use crate::types::{ColumnProfile, ColumnType, DatasetProfile, Issue, MeasuredValue, Severity};
use tracing::{debug, info, warn};

/// Applies a [`RuleSet`] to a [`DatasetProfile`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleEngine;

impl RuleEngine {
    /// Evaluate every rule and collect the issues, in rule then column order.
    ///
    /// Each (rule, column) pair yields at most one issue. Dataset-level rules
    /// yield at most one issue in total.
    pub fn evaluate(profile: &DatasetProfile, rules: &RuleSet) -> Vec<Issue> {
        info!(
            "Evaluating {} rules against {} columns",
            rules.len(),
            profile.column_count
        );

        let mut issues = Vec::new();

        for rule in rules.iter() {
            let before = issues.len();

            match &rule.check {
                RuleCheck::EmptyDataset => issues.extend(check_empty_dataset(rule, profile)),
                RuleCheck::CrossColumn {
                    relation,
                    tolerance,
                } => issues.extend(check_relation(rule, relation, *tolerance, profile)),
                check => {
                    for name in rule.columns.unmatched_names(profile) {
                        warn!(
                            "Rule {} skipped for column '{}': column not in dataset",
                            rule.id, name
                        );
                    }
                    issues.extend(
                        profile
                            .columns
                            .iter()
                            .filter(|column| rule.columns.matches(&column.name))
                            .filter_map(|column| check_column(rule, check, column, profile)),
                    );
                }
            }

            debug!("Rule {} raised {} issue(s)", rule.id, issues.len() - before);
        }

        info!("Rule evaluation found {} issue(s)", issues.len());
        issues
    }
}

/// Build an issue and render its explanation.
///
/// `{column}` and `{value}` are always available to the template.
fn new_issue(
    rule: &RuleDefinition,
    severity: Severity,
    column: Option<&str>,
    measured_value: MeasuredValue,
    extra: Vec<(&str, String)>,
) -> Issue {
    let mut vars = vec![
        ("column", column.unwrap_or_default().to_string()),
        ("value", measured_value.to_string()),
    ];
    vars.extend(extra);

    let explanation = render_explanation(rule.explanation_template(), &vars);
    debug!("{} [{}]: {}", rule.id, severity, explanation);

    Issue {
        issue_type: rule.title.clone(),
        severity,
        rule_id: rule.id.clone(),
        explanation,
        column: column.map(str::to_string),
        measured_value,
    }
}

fn check_empty_dataset(rule: &RuleDefinition, profile: &DatasetProfile) -> Option<Issue> {
    if profile.row_count > 0 {
        return None;
    }
    Some(new_issue(
        rule,
        rule.severity,
        None,
        MeasuredValue::Count(0),
        Vec::new(),
    ))
}

fn check_relation(
    rule: &RuleDefinition,
    relation: &AggregateRelation,
    tolerance: f64,
    profile: &DatasetProfile,
) -> Option<Issue> {
    if profile.is_empty() {
        debug!("Rule {} skipped: dataset has no rows", rule.id);
        return None;
    }

    let mean_of = |name: &String| {
        profile
            .column(name)
            .and_then(ColumnProfile::numeric_stats)
            .map(|stats| stats.mean)
    };
    let product = |names: &[String]| {
        names
            .iter()
            .map(mean_of)
            .try_fold(1.0, |acc, mean| mean.map(|m| acc * m))
    };

    let (Some(lhs), Some(right)) = (product(&relation.left), product(&relation.right)) else {
        warn!(
            "Rule {} skipped: relation '{}' needs numeric columns that are missing or empty",
            rule.id, relation
        );
        return None;
    };
    let rhs = relation.scale * right;

    if relation.holds(lhs, rhs, tolerance) {
        return None;
    }

    let detail = format!(
        "expected {} (within {}%), got {:.2} vs {:.2}",
        relation,
        format_percent(tolerance),
        lhs,
        rhs
    );
    Some(new_issue(
        rule,
        rule.severity,
        None,
        MeasuredValue::Number(lhs),
        vec![("detail", detail)],
    ))
}

fn check_column(
    rule: &RuleDefinition,
    check: &RuleCheck,
    column: &ColumnProfile,
    profile: &DatasetProfile,
) -> Option<Issue> {
    let name = Some(column.name.as_str());

    match check {
        RuleCheck::MissingValues {
            medium_threshold,
            high_threshold,
            sensitive_columns,
        } => {
            let ratio = column.missing_ratio;
            let sensitive = sensitive_columns
                .as_ref()
                .is_none_or(|columns| columns.contains(&column.name));
            let (severity, threshold) = if ratio > *high_threshold {
                (Severity::High, *high_threshold)
            } else if ratio >= *medium_threshold {
                let severity = if sensitive { rule.severity } else { Severity::Low };
                (severity, *medium_threshold)
            } else {
                return None;
            };
            Some(new_issue(
                rule,
                severity,
                name,
                MeasuredValue::Ratio(ratio),
                vec![
                    ("percent", format_percent(ratio)),
                    ("threshold", threshold.to_string()),
                    ("threshold_percent", format_percent(threshold)),
                ],
            ))
        }

        RuleCheck::UnexpectedType { expected } => {
            let expected_type = expected.get(&column.name)?;
            // Nothing to judge without values.
            if column.value_count == 0 || expected_type.accepts(column.value_type) {
                return None;
            }
            Some(new_issue(
                rule,
                rule.severity,
                name,
                MeasuredValue::Type(column.value_type),
                vec![("detail", expected_type.to_string())],
            ))
        }

        RuleCheck::ImpossibleNegative => {
            let negative_count = column.negative_count()?;
            let stats = column.numeric_stats()?;
            if negative_count == 0 {
                return None;
            }
            let ratio = negative_count as f64 / profile.row_count.max(1) as f64;
            Some(new_issue(
                rule,
                rule.severity,
                name,
                MeasuredValue::Number(stats.min),
                vec![
                    ("count", negative_count.to_string()),
                    ("percent", format_percent(ratio)),
                ],
            ))
        }

        RuleCheck::ExtremeOutliers { max_outlier_ratio } => {
            let ratio = column.outlier_ratio()?;
            if ratio <= *max_outlier_ratio {
                return None;
            }
            let detail = column
                .outlier_bounds()
                .map(|b| format!("{:.2}, {:.2}", b.lower, b.upper))
                .unwrap_or_default();
            Some(new_issue(
                rule,
                rule.severity,
                name,
                MeasuredValue::Ratio(ratio),
                vec![
                    ("percent", format_percent(ratio)),
                    ("threshold", max_outlier_ratio.to_string()),
                    ("threshold_percent", format_percent(*max_outlier_ratio)),
                    ("detail", detail),
                ],
            ))
        }

        RuleCheck::InvalidDates { max_invalid_ratio } => {
            let ratio = column.invalid_date_ratio()?;
            if ratio <= *max_invalid_ratio {
                return None;
            }
            Some(new_issue(
                rule,
                rule.severity,
                name,
                MeasuredValue::Ratio(ratio),
                vec![
                    ("percent", format_percent(ratio)),
                    ("threshold", max_invalid_ratio.to_string()),
                    ("threshold_percent", format_percent(*max_invalid_ratio)),
                ],
            ))
        }

        RuleCheck::UnexpectedCategory { expected } => {
            let allowed = expected.get(&column.name)?;
            let observed = column.observed_categories()?;
            let unexpected: Vec<String> = observed.difference(allowed).cloned().collect();
            if unexpected.is_empty() {
                return None;
            }
            let detail = allowed.iter().cloned().collect::<Vec<_>>().join(", ");
            Some(new_issue(
                rule,
                rule.severity,
                name,
                MeasuredValue::Categories(unexpected),
                vec![("detail", detail)],
            ))
        }

        RuleCheck::DuplicateIdentifiers {
            max_duplicate_ratio,
        } => {
            if column.column_type() != ColumnType::Identifier || profile.row_count == 0 {
                return None;
            }
            let duplicates = profile.row_count.saturating_sub(column.distinct_count);
            let ratio = duplicates as f64 / profile.row_count as f64;
            if ratio <= *max_duplicate_ratio {
                return None;
            }
            Some(new_issue(
                rule,
                rule.severity,
                name,
                MeasuredValue::Count(duplicates),
                vec![
                    ("percent", format_percent(ratio)),
                    ("threshold", max_duplicate_ratio.to_string()),
                    ("threshold_percent", format_percent(*max_duplicate_ratio)),
                ],
            ))
        }

        RuleCheck::RatioOutOfBounds { lower, upper } => {
            let stats = column.numeric_stats()?;
            let offending = if stats.min < *lower {
                stats.min
            } else if stats.max > *upper {
                stats.max
            } else {
                return None;
            };
            Some(new_issue(
                rule,
                rule.severity,
                name,
                MeasuredValue::Number(offending),
                vec![("detail", format!("{}, {}", lower, upper))],
            ))
        }

        // Dataset-level checks never reach the per-column path.
        RuleCheck::EmptyDataset | RuleCheck::CrossColumn { .. } => None,
    }
}
