//! Built-in DQ-01 ... DQ-10 rule catalogue for the customer behavior dataset.

use super::{
    AggregateRelation, ColumnScope, Comparison, RuleCheck, RuleDefinition, RuleId, RuleSet,
};
use crate::types::{ColumnType, Severity};
use std::collections::{BTreeMap, BTreeSet};

/// Share of missing values that raises a medium issue.
const MISSING_MEDIUM_THRESHOLD: f64 = 0.20;
/// Share of missing values above which the issue becomes high.
const MISSING_HIGH_THRESHOLD: f64 = 0.40;
/// Maximum tolerated outlier share on continuous columns.
const MAX_OUTLIER_RATIO: f64 = 0.05;
/// Maximum tolerated share of unparseable dates.
const MAX_INVALID_DATE_RATIO: f64 = 0.05;

/// Columns where missing values matter most. Others only raise `low`
/// between the two missing thresholds.
const SENSITIVE_COLUMNS: &[&str] = &[
    "user_id",
    "age",
    "gender",
    "country",
    "income_level",
    "weekly_purchases",
    "monthly_spend",
    "average_order_value",
    "last_purchase_date",
];

const DOCUMENTED_TYPES: &[(&str, ColumnType)] = &[
    ("user_id", ColumnType::Identifier),
    ("age", ColumnType::Numeric),
    ("gender", ColumnType::Categorical),
    ("country", ColumnType::Categorical),
    ("income_level", ColumnType::Categorical),
    ("weekly_purchases", ColumnType::Numeric),
    ("monthly_spend", ColumnType::Numeric),
    ("average_order_value", ColumnType::Numeric),
    ("cart_abandonment_rate", ColumnType::Numeric),
    ("loyalty_program_member", ColumnType::Categorical),
    ("account_age_months", ColumnType::Numeric),
    ("last_purchase_date", ColumnType::Date),
];

const NON_NEGATIVE_COLUMNS: &[&str] = &[
    "age",
    "weekly_purchases",
    "monthly_spend",
    "average_order_value",
    "household_size",
    "referral_count",
    "impulse_purchases_per_month",
    "hobby_count",
    "daily_session_time_minutes",
    "product_views_per_day",
    "ad_views_per_day",
    "ad_clicks_per_day",
    "wishlist_items_count",
    "cart_items_average",
    "checkout_abandonments_per_month",
    "account_age_months",
];

const CONTINUOUS_COLUMNS: &[&str] = &[
    "monthly_spend",
    "average_order_value",
    "daily_session_time_minutes",
    "cart_items_average",
];

const EXPECTED_CATEGORIES: &[(&str, &[&str])] = &[
    ("gender", &["Male", "Female", "Other"]),
    ("country", &["France", "USA", "UK", "Germany", "Spain"]),
    ("income_level", &["Low", "Medium", "High"]),
    ("loyalty_program_member", &["Yes", "No"]),
];

const RATIO_COLUMNS: &[&str] = &["cart_abandonment_rate", "*_rate", "*_ratio"];

fn scope(patterns: &[&str]) -> ColumnScope {
    ColumnScope::of(patterns.iter().copied()).expect("Invalid column pattern in standard rules")
}

fn definition(
    id: &str,
    title: &str,
    columns: ColumnScope,
    severity: Severity,
    check: RuleCheck,
) -> RuleDefinition {
    RuleDefinition {
        id: RuleId::new(id),
        title: title.to_string(),
        columns,
        severity,
        explanation: check.default_explanation().to_string(),
        check,
    }
}

impl RuleSet {
    /// The standard DQ-01 ... DQ-10 catalogue.
    pub fn standard() -> Self {
        let expected_types: BTreeMap<String, ColumnType> = DOCUMENTED_TYPES
            .iter()
            .map(|(name, column_type)| (name.to_string(), *column_type))
            .collect();

        let expected_categories: BTreeMap<String, BTreeSet<String>> = EXPECTED_CATEGORIES
            .iter()
            .map(|(name, values)| {
                (
                    name.to_string(),
                    values.iter().map(|v| v.to_string()).collect(),
                )
            })
            .collect();

        let rules = vec![
            definition(
                "DQ-01",
                "Missing values",
                ColumnScope::all(),
                Severity::Medium,
                RuleCheck::MissingValues {
                    medium_threshold: MISSING_MEDIUM_THRESHOLD,
                    high_threshold: MISSING_HIGH_THRESHOLD,
                    sensitive_columns: Some(
                        SENSITIVE_COLUMNS.iter().map(|c| c.to_string()).collect(),
                    ),
                },
            ),
            definition(
                "DQ-02",
                "Empty dataset",
                ColumnScope::default(),
                Severity::High,
                RuleCheck::EmptyDataset,
            ),
            definition(
                "DQ-03",
                "Type mismatch",
                ColumnScope::all(),
                Severity::Medium,
                RuleCheck::UnexpectedType {
                    expected: expected_types,
                },
            ),
            definition(
                "DQ-04",
                "Negative values",
                scope(NON_NEGATIVE_COLUMNS),
                Severity::Medium,
                RuleCheck::ImpossibleNegative,
            ),
            definition(
                "DQ-05",
                "Outliers",
                scope(CONTINUOUS_COLUMNS),
                Severity::Medium,
                RuleCheck::ExtremeOutliers {
                    max_outlier_ratio: MAX_OUTLIER_RATIO,
                },
            ),
            definition(
                "DQ-06",
                "Invalid dates",
                ColumnScope::all(),
                Severity::Medium,
                RuleCheck::InvalidDates {
                    max_invalid_ratio: MAX_INVALID_DATE_RATIO,
                },
            ),
            definition(
                "DQ-07",
                "Unexpected category",
                ColumnScope::all(),
                Severity::Medium,
                RuleCheck::UnexpectedCategory {
                    expected: expected_categories,
                },
            ),
            definition(
                "DQ-08",
                "Duplicate identifiers",
                ColumnScope::all(),
                Severity::Medium,
                RuleCheck::DuplicateIdentifiers {
                    max_duplicate_ratio: 0.0,
                },
            ),
            definition(
                "DQ-09",
                "Ratio out of bounds",
                scope(RATIO_COLUMNS),
                Severity::Medium,
                RuleCheck::RatioOutOfBounds {
                    lower: 0.0,
                    upper: 1.0,
                },
            ),
            definition(
                "DQ-10",
                "Behavioral inconsistency",
                ColumnScope::default(),
                Severity::Medium,
                RuleCheck::CrossColumn {
                    // A month holds a little over four weeks of purchases.
                    relation: AggregateRelation {
                        left: vec!["monthly_spend".to_string()],
                        comparison: Comparison::Le,
                        right: vec![
                            "weekly_purchases".to_string(),
                            "average_order_value".to_string(),
                        ],
                        scale: 5.0,
                    },
                    tolerance: 0.15,
                },
            ),
        ];

        Self { rules }
    }
}
