//! Type inference logic for column analysis.

use crate::config::ProfilerConfig;
use crate::dataset::Cell;
use crate::types::ColumnType;
use crate::utils::{parse_date_string, parse_numeric_string};
use chrono::NaiveDate;
use regex::Regex;

/// Numeric value of a non-missing cell, if it has one.
///
/// Booleans are never numeric.
pub(crate) fn numeric_value(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Int(i) => Some(*i as f64),
        Cell::Float(v) if v.is_finite() => Some(*v),
        Cell::Text(s) => parse_numeric_string(s),
        _ => None,
    }
}

/// Calendar date of a non-missing cell, if it has one.
pub(crate) fn date_value(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Text(s) => parse_date_string(s),
        _ => None,
    }
}

/// Whether the column name matches one of the identifier patterns.
pub(crate) fn is_identifier_name(col_name: &str, patterns: &[Regex]) -> bool {
    patterns.iter().any(|pattern| pattern.is_match(col_name))
}

/// Share of values accepted by `parses`.
fn success_ratio<T>(values: &[&Cell], parses: impl Fn(&Cell) -> Option<T>) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let parsed = values.iter().filter(|cell| parses(cell).is_some()).count();
    parsed as f64 / values.len() as f64
}

/// Infer what the non-missing values of a column look like.
///
/// Numeric wins over date, and anything else is categorical. A column
/// named like a date gets a relaxed date threshold so that a mostly-broken
/// date column is still recognised (and its invalid share reported).
pub(crate) fn infer_value_type(
    col_name: &str,
    values: &[&Cell],
    config: &ProfilerConfig,
) -> ColumnType {
    if values.is_empty() {
        return ColumnType::Categorical;
    }

    if success_ratio(values, numeric_value) >= config.type_success_ratio {
        return ColumnType::Numeric;
    }

    let date_ratio = success_ratio(values, date_value);
    if date_ratio >= config.type_success_ratio {
        return ColumnType::Date;
    }

    let named_like_date = col_name.to_lowercase().contains("date");
    if named_like_date && date_ratio >= config.named_date_success_ratio {
        return ColumnType::Date;
    }

    ColumnType::Categorical
}
