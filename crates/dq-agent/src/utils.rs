//! Shared parsing utilities for profiling raw cells.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is an integer type.
#[inline]
pub fn is_integer_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Check if a DataType is a floating point type.
#[inline]
pub fn is_float_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Float32 | DataType::Float64)
}

// =============================================================================
// String Parsing Utilities
// =============================================================================

/// Characters commonly used in numeric formatting that should be stripped.
pub const NUMERIC_FORMAT_CHARS: [char; 6] = [',', '$', '%', '€', '£', ' '];

/// Text values that stand for a missing cell.
pub const MISSING_MARKERS: [&str; 7] = ["na", "n/a", "nan", "null", "none", "#n/a", "-nan"];

/// Check if a text cell is empty or a missing value marker.
///
/// ```rust,ignore
/// assert!(is_missing_text("  "));
/// assert!(is_missing_text("N/A"));
/// assert!(!is_missing_text("0"));
/// ```
pub fn is_missing_text(s: &str) -> bool {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return true;
    }
    let lower = trimmed.to_ascii_lowercase();
    MISSING_MARKERS.iter().any(|&marker| lower == marker)
}

/// Clean a string for numeric parsing by removing formatting characters.
pub fn clean_numeric_string(s: &str) -> String {
    let mut result = s.trim().to_string();
    for c in NUMERIC_FORMAT_CHARS {
        result = result.replace(c, "");
    }
    result
}

/// Digits grouped by commas in threes, with an optional decimal part.
static THOUSANDS_GROUPED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?\d{1,3}(,\d{3})+(\.\d+)?$").expect("Invalid regex: thousands separator")
});

/// Try to parse a string as a finite numeric value.
///
/// Handles currency symbols, percentages and thousands separators. A comma
/// that is not a thousands separator (`"0,25"`) makes the value unparseable.
pub fn parse_numeric_string(s: &str) -> Option<f64> {
    if s.contains(',') {
        let grouped: String = s
            .trim()
            .chars()
            .filter(|c| *c == ',' || !NUMERIC_FORMAT_CHARS.contains(c))
            .collect();
        if !THOUSANDS_GROUPED.is_match(&grouped) {
            return None;
        }
    }

    let cleaned = clean_numeric_string(s);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

// =============================================================================
// Date Parsing Utilities
// =============================================================================

/// Accepted calendar date layouts, tried in order.
pub const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%m/%d/%Y"];

/// Accepted date-time layouts, tried in order after RFC 3339.
pub const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Try to parse a string as a calendar date.
///
/// Plain numbers are never dates, even when they happen to be valid
/// timestamps.
pub fn parse_date_string(s: &str) -> Option<NaiveDate> {
    let trimmed = s.trim();
    if trimmed.is_empty() || trimmed.parse::<f64>().is_ok() {
        return None;
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(datetime.date_naive());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|datetime| datetime.date())
}
