//! Explanation templates.
//!
//! Placeholders are written as `{name}`. Unknown placeholders are left
//! untouched so a typo shows up in the report instead of vanishing.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{([a-z_]+)\}").expect("Invalid regex: placeholder")
});

/// Format a 0-1 ratio as a percentage with one decimal.
pub(crate) fn format_percent(ratio: f64) -> String {
    format!("{:.1}", ratio * 100.0)
}

/// Replace `{name}` placeholders with the matching value.
pub(crate) fn render_explanation(template: &str, vars: &[(&str, String)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            let name = &caps[1];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.clone())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
