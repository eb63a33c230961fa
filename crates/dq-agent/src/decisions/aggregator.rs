//! Turns a list of issues into the final decision.

use crate::types::{Decision, DatasetProfile, Issue, Report, ReportStats, Severity};
use tracing::info;

/// Aggregate issues into a report. Total and pure.
///
/// An empty dataset or any high-severity issue rejects the dataset, any
/// other issue yields a warning, and no issue at all accepts it.
pub fn aggregate(issues: Vec<Issue>, profile: &DatasetProfile) -> Report {
    let high_count = issues
        .iter()
        .filter(|issue| issue.severity == Severity::High)
        .count();

    let decision = if profile.row_count == 0 || high_count > 0 {
        Decision::Reject
    } else if !issues.is_empty() {
        Decision::Warning
    } else {
        Decision::Accept
    };

    let summary = summarize(decision, profile, issues.len(), high_count);
    info!(
        "Decision: {} ({} issue(s), {} high)",
        decision,
        issues.len(),
        high_count
    );

    Report {
        decision,
        summary,
        stats: ReportStats {
            row_count: profile.row_count,
            column_count: profile.column_count,
            issues_count: issues.len(),
        },
        issues,
    }
}

fn summarize(
    decision: Decision,
    profile: &DatasetProfile,
    issue_count: usize,
    high_count: usize,
) -> String {
    let shape = format!(
        "Dataset with {} rows and {} columns",
        format_thousands(profile.row_count),
        profile.column_count
    );

    match decision {
        Decision::Accept => format!("{} passed all quality checks.", shape),
        Decision::Warning => format!(
            "{} has {} quality issue(s) requiring attention.",
            shape, issue_count
        ),
        Decision::Reject => format!(
            "{} has {} critical quality issue(s). Manual review required.",
            shape,
            high_count.max(1)
        ),
    }
}

/// `1234567` -> `1,234,567`.
fn format_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
