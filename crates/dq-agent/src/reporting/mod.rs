//! Report output.
//!
//! The canonical report JSON is the contract other tools read:
//!
//! ```json
//! {
//!   "decision": "WARNING",
//!   "summary": "...",
//!   "issues": [
//!     {"type": "Missing values", "severity": "medium", "rule_reference": "DQ-01",
//!      "explanation": "...", "column": "age"}
//!   ],
//!   "stats": {"row_count": 1000, "column_count": 12, "issues_count": 1}
//! }
//! ```
//!
//! [`ReportExporter`] writes the same document to disk with an extra
//! `metadata` object.

mod exporter;

pub use exporter::{ReportExporter, report_to_json};
