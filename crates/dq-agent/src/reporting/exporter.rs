//! JSON report export.

use crate::error::{Result, ResultExt};
use crate::types::Report;
use chrono::Local;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes reports as pretty-printed JSON files.
#[derive(Debug, Clone)]
pub struct ReportExporter {
    output_dir: PathBuf,
}

impl Default for ReportExporter {
    fn default() -> Self {
        Self::new("reports")
    }
}

#[derive(Serialize)]
struct ExportedReport<'a> {
    #[serde(flatten)]
    report: &'a Report,
    metadata: Map<String, Value>,
}

/// Canonical JSON rendering of a report.
pub fn report_to_json(report: &Report) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

impl ReportExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Export a report with a `metadata` object.
    ///
    /// The caller's metadata is kept and `exported_at` is set to the current
    /// local time (RFC 3339). Without a file name the report is written to
    /// `report_<YYYYMMDD_HHMMSS>.json`.
    pub fn export_json(
        &self,
        report: &Report,
        file_name: Option<&str>,
        metadata: Map<String, Value>,
    ) -> Result<PathBuf> {
        let now = Local::now();
        let file_name = file_name
            .map(str::to_string)
            .unwrap_or_else(|| format!("report_{}.json", now.format("%Y%m%d_%H%M%S")));

        let mut metadata = metadata;
        metadata.insert("exported_at".to_string(), Value::String(now.to_rfc3339()));
        let document = ExportedReport { report, metadata };

        fs::create_dir_all(&self.output_dir).context(format!(
            "Failed to create report directory {}",
            self.output_dir.display()
        ))?;

        let report_path = self.output_dir.join(file_name);
        let mut file = File::create(&report_path)
            .context(format!("Failed to create {}", report_path.display()))?;
        file.write_all(serde_json::to_string_pretty(&document)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());

        Ok(report_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleId;
    use crate::types::{Decision, Issue, MeasuredValue, ReportStats, Severity};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample_report() -> Report {
        Report {
            decision: Decision::Warning,
            summary: "Dataset with 1,000 rows and 12 columns has 1 quality issue(s) requiring attention."
                .to_string(),
            issues: vec![Issue {
                issue_type: "Missing values".to_string(),
                severity: Severity::Medium,
                rule_id: RuleId::new("DQ-01"),
                explanation: "Column 'age' has 25.0% missing values, exceeding the 20.0% threshold."
                    .to_string(),
                column: Some("age".to_string()),
                measured_value: MeasuredValue::Ratio(0.25),
            }],
            stats: ReportStats {
                row_count: 1000,
                column_count: 12,
                issues_count: 1,
            },
        }
    }

    #[test]
    fn test_report_to_json_canonical_shape() {
        let json: Value = serde_json::from_str(&report_to_json(&sample_report()).unwrap()).unwrap();
        assert_eq!(
            json,
            json!({
                "decision": "WARNING",
                "summary": "Dataset with 1,000 rows and 12 columns has 1 quality issue(s) requiring attention.",
                "issues": [{
                    "type": "Missing values",
                    "severity": "medium",
                    "rule_reference": "DQ-01",
                    "explanation": "Column 'age' has 25.0% missing values, exceeding the 20.0% threshold.",
                    "column": "age"
                }],
                "stats": {"row_count": 1000, "column_count": 12, "issues_count": 1}
            })
        );
    }

    #[test]
    fn test_export_json_writes_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = ReportExporter::new(dir.path().join("nested"));

        let mut metadata = Map::new();
        metadata.insert("source".to_string(), json!("data/customers.csv"));
        let path = exporter
            .export_json(&sample_report(), Some("customers.json"), metadata)
            .unwrap();

        assert_eq!(path, dir.path().join("nested").join("customers.json"));
        let written: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["decision"], json!("WARNING"));
        assert_eq!(written["metadata"]["source"], json!("data/customers.csv"));
        let exported_at = written["metadata"]["exported_at"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(exported_at).is_ok());
    }

    #[test]
    fn test_export_json_default_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = ReportExporter::new(dir.path());
        let path = exporter
            .export_json(&sample_report(), None, Map::new())
            .unwrap();

        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("report_"));
        assert!(name.ends_with(".json"));
    }
}
