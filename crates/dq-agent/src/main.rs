//! CLI entry point for the data quality agent.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use dq_agent::{Assessment, AssessmentPipeline, Decision, ReportExporter, RuleSet, report_to_json};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Rule-based data quality assessment",
    long_about = "Profiles a CSV dataset, checks it against documented quality rules and \
                  decides whether it is fit for use (ACCEPT, WARNING or REJECT).\n\n\
                  The process exits with status 1 when the dataset is rejected.\n\n\
                  EXAMPLES:\n  \
                  # Assess with the built-in DQ-01..DQ-10 rules\n  \
                  dq-agent -d data/customers.csv\n\n  \
                  # Use a custom rule document and export the report\n  \
                  dq-agent -d data/customers.csv -r rules/quality_rules.json -o reports/\n\n  \
                  # Machine-readable output\n  \
                  dq-agent -d data/customers.csv --json | jq .decision"
)]
struct Args {
    /// Path to the CSV file to assess
    #[arg(short, long)]
    data: String,

    /// JSON rule document
    ///
    /// If not specified, the built-in DQ-01..DQ-10 rules are used
    #[arg(short, long)]
    rules: Option<String>,

    /// Directory to export the JSON report to
    ///
    /// The report will be saved as <data_name>_report.json
    #[arg(short, long)]
    output: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings and the final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output the JSON report to stdout instead of a human-readable summary
    ///
    /// Disables all logs; only the report is written.
    /// Useful for piping to other tools: `... --json | jq .decision`
    #[arg(long)]
    json: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    if !Path::new(&args.data).exists() {
        return Err(anyhow!("Data file not found: {}", args.data));
    }

    let rules = match &args.rules {
        Some(path) => RuleSet::from_path(path)
            .with_context(|| format!("Failed to load rules from {}", path))?,
        None => {
            info!("No rule document given, using the built-in rules");
            RuleSet::standard()
        }
    };

    info!("Loading dataset from: {}", args.data);
    let data = load_csv(&args.data)?;
    info!("Dataset loaded successfully: {:?}", data.shape());

    let pipeline = AssessmentPipeline::builder().rules(rules).build()?;
    let assessment = pipeline.assess_dataframe(&data)?;

    if let Some(ref output) = args.output {
        let mut metadata = Map::new();
        metadata.insert("source".to_string(), Value::String(args.data.clone()));
        metadata.insert(
            "rules".to_string(),
            Value::String(args.rules.clone().unwrap_or_else(|| "built-in".to_string())),
        );
        let file_name = format!("{}_report.json", extract_file_stem(&args.data));
        let path = ReportExporter::new(output).export_json(
            &assessment.report,
            Some(&file_name),
            metadata,
        )?;
        info!("Report written to: {}", path.display());
    }

    if args.json {
        println!("{}", report_to_json(&assessment.report)?);
    } else {
        print_human_readable_summary(&assessment, &args);
    }

    Ok(match assessment.report.decision {
        Decision::Reject => ExitCode::FAILURE,
        Decision::Accept | Decision::Warning => ExitCode::SUCCESS,
    })
}

/// Print the assessment for a terminal reader.
///
/// Uses `println!` rather than logging so the result is visible at any
/// log level.
fn print_human_readable_summary(assessment: &Assessment, args: &Args) {
    let report = &assessment.report;

    println!("\n{}", "=".repeat(80));
    println!("DATA QUALITY ASSESSMENT");
    println!("{}\n", "=".repeat(80));

    println!("  File: {}", args.data);
    println!("  Rows: {}", report.stats.row_count);
    println!("  Columns: {}", report.stats.column_count);
    println!();

    println!("COLUMN PROFILES");
    println!("{}", "-".repeat(40));
    println!(
        "{:<24} {:<12} {:<10} {:<10}",
        "Column", "Type", "Missing %", "Distinct"
    );
    println!("{}", "-".repeat(60));
    for col in &assessment.profile.columns {
        println!(
            "{:<24} {:<12} {:<10.1} {:<10}",
            truncate_str(&col.name, 23),
            col.column_type(),
            col.missing_ratio * 100.0,
            col.distinct_count
        );
    }
    println!();

    println!("ISSUES");
    println!("{}", "-".repeat(40));
    if report.issues.is_empty() {
        println!("  No data quality issues detected");
    } else {
        for issue in &report.issues {
            println!(
                "  - [{}] {} ({}): {}",
                issue.severity, issue.rule_id, issue.issue_type, issue.explanation
            );
        }
    }
    println!();

    println!("DECISION: {}", report.decision);
    println!("  {}", report.summary);
    println!();
}

/// Load a CSV file, retrying without quote handling if the first read fails.
fn load_csv(path: &str) -> Result<DataFrame> {
    match CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => {
            debug!("Standard loading failed: {}", e);
        }
    }

    CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
        .with_context(|| format!("Could not parse CSV file {}", path))
}

/// Extract the file stem from a path for report naming.
fn extract_file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("dataset")
        .to_string()
}

fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}
