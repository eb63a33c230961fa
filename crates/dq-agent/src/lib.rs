//! Rule-Based Data Quality Assessment
//!
//! A data quality agent built with Rust and Polars. It profiles a tabular
//! dataset, checks the facts against a documented rule set and produces a
//! single ACCEPT / WARNING / REJECT decision with an explanation for every
//! issue found.
//!
//! # Overview
//!
//! - **Profiling**: per-column missing ratios, value type inference,
//!   descriptive statistics, IQR outliers, date validity and categories
//! - **Rules**: a serializable rule set (`DQ-01` .. `DQ-10` by default),
//!   loaded from JSON or built in code
//! - **Decisions**: a deterministic rule engine followed by an aggregator
//! - **Reporting**: canonical JSON reports, optionally exported to disk
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use dq_agent::{AssessmentPipeline, RuleSet};
//! use polars::prelude::*;
//!
//! let df = CsvReadOptions::default()
//!     .try_into_reader_with_file_path(Some("data/customers.csv".into()))?
//!     .finish()?;
//!
//! let pipeline = AssessmentPipeline::builder()
//!     .rules(RuleSet::from_path("rules/quality_rules.json")?)
//!     .build()?;
//!
//! let assessment = pipeline.assess_dataframe(&df)?;
//! println!("{}: {}", assessment.report.decision, assessment.report.summary);
//! for issue in &assessment.report.issues {
//!     println!("[{}] {}", issue.rule_id, issue.explanation);
//! }
//! ```
//!
//! # Configuration
//!
//! Use [`ProfilerConfig`] to tune how columns are profiled:
//!
//! ```rust,ignore
//! use dq_agent::ProfilerConfig;
//!
//! let config = ProfilerConfig::builder()
//!     .identifier_pattern(r"(?i)^customer_ref$")
//!     .min_outlier_sample(10)
//!     .iqr_multiplier(3.0)
//!     .build()?;
//! ```
//!
//! # Custom Assessors
//!
//! The verdict is produced behind the [`QualityAssessor`] trait. The
//! [`RuleBasedAssessor`] is used unless another implementation is passed
//! to [`AssessmentPipelineBuilder::assessor`].

pub mod config;
pub mod dataset;
pub mod decisions;
pub mod error;
pub mod pipeline;
pub mod profiler;
pub mod reporting;
pub mod rules;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use config::{ConfigValidationError, ProfilerConfig, ProfilerConfigBuilder};
pub use dataset::{Cell, Column, Dataset};
pub use decisions::{QualityAssessor, RuleBasedAssessor, RuleEngine, aggregate};
pub use error::{ProfilingError, QualityError, Result as QualityResult, ResultExt, RuleDefinitionError};
pub use pipeline::{Assessment, AssessmentPipeline, AssessmentPipelineBuilder};
pub use profiler::DataProfiler;
pub use reporting::{ReportExporter, report_to_json};
pub use rules::{
    AggregateRelation, ColumnPattern, ColumnScope, Comparison, RuleCheck, RuleDefinition, RuleId,
    RuleSet,
};
pub use types::{
    ColumnFacts, ColumnProfile, ColumnType, ColumnTypeHints, DatasetProfile, Decision, Issue,
    MeasuredValue, NumericStats, OutlierBounds, Report, ReportStats, Severity,
};
