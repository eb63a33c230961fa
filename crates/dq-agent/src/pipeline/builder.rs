//! Assessment pipeline and its builder.

use crate::config::{ConfigValidationError, ProfilerConfig};
use crate::dataset::Dataset;
use crate::decisions::{QualityAssessor, RuleBasedAssessor};
use crate::error::Result;
use crate::profiler::DataProfiler;
use crate::rules::RuleSet;
use crate::types::{DatasetProfile, Report};
use polars::prelude::DataFrame;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Outcome of one assessment run.
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub profile: DatasetProfile,
    pub report: Report,
}

/// Profile a dataset, then assess it against a rule set.
///
/// Use [`AssessmentPipeline::builder()`] to create a pipeline.
///
/// # Example
///
/// ```rust,ignore
/// use dq_agent::{AssessmentPipeline, RuleSet};
///
/// let pipeline = AssessmentPipeline::builder()
///     .rules(RuleSet::from_path("rules/quality_rules.json")?)
///     .build()?;
///
/// let assessment = pipeline.assess(&dataset)?;
/// println!("{}", assessment.report.decision);
/// ```
pub struct AssessmentPipeline {
    profiler: DataProfiler,
    rules: RuleSet,
    assessor: Arc<dyn QualityAssessor>,
}

static_assertions::assert_impl_all!(AssessmentPipeline: Send, Sync);

impl AssessmentPipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> AssessmentPipelineBuilder {
        AssessmentPipelineBuilder::default()
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn assessor_name(&self) -> &str {
        self.assessor.name()
    }

    /// Run profiling and assessment on a dataset.
    ///
    /// The rule set's documented column types are passed to the profiler as
    /// hints. Fails only when the dataset is structurally inconsistent.
    pub fn assess(&self, dataset: &Dataset) -> Result<Assessment> {
        let start_time = Instant::now();
        info!(
            "Starting assessment with the {} assessor and {} rules",
            self.assessor.name(),
            self.rules.len()
        );

        let hints = self.rules.column_type_hints();
        debug!("Using {} column type hints", hints.len());

        let profile = self.profiler.profile(dataset, Some(&hints))?;
        let report = self.assessor.assess(&profile, &self.rules);

        info!(
            "Assessment completed in {} ms: {}",
            start_time.elapsed().as_millis(),
            report.decision
        );

        Ok(Assessment { profile, report })
    }

    /// Convert a DataFrame and assess it.
    pub fn assess_dataframe(&self, df: &DataFrame) -> Result<Assessment> {
        let dataset = Dataset::from_dataframe(df)?;
        self.assess(&dataset)
    }
}

/// Builder for [`AssessmentPipeline`].
#[derive(Default)]
pub struct AssessmentPipelineBuilder {
    profiler_config: Option<ProfilerConfig>,
    rules: Option<RuleSet>,
    assessor: Option<Arc<dyn QualityAssessor>>,
}

impl AssessmentPipelineBuilder {
    /// Set the profiler configuration.
    pub fn profiler_config(mut self, config: ProfilerConfig) -> Self {
        self.profiler_config = Some(config);
        self
    }

    /// Set the rule set. Defaults to [`RuleSet::standard()`].
    pub fn rules(mut self, rules: RuleSet) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Set the assessor. Defaults to [`RuleBasedAssessor`].
    pub fn assessor(mut self, assessor: Arc<dyn QualityAssessor>) -> Self {
        self.assessor = Some(assessor);
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the profiler configuration is invalid.
    pub fn build(self) -> std::result::Result<AssessmentPipeline, ConfigValidationError> {
        let profiler = DataProfiler::new(self.profiler_config.unwrap_or_default())?;

        Ok(AssessmentPipeline {
            profiler,
            rules: self.rules.unwrap_or_else(RuleSet::standard),
            assessor: self
                .assessor
                .unwrap_or_else(|| Arc::new(RuleBasedAssessor::new())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Column;
    use crate::error::QualityError;
    use crate::types::{Decision, ReportStats};

    struct AlwaysAccept;

    impl QualityAssessor for AlwaysAccept {
        fn name(&self) -> &str {
            "always-accept"
        }

        fn assess(&self, profile: &DatasetProfile, _rules: &RuleSet) -> Report {
            Report {
                decision: Decision::Accept,
                summary: "ok".to_string(),
                issues: Vec::new(),
                stats: ReportStats {
                    row_count: profile.row_count,
                    column_count: profile.column_count,
                    issues_count: 0,
                },
            }
        }
    }

    #[test]
    fn test_builder_defaults() {
        let pipeline = AssessmentPipeline::builder().build().unwrap();
        assert_eq!(pipeline.rules(), &RuleSet::standard());
        assert_eq!(pipeline.assessor_name(), "rule-based");
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let config = ProfilerConfig {
            min_outlier_sample: 1,
            ..ProfilerConfig::default()
        };
        assert!(
            AssessmentPipeline::builder()
                .profiler_config(config)
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_custom_assessor_is_used() {
        let pipeline = AssessmentPipeline::builder()
            .assessor(Arc::new(AlwaysAccept))
            .build()
            .unwrap();
        let dataset = Dataset::new(vec![Column::from_values("age", vec![-5i64, 20, 30])]);

        let assessment = pipeline.assess(&dataset).unwrap();
        assert_eq!(assessment.report.decision, Decision::Accept);
        assert_eq!(assessment.report.stats.row_count, 3);
    }

    #[test]
    fn test_hints_come_from_rules() {
        let pipeline = AssessmentPipeline::builder().build().unwrap();
        // "age" is documented numeric, so unparseable text folds into missing.
        let dataset = Dataset::new(vec![Column::from_values(
            "age",
            vec!["20", "thirty", "40", "50", "60"],
        )]);

        let assessment = pipeline.assess(&dataset).unwrap();
        let age = assessment.profile.column("age").unwrap();
        assert_eq!(age.missing_count, 1);
        assert_eq!(assessment.report.issues_for_rule("DQ-01").count(), 1);
    }

    #[test]
    fn test_ragged_dataset_fails() {
        let pipeline = AssessmentPipeline::builder().build().unwrap();
        let dataset = Dataset::new(vec![
            Column::from_values("a", vec![1i64, 2]),
            Column::from_values("b", vec![1i64]),
        ]);

        let err = pipeline.assess(&dataset).unwrap_err();
        assert!(matches!(err, QualityError::Profiling(_)));
        assert_eq!(err.error_code(), "INCONSISTENT_COLUMN_LENGTHS");
    }
}
