//! Quality decisions: rule evaluation and aggregation.
//!
//! [`QualityAssessor`] is the seam between a profile and a verdict. The
//! deterministic [`RuleBasedAssessor`] is the built-in implementation;
//! other assessors (for example one backed by a language model) plug in
//! behind the same trait.

mod aggregator;
mod rule_engine;

pub use aggregator::aggregate;
pub use rule_engine::RuleEngine;

use crate::rules::RuleSet;
use crate::types::{DatasetProfile, Report};

/// Trait for quality assessors.
///
/// Implementations turn profiling facts and a rule set into a report.
pub trait QualityAssessor: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Assess a profiled dataset against the rules.
    fn assess(&self, profile: &DatasetProfile, rules: &RuleSet) -> Report;
}

/// Deterministic assessor: rule engine followed by the decision aggregator.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedAssessor;

impl RuleBasedAssessor {
    pub fn new() -> Self {
        Self
    }
}

impl QualityAssessor for RuleBasedAssessor {
    fn name(&self) -> &str {
        "rule-based"
    }

    fn assess(&self, profile: &DatasetProfile, rules: &RuleSet) -> Report {
        let issues = RuleEngine::evaluate(profile, rules);
        aggregate(issues, profile)
    }
}
