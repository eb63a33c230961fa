//! Configuration types for the profiler.
//!
//! Rule thresholds live in the [`RuleSet`](crate::rules::RuleSet); this
//! module only covers how facts are extracted from raw cells. Use
//! [`ProfilerConfig::builder()`] for a fluent setup.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Default identifier name patterns (case-insensitive).
pub const DEFAULT_IDENTIFIER_PATTERNS: [&str; 3] = [
    r"(?i)^(id|uuid|guid)$",
    r"(?i)[_-](id|uuid|guid|key)$",
    r"(?i)^(id|uuid)[_-]",
];

/// Configuration for the [`DataProfiler`](crate::profiler::DataProfiler).
///
/// # Example
///
/// ```rust,ignore
/// use dq_agent::config::ProfilerConfig;
///
/// let config = ProfilerConfig::builder()
///     .type_success_ratio(0.9)
///     .identifier_pattern(r"(?i)^sku$")
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfilerConfig {
    /// Regexes matched against column names; a match makes the column an identifier.
    /// Default: [`DEFAULT_IDENTIFIER_PATTERNS`]
    pub identifier_patterns: Vec<String>,

    /// Share of non-missing values that must parse for a column to be
    /// inferred numeric or date (0.0 - 1.0).
    /// Default: 0.95
    pub type_success_ratio: f64,

    /// Relaxed parse share for columns whose name contains "date".
    /// Default: 0.5
    pub named_date_success_ratio: f64,

    /// Minimum number of numeric values before outliers are counted.
    /// Default: 4
    pub min_outlier_sample: usize,

    /// IQR multiplier for the outlier fences.
    /// Default: 1.5
    pub iqr_multiplier: f64,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            identifier_patterns: DEFAULT_IDENTIFIER_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            type_success_ratio: 0.95,
            named_date_success_ratio: 0.5,
            min_outlier_sample: 4,
            iqr_multiplier: 1.5,
        }
    }
}

impl ProfilerConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ProfilerConfigBuilder {
        ProfilerConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(0.0..=1.0).contains(&self.type_success_ratio) {
            return Err(ConfigValidationError::InvalidThreshold {
                field: "type_success_ratio".to_string(),
                value: self.type_success_ratio,
            });
        }

        if !(0.0..=1.0).contains(&self.named_date_success_ratio) {
            return Err(ConfigValidationError::InvalidThreshold {
                field: "named_date_success_ratio".to_string(),
                value: self.named_date_success_ratio,
            });
        }

        if self.min_outlier_sample < 4 {
            return Err(ConfigValidationError::InvalidMinSample(
                self.min_outlier_sample,
            ));
        }

        if !(self.iqr_multiplier.is_finite() && self.iqr_multiplier > 0.0) {
            return Err(ConfigValidationError::InvalidIqrMultiplier(
                self.iqr_multiplier,
            ));
        }

        self.compile_identifier_patterns().map(|_| ())
    }

    /// Compile the identifier patterns.
    pub(crate) fn compile_identifier_patterns(&self) -> Result<Vec<Regex>, ConfigValidationError> {
        self.identifier_patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigValidationError::InvalidPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect()
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid threshold for '{field}': {value} (must be between 0.0 and 1.0)")]
    InvalidThreshold { field: String, value: f64 },

    #[error("Invalid minimum outlier sample: {0} (quartiles need at least 4 values)")]
    InvalidMinSample(usize),

    #[error("Invalid IQR multiplier: {0} (must be a positive number)")]
    InvalidIqrMultiplier(f64),

    #[error("Invalid identifier pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Builder for [`ProfilerConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct ProfilerConfigBuilder {
    identifier_patterns: Option<Vec<String>>,
    type_success_ratio: Option<f64>,
    named_date_success_ratio: Option<f64>,
    min_outlier_sample: Option<usize>,
    iqr_multiplier: Option<f64>,
}

impl ProfilerConfigBuilder {
    /// Replace the identifier name patterns.
    pub fn identifier_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.identifier_patterns = Some(patterns.into_iter().map(Into::into).collect());
        self
    }

    /// Add one identifier pattern on top of the current (or default) list.
    pub fn identifier_pattern(mut self, pattern: impl Into<String>) -> Self {
        let patterns = self
            .identifier_patterns
            .get_or_insert_with(|| ProfilerConfig::default().identifier_patterns);
        patterns.push(pattern.into());
        self
    }

    /// Set the parse share required to infer numeric or date columns.
    ///
    /// # Arguments
    /// * `ratio` - Value between 0.0 and 1.0 (e.g., 0.95 = 95%)
    pub fn type_success_ratio(mut self, ratio: f64) -> Self {
        self.type_success_ratio = Some(ratio);
        self
    }

    /// Set the relaxed parse share for columns named like dates.
    pub fn named_date_success_ratio(mut self, ratio: f64) -> Self {
        self.named_date_success_ratio = Some(ratio);
        self
    }

    /// Set the minimum sample size for outlier detection.
    pub fn min_outlier_sample(mut self, n: usize) -> Self {
        self.min_outlier_sample = Some(n);
        self
    }

    /// Set the IQR fence multiplier.
    pub fn iqr_multiplier(mut self, k: f64) -> Self {
        self.iqr_multiplier = Some(k);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `ProfilerConfig` or an error if validation fails.
    pub fn build(self) -> Result<ProfilerConfig, ConfigValidationError> {
        let defaults = ProfilerConfig::default();
        let config = ProfilerConfig {
            identifier_patterns: self
                .identifier_patterns
                .unwrap_or(defaults.identifier_patterns),
            type_success_ratio: self
                .type_success_ratio
                .unwrap_or(defaults.type_success_ratio),
            named_date_success_ratio: self
                .named_date_success_ratio
                .unwrap_or(defaults.named_date_success_ratio),
            min_outlier_sample: self
                .min_outlier_sample
                .unwrap_or(defaults.min_outlier_sample),
            iqr_multiplier: self.iqr_multiplier.unwrap_or(defaults.iqr_multiplier),
        };

        config.validate()?;
        Ok(config)
    }
}
