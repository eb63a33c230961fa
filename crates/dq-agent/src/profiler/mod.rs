//! Data profiling module.
//!
//! Turns raw columns into per-column facts:
//! - Type inference (identifier patterns, numeric, date, categorical)
//! - Missing and distinct counts
//! - Numeric statistics with IQR outlier detection
//! - Invalid date ratios and observed categories
//!
//! Profiling makes no judgement; thresholds live in the rule set.

mod statistics;
mod type_inference;

use crate::config::{ConfigValidationError, ProfilerConfig};
use crate::dataset::{Cell, Column, Dataset};
use crate::error::ProfilingError;
use crate::types::{ColumnFacts, ColumnProfile, ColumnType, ColumnTypeHints, DatasetProfile};
use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, info, warn};

use statistics::{compute_numeric_stats, count_outliers, outlier_bounds};
use type_inference::{date_value, infer_value_type, is_identifier_name, numeric_value};

/// Data profiler for extracting quality facts from a dataset.
#[derive(Debug, Clone)]
pub struct DataProfiler {
    config: ProfilerConfig,
    identifier_patterns: Vec<Regex>,
}

impl Default for DataProfiler {
    fn default() -> Self {
        let config = ProfilerConfig::default();
        let identifier_patterns = config
            .compile_identifier_patterns()
            .unwrap_or_default();
        Self {
            config,
            identifier_patterns,
        }
    }
}

impl DataProfiler {
    /// Create a profiler, validating the configuration.
    pub fn new(config: ProfilerConfig) -> Result<Self, ConfigValidationError> {
        config.validate()?;
        let identifier_patterns = config.compile_identifier_patterns()?;
        Ok(Self {
            config,
            identifier_patterns,
        })
    }

    pub fn config(&self) -> &ProfilerConfig {
        &self.config
    }

    /// Profile an entire dataset.
    ///
    /// Hints override type inference for the columns they name. Malformed
    /// cells never fail the run; only columns of unequal length do.
    pub fn profile(
        &self,
        dataset: &Dataset,
        hints: Option<&ColumnTypeHints>,
    ) -> Result<DatasetProfile, ProfilingError> {
        let row_count = dataset.row_count();

        if let Some(column) = dataset.columns().iter().find(|c| c.len() != row_count) {
            warn!(
                "Column '{}' has {} rows, expected {}",
                column.name,
                column.len(),
                row_count
            );
            return Err(ProfilingError::InconsistentColumnLengths {
                column: column.name.clone(),
                expected: row_count,
                actual: column.len(),
            });
        }

        info!(
            "Profiling dataset: {} rows, {} columns",
            row_count,
            dataset.column_count()
        );

        let columns: Vec<ColumnProfile> = dataset
            .columns()
            .iter()
            .map(|column| {
                let hint = hints.and_then(|h| h.get(&column.name)).copied();
                self.profile_column(column, row_count, hint)
            })
            .collect();

        info!("Profiling completed for {} columns", columns.len());

        Ok(DatasetProfile {
            row_count,
            column_count: dataset.column_count(),
            columns,
        })
    }

    fn profile_column(
        &self,
        column: &Column,
        row_count: usize,
        hint: Option<ColumnType>,
    ) -> ColumnProfile {
        let values: Vec<&Cell> = column.cells.iter().filter(|c| !c.is_missing()).collect();
        let value_count = values.len();
        let mut missing_count = row_count - value_count;

        let distinct_count = values
            .iter()
            .map(|cell| cell.to_string())
            .collect::<HashSet<_>>()
            .len();

        let value_type = infer_value_type(&column.name, &values, &self.config);
        let column_type = hint.unwrap_or_else(|| {
            if is_identifier_name(&column.name, &self.identifier_patterns) {
                ColumnType::Identifier
            } else {
                value_type
            }
        });

        let facts = match column_type {
            ColumnType::Numeric => {
                let parsed: Vec<f64> = values.iter().filter_map(|c| numeric_value(c)).collect();
                // Unparseable numerics are treated like missing cells.
                missing_count += value_count - parsed.len();
                self.numeric_facts(&parsed)
            }
            ColumnType::Date => {
                let invalid_count = values.iter().filter(|c| date_value(c).is_none()).count();
                let invalid_date_ratio = if value_count > 0 {
                    invalid_count as f64 / value_count as f64
                } else {
                    0.0
                };
                ColumnFacts::Date {
                    invalid_count,
                    invalid_date_ratio,
                }
            }
            ColumnType::Categorical => ColumnFacts::Categorical {
                observed_categories: values
                    .iter()
                    .map(|cell| cell.to_string())
                    .collect::<BTreeSet<_>>(),
            },
            ColumnType::Identifier => ColumnFacts::Identifier,
        };

        let missing_ratio = if row_count > 0 {
            missing_count as f64 / row_count as f64
        } else {
            0.0
        };

        debug!(
            "Column '{}': type={} (values look {}), missing={:.1}%, distinct={}",
            column.name,
            column_type,
            value_type,
            missing_ratio * 100.0,
            distinct_count
        );

        ColumnProfile {
            name: column.name.clone(),
            value_type,
            value_count,
            missing_count,
            missing_ratio,
            distinct_count,
            facts,
        }
    }

    fn numeric_facts(&self, parsed: &[f64]) -> ColumnFacts {
        let stats = compute_numeric_stats(parsed);
        let bounds = stats
            .as_ref()
            .map(|stats| outlier_bounds(stats, self.config.iqr_multiplier));

        let outlier_count = match &bounds {
            Some(bounds) if parsed.len() >= self.config.min_outlier_sample => {
                count_outliers(parsed, bounds)
            }
            _ => 0,
        };
        let outlier_ratio = if outlier_count > 0 {
            outlier_count as f64 / parsed.len() as f64
        } else {
            0.0
        };

        ColumnFacts::Numeric {
            stats,
            outlier_bounds: bounds,
            outlier_count,
            outlier_ratio,
            negative_count: parsed.iter().filter(|v| **v < 0.0).count(),
        }
    }
}
