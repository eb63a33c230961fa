//! Custom error types for the quality assessment pipeline.
//!
//! The core stages have narrow error types: profiling can only fail on a
//! structurally inconsistent dataset, and rule definitions are rejected by
//! the loader before they ever reach the rule engine. [`QualityError`]
//! wraps both together with the I/O and parsing failures of the
//! collaborators around the core.
//!
//! Errors are serializable so they can be reported alongside JSON output.

use crate::config::ConfigValidationError;
use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// Error raised by the profiler when the dataset itself is malformed.
///
/// Malformed individual cells never produce an error; they are folded into
/// the missing count or the relevant invalid ratio.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfilingError {
    /// Columns do not all have the same number of cells.
    #[error(
        "Column '{column}' has {actual} rows but the dataset has {expected} rows (columns must have equal length)"
    )]
    InconsistentColumnLengths {
        column: String,
        expected: usize,
        actual: usize,
    },
}

/// Error raised while loading or validating a rule set.
#[derive(Error, Debug)]
pub enum RuleDefinitionError {
    /// A rule is structurally invalid (missing id, bad threshold, empty scope, ...).
    #[error("Malformed rule '{rule_id}': {reason}")]
    MalformedRule { rule_id: String, reason: String },

    /// The rule document could not be parsed.
    #[error("Failed to parse rule document: {0}")]
    Parse(#[from] serde_json::Error),

    /// The rule document could not be read.
    #[error("Failed to read rule document: {0}")]
    Io(#[from] std::io::Error),
}

impl RuleDefinitionError {
    pub(crate) fn malformed(rule_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedRule {
            rule_id: rule_id.into(),
            reason: reason.into(),
        }
    }
}

/// The main error type for an assessment run.
#[derive(Error, Debug)]
pub enum QualityError {
    /// The dataset could not be profiled.
    #[error("Profiling failed: {0}")]
    Profiling(#[from] ProfilingError),

    /// The rule set is invalid.
    #[error("Invalid rule set: {0}")]
    RuleDefinition(#[from] RuleDefinitionError),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigValidationError),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<QualityError>,
    },
}

impl QualityError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        QualityError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get a stable error code for machine consumers.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Profiling(ProfilingError::InconsistentColumnLengths { .. }) => {
                "INCONSISTENT_COLUMN_LENGTHS"
            }
            Self::RuleDefinition(RuleDefinitionError::MalformedRule { .. }) => "MALFORMED_RULE",
            Self::RuleDefinition(RuleDefinitionError::Parse(_)) => "RULE_PARSE_ERROR",
            Self::RuleDefinition(RuleDefinitionError::Io(_)) => "RULE_IO_ERROR",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Whether the error is caused by the inputs (dataset, rules, config)
    /// rather than by the environment.
    pub fn is_input_error(&self) -> bool {
        match self {
            Self::Profiling(_) | Self::RuleDefinition(_) | Self::InvalidConfig(_) => true,
            Self::WithContext { source, .. } => source.is_input_error(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for QualityError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("QualityError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for assessment operations.
pub type Result<T> = std::result::Result<T, QualityError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| QualityError::Io(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| QualityError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ragged() -> ProfilingError {
        ProfilingError::InconsistentColumnLengths {
            column: "age".to_string(),
            expected: 3,
            actual: 2,
        }
    }

    #[test]
    fn test_error_code() {
        assert_eq!(
            QualityError::from(ragged()).error_code(),
            "INCONSISTENT_COLUMN_LENGTHS"
        );
        assert_eq!(
            QualityError::from(RuleDefinitionError::malformed("DQ-01", "empty scope")).error_code(),
            "MALFORMED_RULE"
        );
    }

    #[test]
    fn test_profiling_error_message_names_column() {
        let message = ragged().to_string();
        assert!(message.contains("'age'"));
        assert!(message.contains("2 rows"));
    }

    #[test]
    fn test_is_input_error() {
        assert!(QualityError::from(ragged()).is_input_error());
        let io = QualityError::Io(std::io::Error::other("disk"));
        assert!(!io.is_input_error());
        assert!(QualityError::from(ragged()).with_context("ctx").is_input_error());
    }

    #[test]
    fn test_error_serialization() {
        let error = QualityError::from(RuleDefinitionError::malformed("DQ-07", "no categories"));
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("MALFORMED_RULE"));
        assert!(json.contains("DQ-07"));
    }

    #[test]
    fn test_with_context() {
        let error = QualityError::from(ragged()).with_context("While profiling sample.csv");
        assert!(error.to_string().contains("While profiling sample.csv"));
        assert_eq!(error.error_code(), "INCONSISTENT_COLUMN_LENGTHS");
    }
}
