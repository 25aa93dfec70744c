//! Error types for test matrix planning.
//!
//! Configuration problems and input-data problems are kept apart so that a
//! caller (CLI, HTTP layer) can map them to different user-facing messages.

use thiserror::Error;

/// Invalid numeric configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A configuration field is NaN or infinite.
    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    /// Ambient pressure must be strictly positive (it is a divisor).
    #[error("ambient pressure must be positive, got {0}")]
    NonPositiveAmbient(f64),

    /// Rake accuracy must be strictly positive.
    #[error("rake accuracy must be positive, got {0}")]
    NonPositiveAccuracy(f64),

    /// Accuracy after applying the margin must be strictly positive.
    #[error("effective rake accuracy must be positive, got {0}")]
    NonPositiveEffectiveAccuracy(f64),

    /// `rake_min` must be strictly below `rake_max`.
    #[error("rake bounds are inverted: min {min} must be below max {max}")]
    InvertedRakeBounds { min: f64, max: f64 },

    /// A point lies too far outside the feasible rake range to ever be covered.
    #[error(
        "point {index} has swirl {swirl} deg, outside the reachable range \
         [{reach_min}, {reach_max}] deg for the configured rake bounds"
    )]
    UnreachableSwirl {
        index: usize,
        swirl: f64,
        reach_min: f64,
        reach_max: f64,
    },
}

/// Input data that does not match the expected point schema.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    /// One or more required columns are absent.
    #[error("missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// A required column holds non-numeric data.
    #[error("column {column} is not numeric (found {dtype})")]
    NonNumericColumn { column: String, dtype: String },

    /// A required field holds NaN or infinity.
    #[error("row {index}: {column} must be finite, got {value}")]
    NonFinite {
        index: usize,
        column: &'static str,
        value: f64,
    },
}

/// Any failure of the planning pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid input data: {0}")]
    Schema(#[from] SchemaError),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PlanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_message_lists_all() {
        let err = SchemaError::MissingColumns(vec!["RPM".into(), "Swirl".into()]);
        assert_eq!(err.to_string(), "missing columns: RPM, Swirl");
    }

    #[test]
    fn test_plan_error_wraps_config() {
        let err: PlanError = ConfigError::NonPositiveAmbient(0.0).into();
        assert!(matches!(err, PlanError::Config(ConfigError::NonPositiveAmbient(_))));
        assert!(err.to_string().starts_with("invalid configuration"));
    }
}
