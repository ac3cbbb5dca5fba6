//! Error types for the cut optimizer.

use thiserror::Error;

/// Errors that can occur while optimizing a cut list.
///
/// Invalid line items and unplaceable cuts are not errors: the former are
/// skipped, the latter are reported in the result. Everything here aborts the
/// whole run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptimizerError {
    /// A unit string did not name a supported length unit.
    #[error("unknown length unit: {0:?}")]
    UnknownUnit(String),

    /// A cost unit string was neither per-foot nor per-meter.
    #[error("unknown cost unit: {0:?}")]
    UnknownCostUnit(String),

    /// Optimizer settings are out of range.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// An input number was NaN or infinite.
    #[error("{field} is not a finite number ({value})")]
    NonFinite {
        /// Which input carried the value.
        field: String,
        /// The offending value.
        value: f64,
    },

    /// The computed result failed its consistency check.
    #[error("numeric fault in result: {0}")]
    NumericFault(String),
}

impl OptimizerError {
    pub(crate) fn non_finite(field: impl Into<String>, value: f64) -> Self {
        Self::NonFinite {
            field: field.into(),
            value,
        }
    }
}

/// Result type for optimizer operations.
pub type Result<T> = std::result::Result<T, OptimizerError>;

/// Fail with [`OptimizerError::NonFinite`] unless `value` is finite.
pub(crate) fn ensure_finite(field: impl FnOnce() -> String, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(OptimizerError::non_finite(field(), value))
    }
}
