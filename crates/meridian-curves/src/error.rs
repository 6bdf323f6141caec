//! Error types for curve operations.
//!
//! Configuration errors (a missing curve, a missing Jacobian, a parameter
//! vector of the wrong length) are raised immediately by the operation that
//! detects them.

use meridian_core::{Currency, Date, MeridianError};
use meridian_market::MarketDataError;
use meridian_math::MathError;
use thiserror::Error;

/// A specialized Result type for curve operations.
pub type CurveResult<T> = Result<T, CurveError>;

/// Error types for curve operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CurveError {
    /// Curve not found in a rates provider.
    #[error("Curve not found: {name}")]
    CurveNotFound {
        /// Name of the missing curve.
        name: String,
    },

    /// A curve used for market quote sensitivity has no calibration Jacobian.
    #[error("Curve '{name}' has no calibration Jacobian; market quote sensitivity requires one")]
    MissingJacobian {
        /// Name of the curve.
        name: String,
    },

    /// A flat parameter vector does not match the curve definitions.
    #[error("Parameter count mismatch: curve definitions need {expected}, got {actual}")]
    ParameterCountMismatch {
        /// Total parameter count of the definitions.
        expected: usize,
        /// Length of the supplied vector.
        actual: usize,
    },

    /// Parameter index out of range.
    #[error("Parameter index {index} out of range for {count} parameters")]
    ParameterIndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of parameters.
        count: usize,
    },

    /// The curve's value type cannot be used for the requested purpose.
    #[error("Unsupported curve type: {reason}")]
    UnsupportedCurveType {
        /// Description of the unsupported combination.
        reason: String,
    },

    /// No discount curve for a currency.
    #[error("No discount curve for {currency}")]
    DiscountCurveNotFound {
        /// The currency requested.
        currency: Currency,
    },

    /// No forward curve for an index.
    #[error("No forward curve for index {index}")]
    IndexCurveNotFound {
        /// Name of the index.
        index: String,
    },

    /// A fixing in the past is not in the time series.
    #[error("Missing fixing for {index} on {date}")]
    MissingFixing {
        /// Name of the index.
        index: String,
        /// Fixing date.
        date: Date,
    },

    /// Invalid curve or group definition.
    #[error("Invalid definition: {reason}")]
    InvalidDefinition {
        /// Description of the problem.
        reason: String,
    },

    /// Invalid value (NaN, Inf, or mismatched shapes).
    #[error("Invalid value: {reason}")]
    InvalidValue {
        /// Description of why value is invalid.
        reason: String,
    },

    /// Curve calibration failed to converge.
    #[error(
        "Calibration failed after {iterations} iterations (residual: {residual:.2e}): {message}"
    )]
    CalibrationFailure {
        /// Number of iterations attempted.
        iterations: u32,
        /// Final residual value.
        residual: f64,
        /// Description of failure.
        message: String,
    },

    /// Mathematical error.
    #[error("Math error: {0}")]
    Math(#[from] MathError),

    /// Market data error.
    #[error("Market data error: {0}")]
    MarketData(#[from] MarketDataError),

    /// Error from core types.
    #[error(transparent)]
    Core(#[from] MeridianError),
}

impl CurveError {
    /// Creates a curve not found error.
    #[must_use]
    pub fn curve_not_found(name: impl Into<String>) -> Self {
        Self::CurveNotFound { name: name.into() }
    }

    /// Creates a missing Jacobian error.
    #[must_use]
    pub fn missing_jacobian(name: impl Into<String>) -> Self {
        Self::MissingJacobian { name: name.into() }
    }

    /// Creates an invalid definition error.
    #[must_use]
    pub fn invalid_definition(reason: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            reason: reason.into(),
        }
    }

    /// Creates an invalid value error.
    #[must_use]
    pub fn invalid_value(reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            reason: reason.into(),
        }
    }

    /// Creates a calibration failure error.
    #[must_use]
    pub fn calibration_failed(iterations: u32, residual: f64, message: impl Into<String>) -> Self {
        Self::CalibrationFailure {
            iterations,
            residual,
            message: message.into(),
        }
    }
}
