//! Error types for products, pricers and calibration.

use meridian_core::MeridianError;
use meridian_curves::CurveError;
use meridian_market::MarketDataError;
use meridian_math::MathError;
use thiserror::Error;

/// A specialized Result type for pricing operations.
pub type PricerResult<T> = Result<T, PricerError>;

/// Errors that can occur while resolving products, pricing or calibrating.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PricerError {
    /// A product failed validation.
    #[error("invalid product: {reason}")]
    InvalidProduct {
        /// Description of the problem.
        reason: String,
    },

    /// An argument was invalid.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// Description of the problem.
        reason: String,
    },

    /// A calculation parameter the function needs was not supplied.
    #[error("missing calculation parameter: {name}")]
    MissingParameter {
        /// Name of the parameter type.
        name: String,
    },

    /// The lookup has no curve for a currency or index.
    #[error("no curve configured for {key}")]
    LookupNotConfigured {
        /// The currency or index without a curve.
        key: String,
    },

    /// Curve error.
    #[error(transparent)]
    Curve(#[from] CurveError),

    /// Market data error.
    #[error(transparent)]
    MarketData(#[from] MarketDataError),

    /// Math error.
    #[error(transparent)]
    Math(#[from] MathError),

    /// Error from core types.
    #[error(transparent)]
    Core(#[from] MeridianError),
}

impl PricerError {
    /// Creates an invalid product error.
    #[must_use]
    pub fn invalid_product(reason: impl Into<String>) -> Self {
        Self::InvalidProduct {
            reason: reason.into(),
        }
    }

    /// Creates an invalid argument error.
    #[must_use]
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Creates a missing parameter error.
    #[must_use]
    pub fn missing_parameter(name: impl Into<String>) -> Self {
        Self::MissingParameter { name: name.into() }
    }

    /// Creates a lookup error for a currency or index with no curve.
    #[must_use]
    pub fn lookup_not_configured(key: impl ToString) -> Self {
        Self::LookupNotConfigured {
            key: key.to_string(),
        }
    }
}
