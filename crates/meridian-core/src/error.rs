//! Error types for the Meridian core types.

use thiserror::Error;

use crate::types::Currency;

/// A specialized Result type for core operations.
pub type MeridianResult<T> = Result<T, MeridianError>;

/// The main error type for core operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeridianError {
    /// Error in date calculations or invalid date.
    #[error("Invalid date: {message}")]
    InvalidDate {
        /// Description of the date error.
        message: String,
    },

    /// No FX rate is available for a currency pair.
    #[error("No FX rate found for {base}/{counter}")]
    FxRateNotFound {
        /// Base currency of the requested rate.
        base: Currency,
        /// Counter currency of the requested rate.
        counter: Currency,
    },

    /// Two amounts in different currencies were combined.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch {
        /// Expected currency.
        expected: Currency,
        /// Actual currency.
        got: Currency,
    },

    /// Unknown currency code.
    #[error("Unknown currency code: {code}")]
    UnknownCurrency {
        /// The code that failed to parse.
        code: String,
    },

    /// An argument failed validation.
    #[error("Invalid argument: {reason}")]
    InvalidArgument {
        /// Description of what's wrong.
        reason: String,
    },
}

impl MeridianError {
    /// Creates an invalid date error.
    #[must_use]
    pub fn invalid_date(message: impl Into<String>) -> Self {
        Self::InvalidDate {
            message: message.into(),
        }
    }

    /// Creates an FX rate not found error.
    #[must_use]
    pub fn fx_rate_not_found(base: Currency, counter: Currency) -> Self {
        Self::FxRateNotFound { base, counter }
    }

    /// Creates an invalid argument error.
    #[must_use]
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }
}
