//! Error types for market data lookup and construction.

use thiserror::Error;

use crate::ids::MarketDataKey;
use meridian_core::Date;

/// A specialized Result type for market data operations.
pub type MarketDataResult<T> = Result<T, MarketDataError>;

/// Errors raised by market data containers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketDataError {
    /// No value is stored under the key.
    #[error("Market data not found for '{key}'")]
    NotFound {
        /// The missing key.
        key: MarketDataKey,
    },

    /// A value is stored under the key but has another type.
    #[error("Market data '{key}' is not of type {expected}")]
    TypeMismatch {
        /// The key looked up.
        key: MarketDataKey,
        /// Name of the requested type.
        expected: &'static str,
    },

    /// The same key is present in both sides of a combination.
    #[error("Market data '{key}' is present in both sets being combined")]
    ConflictingKey {
        /// The duplicated key.
        key: MarketDataKey,
    },

    /// A scenario box does not have the scenario count of the run.
    #[error("Market data '{key}' has {actual} scenarios, expected {expected}")]
    ScenarioCountMismatch {
        /// The offending key.
        key: String,
        /// Scenario count of the run.
        expected: usize,
        /// Scenario count of the box.
        actual: usize,
    },

    /// Combined market data sets have different valuation dates.
    #[error("Valuation dates differ: {first} and {second}")]
    ValuationDateMismatch {
        /// Valuation date of the first set.
        first: Date,
        /// Valuation date of the second set.
        second: Date,
    },

    /// A scenario index is outside the scenario range.
    #[error("Scenario index {index} out of range for {count} scenarios")]
    ScenarioIndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of scenarios.
        count: usize,
    },

    /// Invalid construction input.
    #[error("Invalid market data: {reason}")]
    Invalid {
        /// Description of the problem.
        reason: String,
    },
}

impl MarketDataError {
    /// Creates a not found error.
    #[must_use]
    pub fn not_found(key: MarketDataKey) -> Self {
        Self::NotFound { key }
    }

    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }
}
