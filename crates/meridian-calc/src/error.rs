//! Engine error types.
//!
//! These cover failures of the engine itself. Failures of a single cell are
//! reported as [`Failure`](crate::result::Failure) values in the results and
//! never stop a run.

use thiserror::Error;

use crate::config::ConfigError;

/// A specialized Result type for engine operations.
pub type CalcResult<T> = Result<T, CalcError>;

/// Engine error type.
#[derive(Debug, Error)]
pub enum CalcError {
    /// The executor could not be started.
    #[error("executor error: {reason}")]
    Executor {
        /// Why the executor failed.
        reason: String,
    },

    /// An argument was invalid.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// Description of the problem.
        reason: String,
    },

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl CalcError {
    /// Creates an executor error.
    #[must_use]
    pub fn executor(reason: impl Into<String>) -> Self {
        Self::Executor {
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
}
