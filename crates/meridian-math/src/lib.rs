//! # Meridian Math
//!
//! Numerical building blocks for curve construction and risk.
//!
//! This crate provides:
//!
//! - **Interpolation**: Linear and log-linear interpolators that also report
//!   the sensitivity of the interpolated value to each node value
//! - **Linear Algebra**: Row-vector products, inversion and vector splitting
//!   on top of `nalgebra`
//! - **Solvers**: A multi-dimensional Newton solver for joint calibration

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::similar_names)]
#![allow(clippy::uninlined_format_args)]

pub mod error;
pub mod interpolation;
pub mod linear_algebra;
pub mod solvers;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{MathError, MathResult};
    pub use crate::interpolation::{
        BoundInterpolator, Interpolator, InterpolatorKind, LinearInterpolator,
        LogLinearInterpolator,
    };
    pub use crate::linear_algebra::{invert, row_times_matrix, solve_linear_system, split_by_sizes};
    pub use crate::solvers::{newton_system, SolverConfig, SystemSolverResult};
}

pub use error::{MathError, MathResult};
