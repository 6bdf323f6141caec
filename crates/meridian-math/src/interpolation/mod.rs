//! Interpolation methods for nodal curves.
//!
//! Every interpolator extrapolates flat beyond its first and last node and
//! reports, besides the value and its slope, the sensitivity of the
//! interpolated value to each node value. The latter is what lets a curve
//! turn a point sensitivity into a parameter sensitivity.
//!
//! # Available Methods
//!
//! - [`LinearInterpolator`]: Linear interpolation of the node values
//! - [`LogLinearInterpolator`]: Linear interpolation of the log of positive
//!   node values, typically discount factors
//!
//! [`InterpolatorKind`] is the serializable choice between them and
//! [`BoundInterpolator`] the built result.

mod linear;
mod log_linear;

pub use linear::LinearInterpolator;
pub use log_linear::LogLinearInterpolator;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{MathError, MathResult};

/// Trait for interpolation methods.
pub trait Interpolator: Send + Sync {
    /// Returns the interpolated value at x.
    fn interpolate(&self, x: f64) -> f64;

    /// Returns the first derivative with respect to x.
    fn first_derivative(&self, x: f64) -> f64;

    /// Returns the sensitivity of the interpolated value at x to each node value.
    ///
    /// The result has one entry per node.
    fn parameter_sensitivity(&self, x: f64) -> Vec<f64>;

    /// Returns the minimum x value in the data.
    fn min_x(&self) -> f64;

    /// Returns the maximum x value in the data.
    fn max_x(&self) -> f64;

    /// Checks if x is within the node range.
    fn in_range(&self, x: f64) -> bool {
        x >= self.min_x() && x <= self.max_x()
    }
}

/// The interpolation method of a nodal curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum InterpolatorKind {
    /// Linear interpolation.
    #[default]
    Linear,
    /// Log-linear interpolation.
    LogLinear,
}

impl InterpolatorKind {
    /// Builds an interpolator of this kind over the given nodes.
    pub fn bind(self, xs: Vec<f64>, ys: Vec<f64>) -> MathResult<BoundInterpolator> {
        match self {
            InterpolatorKind::Linear => {
                LinearInterpolator::new(xs, ys).map(BoundInterpolator::Linear)
            }
            InterpolatorKind::LogLinear => {
                LogLinearInterpolator::new(xs, ys).map(BoundInterpolator::LogLinear)
            }
        }
    }
}

impl fmt::Display for InterpolatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterpolatorKind::Linear => write!(f, "Linear"),
            InterpolatorKind::LogLinear => write!(f, "LogLinear"),
        }
    }
}

/// An interpolator bound to a set of nodes.
#[derive(Debug, Clone)]
pub enum BoundInterpolator {
    /// Linear interpolation.
    Linear(LinearInterpolator),
    /// Log-linear interpolation.
    LogLinear(LogLinearInterpolator),
}

impl BoundInterpolator {
    /// Returns the kind of interpolation.
    #[must_use]
    pub fn kind(&self) -> InterpolatorKind {
        match self {
            BoundInterpolator::Linear(_) => InterpolatorKind::Linear,
            BoundInterpolator::LogLinear(_) => InterpolatorKind::LogLinear,
        }
    }

    fn inner(&self) -> &dyn Interpolator {
        match self {
            BoundInterpolator::Linear(i) => i,
            BoundInterpolator::LogLinear(i) => i,
        }
    }
}

impl Interpolator for BoundInterpolator {
    fn interpolate(&self, x: f64) -> f64 {
        self.inner().interpolate(x)
    }

    fn first_derivative(&self, x: f64) -> f64 {
        self.inner().first_derivative(x)
    }

    fn parameter_sensitivity(&self, x: f64) -> Vec<f64> {
        self.inner().parameter_sensitivity(x)
    }

    fn min_x(&self) -> f64 {
        self.inner().min_x()
    }

    fn max_x(&self) -> f64 {
        self.inner().max_x()
    }
}

/// Where a query point falls relative to the nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Location {
    /// Left of the first node.
    Below,
    /// Right of the last node.
    Above,
    /// Between node `i` and `i + 1`, at weight `t` from node `i`.
    Within(usize, f64),
}

/// Checks the node vectors shared by all interpolators.
pub(crate) fn validate_nodes(xs: &[f64], ys: &[f64]) -> MathResult<()> {
    if xs.is_empty() {
        return Err(MathError::insufficient_data(1, 0));
    }
    if xs.len() != ys.len() {
        return Err(MathError::DimensionMismatch {
            rows1: xs.len(),
            cols1: 1,
            rows2: ys.len(),
            cols2: 1,
        });
    }
    if xs.iter().chain(ys).any(|v| !v.is_finite()) {
        return Err(MathError::invalid_input("node values must be finite"));
    }
    if xs.windows(2).any(|w| w[1] <= w[0]) {
        return Err(MathError::invalid_input(
            "x values must be strictly increasing",
        ));
    }
    Ok(())
}

/// Locates x among sorted nodes.
pub(crate) fn locate(xs: &[f64], x: f64) -> Location {
    let n = xs.len();
    if n == 1 || x < xs[0] {
        return if x < xs[0] { Location::Below } else { Location::Above };
    }
    if x > xs[n - 1] {
        return Location::Above;
    }
    let i = xs.partition_point(|probe| *probe <= x).saturating_sub(1).min(n - 2);
    let t = (x - xs[i]) / (xs[i + 1] - xs[i]);
    Location::Within(i, t)
}
