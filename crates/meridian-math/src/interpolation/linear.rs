//! Linear interpolation.

use super::{locate, validate_nodes, Interpolator, Location};
use crate::error::MathResult;

/// Linear interpolation between data points, flat outside the nodes.
///
/// # Example
///
/// ```rust
/// use meridian_math::interpolation::{Interpolator, LinearInterpolator};
///
/// let interp = LinearInterpolator::new(vec![1.0, 2.0], vec![0.01, 0.03]).unwrap();
/// assert!((interp.interpolate(1.5) - 0.02).abs() < 1e-15);
/// assert_eq!(interp.parameter_sensitivity(1.5), vec![0.5, 0.5]);
/// ```
#[derive(Debug, Clone)]
pub struct LinearInterpolator {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl LinearInterpolator {
    /// Creates a new linear interpolator.
    ///
    /// # Arguments
    ///
    /// * `xs` - X coordinates (strictly increasing)
    /// * `ys` - Y coordinates
    ///
    /// # Errors
    ///
    /// Returns an error if there are no points, if lengths differ or if the
    /// x values are not strictly increasing.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Self> {
        validate_nodes(&xs, &ys)?;
        Ok(Self { xs, ys })
    }

    /// Returns the node y values.
    #[must_use]
    pub fn ys(&self) -> &[f64] {
        &self.ys
    }
}

impl Interpolator for LinearInterpolator {
    fn interpolate(&self, x: f64) -> f64 {
        match locate(&self.xs, x) {
            Location::Below => self.ys[0],
            Location::Above => self.ys[self.ys.len() - 1],
            Location::Within(i, t) => self.ys[i] + t * (self.ys[i + 1] - self.ys[i]),
        }
    }

    fn first_derivative(&self, x: f64) -> f64 {
        match locate(&self.xs, x) {
            Location::Below | Location::Above => 0.0,
            Location::Within(i, _) => {
                (self.ys[i + 1] - self.ys[i]) / (self.xs[i + 1] - self.xs[i])
            }
        }
    }

    fn parameter_sensitivity(&self, x: f64) -> Vec<f64> {
        let mut sens = vec![0.0; self.ys.len()];
        match locate(&self.xs, x) {
            Location::Below => sens[0] = 1.0,
            Location::Above => sens[self.ys.len() - 1] = 1.0,
            Location::Within(i, t) => {
                sens[i] = 1.0 - t;
                sens[i + 1] = t;
            }
        }
        sens
    }

    fn min_x(&self) -> f64 {
        self.xs[0]
    }

    fn max_x(&self) -> f64 {
        self.xs[self.xs.len() - 1]
    }
}
