//! Log-linear interpolation.
//!
//! Interpolates the logarithm of values, which keeps discount factors
//! positive and produces piecewise constant forward rates.

use super::{locate, validate_nodes, Interpolator, Location};
use crate::error::{MathError, MathResult};

/// Log-linear interpolation between data points, flat outside the nodes.
///
/// ```text
/// y(x) = exp(linear_interpolate(x, ln(y)))
/// ```
///
/// # Example
///
/// ```rust
/// use meridian_math::interpolation::{Interpolator, LogLinearInterpolator};
///
/// let times = vec![0.0, 1.0, 2.0, 3.0];
/// let discount_factors = vec![1.0, 0.97, 0.94, 0.91];
///
/// let interp = LogLinearInterpolator::new(times, discount_factors).unwrap();
/// let df = interp.interpolate(1.5);
/// assert!(df > 0.94 && df < 0.97);
/// ```
#[derive(Debug, Clone)]
pub struct LogLinearInterpolator {
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// Precomputed log(y) values
    log_ys: Vec<f64>,
}

impl LogLinearInterpolator {
    /// Creates a new log-linear interpolator.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - There are no points
    /// - Lengths differ or x values are not strictly increasing
    /// - Any y value is non-positive
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Self> {
        validate_nodes(&xs, &ys)?;
        if let Some(bad) = ys.iter().find(|y| **y <= 0.0) {
            return Err(MathError::invalid_input(format!(
                "log-linear interpolation requires positive values, got {bad}"
            )));
        }
        let log_ys = ys.iter().map(|y| y.ln()).collect();
        Ok(Self { xs, ys, log_ys })
    }

    fn log_slope(&self, i: usize) -> f64 {
        (self.log_ys[i + 1] - self.log_ys[i]) / (self.xs[i + 1] - self.xs[i])
    }
}

impl Interpolator for LogLinearInterpolator {
    fn interpolate(&self, x: f64) -> f64 {
        match locate(&self.xs, x) {
            Location::Below => self.ys[0],
            Location::Above => self.ys[self.ys.len() - 1],
            Location::Within(i, t) => {
                (self.log_ys[i] + t * (self.log_ys[i + 1] - self.log_ys[i])).exp()
            }
        }
    }

    fn first_derivative(&self, x: f64) -> f64 {
        match locate(&self.xs, x) {
            Location::Below | Location::Above => 0.0,
            Location::Within(i, _) => self.interpolate(x) * self.log_slope(i),
        }
    }

    fn parameter_sensitivity(&self, x: f64) -> Vec<f64> {
        let mut sens = vec![0.0; self.ys.len()];
        match locate(&self.xs, x) {
            Location::Below => sens[0] = 1.0,
            Location::Above => sens[self.ys.len() - 1] = 1.0,
            Location::Within(i, t) => {
                // dy/dy_j = y * w_j / y_j
                let y = self.interpolate(x);
                sens[i] = y * (1.0 - t) / self.ys[i];
                sens[i + 1] = y * t / self.ys[i + 1];
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

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_constant_forward_between_nodes() {
        let r: f64 = 0.04;
        let xs = vec![1.0, 2.0];
        let ys = vec![(-r).exp(), (-2.0 * r).exp()];
        let interp = LogLinearInterpolator::new(xs, ys).unwrap();

        for x in [1.1, 1.5, 1.9] {
            let y = interp.interpolate(x);
            assert_relative_eq!(y, (-r * x).exp(), epsilon = 1e-14);
            assert_relative_eq!(-interp.first_derivative(x) / y, r, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_rejects_non_positive() {
        assert!(LogLinearInterpolator::new(vec![1.0, 2.0], vec![1.0, 0.0]).is_err());
        assert!(LogLinearInterpolator::new(vec![1.0, 2.0], vec![1.0, -0.5]).is_err());
    }
}
