//! Root-finding for systems of equations.
//!
//! [`newton_system`] drives a vector of residuals to zero given their
//! Jacobian. Joint curve calibration uses it with an analytic Jacobian.
//!
//! # Example
//!
//! ```rust
//! use meridian_math::solvers::{newton_system, SolverConfig};
//! use meridian_math::MathError;
//! use nalgebra::{DMatrix, DVector};
//!
//! // x^2 = 4, x + y = 3
//! let system = |p: &[f64]| -> Result<_, MathError> {
//!     let residuals = DVector::from_vec(vec![p[0] * p[0] - 4.0, p[0] + p[1] - 3.0]);
//!     let jacobian = DMatrix::from_row_slice(2, 2, &[2.0 * p[0], 0.0, 1.0, 1.0]);
//!     Ok((residuals, jacobian))
//! };
//!
//! let result = newton_system(system, vec![1.0, 1.0], &SolverConfig::default()).unwrap();
//! assert!((result.solution[0] - 2.0).abs() < 1e-9);
//! assert!((result.solution[1] - 1.0).abs() < 1e-9);
//! ```

use log::debug;
use nalgebra::{DMatrix, DVector};

use crate::error::MathError;
use crate::linear_algebra::solve_linear_system;

/// Default tolerance for the residual norm.
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Default maximum iterations.
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Configuration for root-finding algorithms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Tolerance for convergence.
    pub tolerance: f64,
    /// Maximum number of iterations.
    pub max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl SolverConfig {
    /// Creates a new solver configuration.
    #[must_use]
    pub fn new(tolerance: f64, max_iterations: u32) -> Self {
        Self {
            tolerance,
            max_iterations,
        }
    }

    /// Sets the tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the maximum iterations.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// Result of a system solve.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemSolverResult {
    /// The solution vector.
    pub solution: Vec<f64>,
    /// Number of iterations used.
    pub iterations: u32,
    /// Maximum absolute residual at the solution.
    pub residual: f64,
}

/// Solves `f(p) = 0` for a square system with Newton's method.
///
/// The closure returns the residual vector and its Jacobian
/// (`jacobian[(i, j)] = ∂f_i/∂p_j`). Errors raised by the closure are
/// returned unchanged; solver failures are converted from [`MathError`].
pub fn newton_system<F, E>(
    mut f: F,
    initial_guess: Vec<f64>,
    config: &SolverConfig,
) -> Result<SystemSolverResult, E>
where
    F: FnMut(&[f64]) -> Result<(DVector<f64>, DMatrix<f64>), E>,
    E: From<MathError>,
{
    let mut p = initial_guess;
    let mut residual = f64::INFINITY;

    for iteration in 0..config.max_iterations {
        let (values, jacobian) = f(&p)?;
        residual = values.amax();
        debug!("newton iteration {iteration}: max residual {residual:.3e}");

        if residual < config.tolerance {
            return Ok(SystemSolverResult {
                solution: p,
                iterations: iteration,
                residual,
            });
        }

        let step = solve_linear_system(&jacobian, &values)?;
        for (pi, si) in p.iter_mut().zip(step.iter()) {
            *pi -= si;
        }
        if p.iter().any(|v| !v.is_finite()) {
            return Err(MathError::convergence_failed(iteration + 1, residual).into());
        }
    }

    Err(MathError::convergence_failed(config.max_iterations, residual).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_system_in_one_step() {
        let a = DMatrix::from_row_slice(2, 2, &[3.0, 1.0, 1.0, 2.0]);
        let b = DVector::from_vec(vec![9.0, 8.0]);
        let system = |p: &[f64]| -> Result<_, MathError> {
            let x = DVector::from_column_slice(p);
            Ok((&a * x - &b, a.clone()))
        };
        let result = newton_system(system, vec![0.0, 0.0], &SolverConfig::default()).unwrap();
        assert_relative_eq!(result.solution[0], 2.0, epsilon = 1e-12);
        assert_relative_eq!(result.solution[1], 3.0, epsilon = 1e-12);
        assert!(result.iterations <= 2);
    }

    #[test]
    fn test_no_root_fails() {
        // x^2 + 1 = 0 has no real root
        let system = |p: &[f64]| -> Result<_, MathError> {
            Ok((
                DVector::from_vec(vec![p[0] * p[0] + 1.0]),
                DMatrix::from_row_slice(1, 1, &[2.0 * p[0]]),
            ))
        };
        let config = SolverConfig::default().with_max_iterations(20);
        assert!(newton_system(system, vec![0.5], &config).is_err());
    }

    #[test]
    fn test_closure_error_propagates() {
        let system =
            |_: &[f64]| -> Result<(DVector<f64>, DMatrix<f64>), MathError> {
                Err(MathError::invalid_input("boom"))
            };
        let err = newton_system(system, vec![0.0], &SolverConfig::default()).unwrap_err();
        assert_eq!(err, MathError::invalid_input("boom"));
    }
}
