//! Curves interpolated between nodes.

use std::sync::Arc;

use meridian_math::interpolation::{BoundInterpolator, Interpolator, InterpolatorKind};

use super::{Curve, CurveMetadata};
use crate::error::{CurveError, CurveResult};

/// A curve whose parameters are the y values at fixed x nodes.
///
/// # Example
///
/// ```rust
/// use meridian_core::daycounts::DayCount;
/// use meridian_curves::curve::{
///     Curve, CurveMetadata, CurveName, InterpolatedNodalCurve, ValueType,
/// };
/// use meridian_math::interpolation::InterpolatorKind;
///
/// let metadata =
///     CurveMetadata::new(CurveName::new("USD-Disc"), ValueType::ZeroRate, DayCount::Act365Fixed);
/// let curve = InterpolatedNodalCurve::new(
///     metadata,
///     vec![1.0, 2.0],
///     vec![0.02, 0.03],
///     InterpolatorKind::Linear,
/// )
/// .unwrap();
///
/// assert!((curve.y_value(1.5) - 0.025).abs() < 1e-15);
/// assert_eq!(curve.parameter_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct InterpolatedNodalCurve {
    metadata: CurveMetadata,
    x_values: Vec<f64>,
    y_values: Vec<f64>,
    interpolator: BoundInterpolator,
}

impl InterpolatedNodalCurve {
    /// Creates a nodal curve.
    ///
    /// # Errors
    ///
    /// Returns an error if the nodes are invalid for the interpolator, or if
    /// the metadata describes a different number of parameters.
    pub fn new(
        metadata: CurveMetadata,
        x_values: Vec<f64>,
        y_values: Vec<f64>,
        interpolator: InterpolatorKind,
    ) -> CurveResult<Self> {
        let described = metadata.parameter_metadata().len();
        if described != 0 && described != y_values.len() {
            return Err(CurveError::invalid_value(format!(
                "Curve '{}' has {} nodes but metadata for {described}",
                metadata.curve_name(),
                y_values.len()
            )));
        }
        let interpolator = interpolator.bind(x_values.clone(), y_values.clone())?;
        Ok(Self {
            metadata,
            x_values,
            y_values,
            interpolator,
        })
    }

    /// Returns the node x values.
    #[must_use]
    pub fn x_values(&self) -> &[f64] {
        &self.x_values
    }

    /// Returns the node y values.
    #[must_use]
    pub fn y_values(&self) -> &[f64] {
        &self.y_values
    }

    /// Returns the interpolation method.
    #[must_use]
    pub fn interpolator(&self) -> InterpolatorKind {
        self.interpolator.kind()
    }

    /// Returns a copy with all y values replaced.
    pub fn with_y_values(&self, y_values: Vec<f64>) -> CurveResult<Self> {
        Self::new(
            self.metadata.clone(),
            self.x_values.clone(),
            y_values,
            self.interpolator.kind(),
        )
    }
}

impl Curve for InterpolatedNodalCurve {
    fn metadata(&self) -> &CurveMetadata {
        &self.metadata
    }

    fn parameter_count(&self) -> usize {
        self.y_values.len()
    }

    fn parameter(&self, index: usize) -> CurveResult<f64> {
        self.y_values
            .get(index)
            .copied()
            .ok_or(CurveError::ParameterIndexOutOfRange {
                index,
                count: self.y_values.len(),
            })
    }

    fn with_parameter(&self, index: usize, value: f64) -> CurveResult<Arc<dyn Curve>> {
        let mut y_values = self.y_values.clone();
        let slot = y_values
            .get_mut(index)
            .ok_or(CurveError::ParameterIndexOutOfRange {
                index,
                count: self.y_values.len(),
            })?;
        *slot = value;
        Ok(Arc::new(self.with_y_values(y_values)?))
    }

    fn with_metadata(&self, metadata: CurveMetadata) -> Arc<dyn Curve> {
        Arc::new(Self {
            metadata,
            ..self.clone()
        })
    }

    fn y_value(&self, x: f64) -> f64 {
        self.interpolator.interpolate(x)
    }

    fn y_value_parameter_sensitivity(&self, x: f64) -> Vec<f64> {
        self.interpolator.parameter_sensitivity(x)
    }

    fn first_derivative(&self, x: f64) -> f64 {
        self.interpolator.first_derivative(x)
    }
}
