//! Curves with a single constant value.

use std::sync::Arc;

use super::{Curve, CurveMetadata};
use crate::error::{CurveError, CurveResult};

/// A curve with the same y value everywhere, and one parameter.
#[derive(Debug, Clone)]
pub struct ConstantCurve {
    metadata: CurveMetadata,
    y_value: f64,
}

impl ConstantCurve {
    /// Creates a constant curve.
    #[must_use]
    pub fn new(metadata: CurveMetadata, y_value: f64) -> Self {
        Self { metadata, y_value }
    }
}

impl Curve for ConstantCurve {
    fn metadata(&self) -> &CurveMetadata {
        &self.metadata
    }

    fn parameter_count(&self) -> usize {
        1
    }

    fn parameter(&self, index: usize) -> CurveResult<f64> {
        if index == 0 {
            Ok(self.y_value)
        } else {
            Err(CurveError::ParameterIndexOutOfRange { index, count: 1 })
        }
    }

    fn with_parameter(&self, index: usize, value: f64) -> CurveResult<Arc<dyn Curve>> {
        if index != 0 {
            return Err(CurveError::ParameterIndexOutOfRange { index, count: 1 });
        }
        Ok(Arc::new(Self::new(self.metadata.clone(), value)))
    }

    fn with_metadata(&self, metadata: CurveMetadata) -> Arc<dyn Curve> {
        Arc::new(Self::new(metadata, self.y_value))
    }

    fn y_value(&self, _x: f64) -> f64 {
        self.y_value
    }

    fn y_value_parameter_sensitivity(&self, _x: f64) -> Vec<f64> {
        vec![1.0]
    }

    fn first_derivative(&self, _x: f64) -> f64 {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{CurveName, ValueType};
    use meridian_core::daycounts::DayCount;

    #[test]
    fn test_constant() {
        let metadata = CurveMetadata::new(
            CurveName::new("Flat"),
            ValueType::DiscountFactor,
            DayCount::Act365Fixed,
        );
        let curve = ConstantCurve::new(metadata, 0.99);
        assert_eq!(curve.y_value(12.0), 0.99);
        assert_eq!(curve.y_value_parameter_sensitivity(3.0), vec![1.0]);
        assert_eq!(curve.with_parameter(0, 0.98).unwrap().y_value(1.0), 0.98);
        assert!(curve.parameter(1).is_err());
    }
}
