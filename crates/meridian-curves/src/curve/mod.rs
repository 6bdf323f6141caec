//! Parameterized curves.
//!
//! A [`Curve`] maps a year fraction to a y value determined by a vector of
//! parameters. Besides the value, every curve reports how that value moves
//! with each parameter, which is the first link of the sensitivity chain:
//! point sensitivity → parameter sensitivity → market quote sensitivity.

mod constant;
mod metadata;
mod nodal;

pub use constant::ConstantCurve;
pub use metadata::{
    CurveMetadata, CurveName, CurveParameterSize, JacobianCalibrationMatrix, ParameterMetadata,
    ValueType,
};
pub use nodal::InterpolatedNodalCurve;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use meridian_core::Currency;
use meridian_market::{MarketDataId, MarketDataKey};

use crate::error::CurveResult;
use crate::sensitivity::CurrencyParameterSensitivity;

/// A curve defined by a vector of parameters.
pub trait Curve: fmt::Debug + Send + Sync {
    /// Returns the curve metadata.
    fn metadata(&self) -> &CurveMetadata;

    /// Returns the curve name.
    fn name(&self) -> &CurveName {
        self.metadata().curve_name()
    }

    /// Returns the number of parameters.
    fn parameter_count(&self) -> usize;

    /// Returns the parameter at an index.
    fn parameter(&self, index: usize) -> CurveResult<f64>;

    /// Returns a copy of the curve with one parameter changed.
    fn with_parameter(&self, index: usize, value: f64) -> CurveResult<Arc<dyn Curve>>;

    /// Returns a copy of the curve with different metadata.
    fn with_metadata(&self, metadata: CurveMetadata) -> Arc<dyn Curve>;

    /// Returns the y value at x.
    fn y_value(&self, x: f64) -> f64;

    /// Returns the sensitivity of the y value at x to each parameter.
    fn y_value_parameter_sensitivity(&self, x: f64) -> Vec<f64>;

    /// Returns the first derivative of the y value with respect to x.
    fn first_derivative(&self, x: f64) -> f64;

    /// Wraps per-parameter values as a sensitivity to this curve.
    fn create_parameter_sensitivity(
        &self,
        currency: Currency,
        sensitivity: Vec<f64>,
    ) -> CurrencyParameterSensitivity {
        CurrencyParameterSensitivity::new(
            self.name().clone(),
            self.metadata()
                .parameter_metadata_or_default(self.parameter_count()),
            currency,
            sensitivity,
        )
    }
}

/// Identifies a curve in market data: the curve group and the curve name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CurveId {
    group: String,
    curve: CurveName,
}

impl CurveId {
    /// Key category of curves.
    pub const CATEGORY: &'static str = "Curve";

    /// Creates a curve id.
    #[must_use]
    pub fn new(group: impl Into<String>, curve: CurveName) -> Self {
        Self {
            group: group.into(),
            curve,
        }
    }

    /// Returns the curve group name.
    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Returns the curve name.
    #[must_use]
    pub fn curve_name(&self) -> &CurveName {
        &self.curve
    }
}

impl MarketDataId for CurveId {
    type Value = Arc<dyn Curve>;

    fn key(&self) -> MarketDataKey {
        MarketDataKey::new(Self::CATEGORY, format!("{}/{}", self.group, self.curve))
    }
}

impl fmt::Display for CurveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.group, self.curve)
    }
}
