//! Curve names, metadata and calibration Jacobians.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::fmt;

use meridian_core::daycounts::DayCount;
use meridian_core::Date;

use crate::error::{CurveError, CurveResult};

/// The name of a curve.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CurveName(String);

impl CurveName {
    /// Creates a curve name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurveName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CurveName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// What the x or y values of a curve represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    /// Year fraction from the valuation date, in the curve's day count.
    YearFraction,
    /// Continuously compounded zero rate.
    ZeroRate,
    /// Discount factor.
    DiscountFactor,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::YearFraction => "YearFraction",
            ValueType::ZeroRate => "ZeroRate",
            ValueType::DiscountFactor => "DiscountFactor",
        };
        write!(f, "{name}")
    }
}

/// Describes one curve parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterMetadata {
    /// Label, such as the node tenor.
    pub label: String,
    /// Node date, when the parameter is tied to one.
    pub date: Option<Date>,
    /// Node x value.
    pub x: f64,
}

impl ParameterMetadata {
    /// Creates metadata for a dated node.
    #[must_use]
    pub fn dated(label: impl Into<String>, date: Date, x: f64) -> Self {
        Self {
            label: label.into(),
            date: Some(date),
            x,
        }
    }

    /// Creates placeholder metadata for the parameter at an index.
    #[must_use]
    pub fn indexed(index: usize) -> Self {
        Self {
            label: format!("p{index}"),
            date: None,
            x: index as f64,
        }
    }
}

/// The number of parameters of a named curve.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurveParameterSize {
    /// Curve name.
    pub name: CurveName,
    /// Number of parameters.
    pub count: usize,
}

impl CurveParameterSize {
    /// Creates a parameter size.
    #[must_use]
    pub fn new(name: CurveName, count: usize) -> Self {
        Self { name, count }
    }
}

/// Sensitivity of one curve's parameters to the market quotes of its
/// calibration block.
///
/// Rows are the curve's parameters; columns are every quote of the block,
/// laid out curve by curve in [`JacobianCalibrationMatrix::order`].
#[derive(Debug, Clone, PartialEq)]
pub struct JacobianCalibrationMatrix {
    order: Vec<CurveParameterSize>,
    matrix: DMatrix<f64>,
}

impl JacobianCalibrationMatrix {
    /// Creates a Jacobian.
    ///
    /// # Errors
    ///
    /// Returns an error if the column count differs from the total
    /// parameter count of `order`.
    pub fn new(order: Vec<CurveParameterSize>, matrix: DMatrix<f64>) -> CurveResult<Self> {
        let total: usize = order.iter().map(|size| size.count).sum();
        if total != matrix.ncols() {
            return Err(CurveError::invalid_value(format!(
                "Jacobian has {} columns but its order describes {total} quotes",
                matrix.ncols()
            )));
        }
        Ok(Self { order, matrix })
    }

    /// Returns the curves of the calibration block, in column order.
    #[must_use]
    pub fn order(&self) -> &[CurveParameterSize] {
        &self.order
    }

    /// Returns the matrix.
    #[must_use]
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    /// Returns the total number of quotes (columns).
    #[must_use]
    pub fn total_parameter_count(&self) -> usize {
        self.matrix.ncols()
    }

    /// Returns the column counts per curve.
    #[must_use]
    pub fn sizes(&self) -> Vec<usize> {
        self.order.iter().map(|size| size.count).collect()
    }
}

/// Metadata describing a curve.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveMetadata {
    curve_name: CurveName,
    x_value_type: ValueType,
    y_value_type: ValueType,
    day_count: DayCount,
    parameter_metadata: Vec<ParameterMetadata>,
    jacobian: Option<JacobianCalibrationMatrix>,
}

impl CurveMetadata {
    /// Creates metadata for a curve in year fractions.
    #[must_use]
    pub fn new(curve_name: CurveName, y_value_type: ValueType, day_count: DayCount) -> Self {
        Self {
            curve_name,
            x_value_type: ValueType::YearFraction,
            y_value_type,
            day_count,
            parameter_metadata: Vec::new(),
            jacobian: None,
        }
    }

    /// Sets the parameter metadata.
    #[must_use]
    pub fn with_parameter_metadata(mut self, parameter_metadata: Vec<ParameterMetadata>) -> Self {
        self.parameter_metadata = parameter_metadata;
        self
    }

    /// Attaches a calibration Jacobian.
    #[must_use]
    pub fn with_jacobian(mut self, jacobian: JacobianCalibrationMatrix) -> Self {
        self.jacobian = Some(jacobian);
        self
    }

    /// Returns the curve name.
    #[must_use]
    pub fn curve_name(&self) -> &CurveName {
        &self.curve_name
    }

    /// Returns the x value type.
    #[must_use]
    pub fn x_value_type(&self) -> ValueType {
        self.x_value_type
    }

    /// Returns the y value type.
    #[must_use]
    pub fn y_value_type(&self) -> ValueType {
        self.y_value_type
    }

    /// Returns the day count used to measure time.
    #[must_use]
    pub fn day_count(&self) -> DayCount {
        self.day_count
    }

    /// Returns the parameter metadata, empty when not known.
    #[must_use]
    pub fn parameter_metadata(&self) -> &[ParameterMetadata] {
        &self.parameter_metadata
    }

    /// Returns the calibration Jacobian, if attached.
    #[must_use]
    pub fn jacobian(&self) -> Option<&JacobianCalibrationMatrix> {
        self.jacobian.as_ref()
    }

    /// Returns the metadata of `count` parameters, falling back to
    /// placeholders where none is recorded.
    #[must_use]
    pub fn parameter_metadata_or_default(&self, count: usize) -> Vec<ParameterMetadata> {
        if self.parameter_metadata.len() == count {
            self.parameter_metadata.clone()
        } else {
            (0..count).map(ParameterMetadata::indexed).collect()
        }
    }
}
