//! Discount factors read from a curve.

use std::sync::Arc;

use meridian_core::{Currency, Date};

use crate::curve::{Curve, ValueType};
use crate::error::{CurveError, CurveResult};
use crate::sensitivity::{CurrencyParameterSensitivity, ZeroRateSensitivity};

/// Year fractions below this are treated as zero.
const EFFECTIVE_ZERO: f64 = 1e-10;

/// Discount factors for one currency, backed by a zero rate or discount
/// factor curve.
///
/// Zero rates are continuously compounded: `df = exp(-z·t)`.
#[derive(Debug, Clone)]
pub struct DiscountFactors {
    currency: Currency,
    valuation_date: Date,
    curve: Arc<dyn Curve>,
}

impl DiscountFactors {
    /// Creates discount factors from a curve.
    ///
    /// # Errors
    ///
    /// Returns `CurveError::UnsupportedCurveType` unless the curve's y values
    /// are zero rates or discount factors.
    pub fn new(
        currency: Currency,
        valuation_date: Date,
        curve: Arc<dyn Curve>,
    ) -> CurveResult<Self> {
        match curve.metadata().y_value_type() {
            ValueType::ZeroRate | ValueType::DiscountFactor => Ok(Self {
                currency,
                valuation_date,
                curve,
            }),
            other => Err(CurveError::UnsupportedCurveType {
                reason: format!(
                    "curve '{}' has y values of type {other}, expected ZeroRate or DiscountFactor",
                    curve.name()
                ),
            }),
        }
    }

    /// Returns the currency.
    #[must_use]
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns the valuation date.
    #[must_use]
    pub fn valuation_date(&self) -> Date {
        self.valuation_date
    }

    /// Returns the underlying curve.
    #[must_use]
    pub fn curve(&self) -> &Arc<dyn Curve> {
        &self.curve
    }

    /// Returns the curve time of a date.
    #[must_use]
    pub fn relative_year_fraction(&self, date: Date) -> f64 {
        self.curve
            .metadata()
            .day_count()
            .year_fraction(self.valuation_date, date)
    }

    /// Returns the discount factor at a date.
    #[must_use]
    pub fn discount_factor(&self, date: Date) -> f64 {
        self.discount_factor_at(self.relative_year_fraction(date))
    }

    /// Returns the discount factor at a year fraction.
    #[must_use]
    pub fn discount_factor_at(&self, t: f64) -> f64 {
        match self.curve.metadata().y_value_type() {
            ValueType::DiscountFactor => self.curve.y_value(t),
            _ => (-self.curve.y_value(t) * t).exp(),
        }
    }

    /// Returns the continuously compounded zero rate at a date.
    #[must_use]
    pub fn zero_rate(&self, date: Date) -> f64 {
        let t = self.relative_year_fraction(date);
        match self.curve.metadata().y_value_type() {
            ValueType::DiscountFactor => {
                let t = if t.abs() < EFFECTIVE_ZERO { EFFECTIVE_ZERO } else { t };
                -self.curve.y_value(t).ln() / t
            }
            _ => self.curve.y_value(t),
        }
    }

    /// Returns the sensitivity of the discount factor at a date to the zero
    /// rate at that date, expressed in `sensitivity_currency`.
    #[must_use]
    pub fn zero_rate_point_sensitivity(
        &self,
        date: Date,
        sensitivity_currency: Currency,
    ) -> ZeroRateSensitivity {
        let t = self.relative_year_fraction(date);
        let df = self.discount_factor_at(t);
        ZeroRateSensitivity::with_currency(self.currency, t, sensitivity_currency, -df * t)
    }

    /// Maps a zero rate sensitivity onto the curve parameters.
    #[must_use]
    pub fn parameter_sensitivity(
        &self,
        point: &ZeroRateSensitivity,
    ) -> CurrencyParameterSensitivity {
        let t = point.year_fraction();
        let unit = self.curve.y_value_parameter_sensitivity(t);
        let factor = match self.curve.metadata().y_value_type() {
            ValueType::DiscountFactor => {
                if t.abs() < EFFECTIVE_ZERO {
                    0.0
                } else {
                    // dz/dy for z = -ln(y)/t
                    -1.0 / (t * self.curve.y_value(t))
                }
            }
            _ => 1.0,
        };
        let values = unit
            .iter()
            .map(|u| u * factor * point.sensitivity())
            .collect();
        self.curve
            .create_parameter_sensitivity(point.currency(), values)
    }
}
