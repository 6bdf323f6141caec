//! Ibor index rates: historic fixings and forward rates.

use meridian_core::Date;
use meridian_market::LocalDateDoubleTimeSeries;

use super::DiscountFactors;
use crate::error::{CurveError, CurveResult};
use crate::index::{IborIndex, IborIndexObservation};
use crate::sensitivity::{
    CurrencyParameterSensitivity, IborRateSensitivity, PointSensitivities, PointSensitivity,
    ZeroRateSensitivity,
};

/// Rates of one Ibor index.
///
/// Observations fixing before the valuation date read the fixing time
/// series; on the valuation date a fixing is used when present. Otherwise
/// the rate is the simple forward rate implied by the index curve:
///
/// ```text
/// F = (DF(start) / DF(end) - 1) / τ
/// ```
#[derive(Debug, Clone)]
pub struct IborIndexRates {
    index: IborIndex,
    fixings: LocalDateDoubleTimeSeries,
    discount_factors: DiscountFactors,
}

impl IborIndexRates {
    /// Creates the rates of an index from its forward curve.
    #[must_use]
    pub fn new(
        index: IborIndex,
        fixings: LocalDateDoubleTimeSeries,
        discount_factors: DiscountFactors,
    ) -> Self {
        Self {
            index,
            fixings,
            discount_factors,
        }
    }

    /// Returns the index.
    #[must_use]
    pub fn index(&self) -> &IborIndex {
        &self.index
    }

    /// Returns the valuation date.
    #[must_use]
    pub fn valuation_date(&self) -> Date {
        self.discount_factors.valuation_date()
    }

    /// Returns the fixings.
    #[must_use]
    pub fn fixings(&self) -> &LocalDateDoubleTimeSeries {
        &self.fixings
    }

    /// Returns the discount factors of the forward curve.
    #[must_use]
    pub fn discount_factors(&self) -> &DiscountFactors {
        &self.discount_factors
    }

    fn historic_rate(&self, observation: &IborIndexObservation) -> CurveResult<Option<f64>> {
        let fixing_date = observation.fixing_date();
        let valuation_date = self.valuation_date();
        if fixing_date < valuation_date {
            return self
                .fixings
                .get(fixing_date)
                .map(Some)
                .ok_or_else(|| CurveError::MissingFixing {
                    index: self.index.name().to_string(),
                    date: fixing_date,
                });
        }
        if fixing_date == valuation_date {
            return Ok(self.fixings.get(fixing_date));
        }
        Ok(None)
    }

    /// Returns the rate of an observation.
    ///
    /// # Errors
    ///
    /// Returns `CurveError::MissingFixing` if the observation fixed before the
    /// valuation date and the fixing is not in the time series.
    pub fn rate(&self, observation: &IborIndexObservation) -> CurveResult<f64> {
        match self.historic_rate(observation)? {
            Some(fixing) => Ok(fixing),
            None => Ok(self.forward_rate(observation)),
        }
    }

    /// Returns the forward rate of an observation, ignoring fixings.
    #[must_use]
    pub fn forward_rate(&self, observation: &IborIndexObservation) -> f64 {
        let df_start = self
            .discount_factors
            .discount_factor(observation.effective_date());
        let df_end = self
            .discount_factors
            .discount_factor(observation.maturity_date());
        (df_start / df_end - 1.0) / observation.year_fraction()
    }

    /// Returns the point sensitivity of the rate; empty once fixed.
    pub fn rate_point_sensitivity(
        &self,
        observation: &IborIndexObservation,
    ) -> CurveResult<PointSensitivities> {
        Ok(match self.historic_rate(observation)? {
            Some(_) => PointSensitivities::empty(),
            None => {
                PointSensitivity::from(IborRateSensitivity::new(observation.clone(), 1.0)).into()
            }
        })
    }

    /// Maps an Ibor rate sensitivity onto the forward curve parameters.
    #[must_use]
    pub fn parameter_sensitivity(
        &self,
        point: &IborRateSensitivity,
    ) -> CurrencyParameterSensitivity {
        let observation = point.observation();
        let dfs = &self.discount_factors;
        let start = dfs.zero_rate_point_sensitivity(observation.effective_date(), point.currency());
        let end = dfs.zero_rate_point_sensitivity(observation.maturity_date(), point.currency());
        let df_start = dfs.discount_factor(observation.effective_date());
        let df_end = dfs.discount_factor(observation.maturity_date());
        let tau = observation.year_fraction();

        // dF/dDF(start) and dF/dDF(end)
        let d_start = 1.0 / (tau * df_end);
        let d_end = -df_start / (tau * df_end * df_end);

        let scaled = |zero: &ZeroRateSensitivity, d: f64| {
            dfs.parameter_sensitivity(&zero.multiplied_by(d * point.sensitivity()))
        };
        let from_start = scaled(&start, d_start);
        let from_end = scaled(&end, d_end);
        let summed = from_start
            .sensitivity()
            .iter()
            .zip(from_end.sensitivity())
            .map(|(a, b)| a + b)
            .collect();
        dfs.curve().create_parameter_sensitivity(point.currency(), summed)
    }
}
