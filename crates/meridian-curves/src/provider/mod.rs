//! Rates providers: the curves, fixings and FX rates a pricer reads.

mod generator;

pub use generator::ImmutableRatesProviderGenerator;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use meridian_core::error::MeridianResult;
use meridian_core::types::{FxRate, FxRateProvider};
use meridian_core::{Currency, Date};
use meridian_market::{
    FxRateId, ImmutableMarketData, LocalDateDoubleTimeSeries, MarketDataFxRateProvider,
};

use crate::curve::{Curve, CurveName};
use crate::error::{CurveError, CurveResult};
use crate::index::IborIndex;
use crate::rates::{DiscountFactors, IborIndexRates};
use crate::sensitivity::{CurrencyParameterSensitivities, PointSensitivities, PointSensitivity};

/// Source of rates for pricing at one valuation date.
///
/// FX rates come from the [`FxRateProvider`] supertrait.
pub trait RatesProvider: FxRateProvider + fmt::Debug {
    /// Returns the valuation date.
    fn valuation_date(&self) -> Date;

    /// Returns the discount factors of a currency.
    fn discount_factors(&self, currency: Currency) -> CurveResult<DiscountFactors>;

    /// Returns the rates of an Ibor index.
    fn ibor_index_rates(&self, index: &IborIndex) -> CurveResult<IborIndexRates>;

    /// Finds a curve by name.
    fn find_curve(&self, name: &CurveName) -> Option<Arc<dyn Curve>>;

    /// Maps point sensitivities onto the parameters of the curves they
    /// depend on.
    fn parameter_sensitivity(
        &self,
        sensitivities: &PointSensitivities,
    ) -> CurveResult<CurrencyParameterSensitivities> {
        sensitivities
            .sensitivities()
            .iter()
            .try_fold(CurrencyParameterSensitivities::empty(), |acc, point| {
                let entry = match point {
                    PointSensitivity::ZeroRate(s) => self
                        .discount_factors(s.curve_currency())?
                        .parameter_sensitivity(s),
                    PointSensitivity::IborRate(s) => self
                        .ibor_index_rates(s.observation().index())?
                        .parameter_sensitivity(s),
                };
                acc.combined_with_entry(entry)
            })
    }
}

/// An immutable rates provider.
#[derive(Debug, Clone)]
pub struct ImmutableRatesProvider {
    valuation_date: Date,
    discount_curves: BTreeMap<Currency, Arc<dyn Curve>>,
    index_curves: BTreeMap<IborIndex, Arc<dyn Curve>>,
    time_series: BTreeMap<IborIndex, LocalDateDoubleTimeSeries>,
    fx_rates: ImmutableMarketData,
}

impl ImmutableRatesProvider {
    /// Creates a builder.
    #[must_use]
    pub fn builder(valuation_date: Date) -> ImmutableRatesProviderBuilder {
        ImmutableRatesProviderBuilder {
            provider: Self {
                valuation_date,
                discount_curves: BTreeMap::new(),
                index_curves: BTreeMap::new(),
                time_series: BTreeMap::new(),
                fx_rates: ImmutableMarketData::empty(valuation_date),
            },
        }
    }

    /// Returns a builder initialized with this provider's contents.
    #[must_use]
    pub fn to_builder(&self) -> ImmutableRatesProviderBuilder {
        ImmutableRatesProviderBuilder {
            provider: self.clone(),
        }
    }

    /// Returns the discount curves by currency.
    #[must_use]
    pub fn discount_curves(&self) -> &BTreeMap<Currency, Arc<dyn Curve>> {
        &self.discount_curves
    }

    /// Returns the forward curves by index.
    #[must_use]
    pub fn index_curves(&self) -> &BTreeMap<IborIndex, Arc<dyn Curve>> {
        &self.index_curves
    }

    /// Returns the fixings of an index, empty if none were supplied.
    #[must_use]
    pub fn time_series(&self, index: &IborIndex) -> LocalDateDoubleTimeSeries {
        self.time_series.get(index).cloned().unwrap_or_default()
    }
}

impl FxRateProvider for ImmutableRatesProvider {
    fn fx_rate(&self, base: Currency, counter: Currency) -> MeridianResult<f64> {
        MarketDataFxRateProvider::new(&self.fx_rates).fx_rate(base, counter)
    }
}

impl RatesProvider for ImmutableRatesProvider {
    fn valuation_date(&self) -> Date {
        self.valuation_date
    }

    fn discount_factors(&self, currency: Currency) -> CurveResult<DiscountFactors> {
        let curve = self
            .discount_curves
            .get(&currency)
            .ok_or(CurveError::DiscountCurveNotFound { currency })?;
        DiscountFactors::new(currency, self.valuation_date, curve.clone())
    }

    fn ibor_index_rates(&self, index: &IborIndex) -> CurveResult<IborIndexRates> {
        let curve = self
            .index_curves
            .get(index)
            .ok_or_else(|| CurveError::IndexCurveNotFound {
                index: index.name().to_string(),
            })?;
        let discount_factors =
            DiscountFactors::new(index.currency(), self.valuation_date, curve.clone())?;
        Ok(IborIndexRates::new(
            index.clone(),
            self.time_series(index),
            discount_factors,
        ))
    }

    fn find_curve(&self, name: &CurveName) -> Option<Arc<dyn Curve>> {
        self.discount_curves
            .values()
            .chain(self.index_curves.values())
            .find(|curve| curve.name() == name)
            .cloned()
    }
}

/// Builder for [`ImmutableRatesProvider`].
#[derive(Debug, Clone)]
pub struct ImmutableRatesProviderBuilder {
    provider: ImmutableRatesProvider,
}

impl ImmutableRatesProviderBuilder {
    /// Sets the discount curve of a currency, replacing any existing one.
    pub fn discount_curve(mut self, currency: Currency, curve: Arc<dyn Curve>) -> Self {
        self.provider.discount_curves.insert(currency, curve);
        self
    }

    /// Sets the forward curve of an index, replacing any existing one.
    pub fn ibor_index_curve(mut self, index: IborIndex, curve: Arc<dyn Curve>) -> Self {
        self.provider.index_curves.insert(index, curve);
        self
    }

    /// Sets the fixings of an index.
    pub fn time_series(mut self, index: IborIndex, series: LocalDateDoubleTimeSeries) -> Self {
        self.provider.time_series.insert(index, series);
        self
    }

    /// Adds an FX rate.
    pub fn fx_rate(mut self, rate: FxRate) -> Self {
        self.provider.fx_rates = self
            .provider
            .fx_rates
            .to_builder()
            .add_value(&FxRateId::new(rate.pair()), rate)
            .build();
        self
    }

    /// Builds the provider.
    pub fn build(self) -> ImmutableRatesProvider {
        self.provider
    }
}
