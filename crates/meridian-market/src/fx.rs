//! FX rate providers backed by market data.

use meridian_core::error::{MeridianError, MeridianResult};
use meridian_core::types::{Currency, CurrencyPair, FxRateProvider};

use crate::ids::FxRateId;
use crate::market_data::{MarketData, MarketDataExt};
use crate::scenario::ScenarioMarketData;

/// Resolves FX rates from [`FxRateId`] values in market data.
///
/// A rate is found from the pair itself, from the inverse pair, or by
/// triangulating both legs through the triangulation currency.
#[derive(Debug, Clone, Copy)]
pub struct MarketDataFxRateProvider<'a, M: MarketData + ?Sized> {
    market_data: &'a M,
    triangulation: Currency,
}

impl<'a, M: MarketData + ?Sized> MarketDataFxRateProvider<'a, M> {
    /// Creates a provider triangulating through USD.
    #[must_use]
    pub fn new(market_data: &'a M) -> Self {
        Self {
            market_data,
            triangulation: Currency::USD,
        }
    }

    /// Sets the triangulation currency.
    #[must_use]
    pub fn with_triangulation(mut self, currency: Currency) -> Self {
        self.triangulation = currency;
        self
    }

    fn direct_rate(&self, base: Currency, counter: Currency) -> Option<f64> {
        let pair = CurrencyPair::new(base, counter);
        if let Some(rate) = self.market_data.find_value(&FxRateId::new(pair)) {
            return rate.fx_rate(base, counter).ok();
        }
        self.market_data
            .find_value(&FxRateId::new(pair.inverse()))
            .and_then(|rate| rate.fx_rate(base, counter).ok())
    }
}

impl<M: MarketData + ?Sized> FxRateProvider for MarketDataFxRateProvider<'_, M> {
    fn fx_rate(&self, base: Currency, counter: Currency) -> MeridianResult<f64> {
        if base == counter {
            return Ok(1.0);
        }
        if let Some(rate) = self.direct_rate(base, counter) {
            return Ok(rate);
        }
        let via = self.triangulation;
        if via != base && via != counter {
            if let (Some(first), Some(second)) =
                (self.direct_rate(base, via), self.direct_rate(via, counter))
            {
                return Ok(first * second);
            }
        }
        Err(MeridianError::fx_rate_not_found(base, counter))
    }
}

/// FX rates that may differ per scenario.
pub trait ScenarioFxRateProvider: Send + Sync {
    /// Returns the number of scenarios.
    fn scenario_count(&self) -> usize;

    /// Returns the rate converting one unit of `base` into `counter` in a scenario.
    fn fx_rate(&self, base: Currency, counter: Currency, scenario: usize) -> MeridianResult<f64>;
}

/// The FX rates of one scenario of a [`ScenarioFxRateProvider`].
#[derive(Clone, Copy)]
pub struct ScenarioFxRates<'a> {
    provider: &'a dyn ScenarioFxRateProvider,
    scenario: usize,
}

impl<'a> ScenarioFxRates<'a> {
    /// Selects one scenario of a provider.
    #[must_use]
    pub fn new(provider: &'a dyn ScenarioFxRateProvider, scenario: usize) -> Self {
        Self { provider, scenario }
    }
}

impl FxRateProvider for ScenarioFxRates<'_> {
    fn fx_rate(&self, base: Currency, counter: Currency) -> MeridianResult<f64> {
        self.provider.fx_rate(base, counter, self.scenario)
    }
}

/// Scenario FX rates read from [`ScenarioMarketData`].
#[derive(Debug, Clone, Copy)]
pub struct ScenarioMarketDataFxRateProvider<'a> {
    market_data: &'a ScenarioMarketData,
    triangulation: Currency,
}

impl<'a> ScenarioMarketDataFxRateProvider<'a> {
    /// Creates a provider triangulating through USD.
    #[must_use]
    pub fn new(market_data: &'a ScenarioMarketData) -> Self {
        Self {
            market_data,
            triangulation: Currency::USD,
        }
    }

    /// Sets the triangulation currency.
    #[must_use]
    pub fn with_triangulation(mut self, currency: Currency) -> Self {
        self.triangulation = currency;
        self
    }
}

impl ScenarioFxRateProvider for ScenarioMarketDataFxRateProvider<'_> {
    fn scenario_count(&self) -> usize {
        self.market_data.scenario_count()
    }

    fn fx_rate(&self, base: Currency, counter: Currency, scenario: usize) -> MeridianResult<f64> {
        let view = self
            .market_data
            .scenario(scenario)
            .map_err(|e| MeridianError::invalid_argument(e.to_string()))?;
        MarketDataFxRateProvider::new(&view)
            .with_triangulation(self.triangulation)
            .fx_rate(base, counter)
    }
}
