//! Market data requirements of calculations.

use std::collections::BTreeSet;

use meridian_core::Currency;
use meridian_market::{MarketDataId, MarketDataKey, ScenarioMarketData, TimeSeriesId};

/// The market data a function needs for a target and set of measures,
/// and the currencies its outputs are expressed in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionRequirements {
    value_requirements: BTreeSet<MarketDataKey>,
    time_series_requirements: BTreeSet<TimeSeriesId>,
    output_currencies: BTreeSet<Currency>,
}

impl FunctionRequirements {
    /// Creates empty requirements.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a builder.
    #[must_use]
    pub fn builder() -> FunctionRequirementsBuilder {
        FunctionRequirementsBuilder::default()
    }

    /// Returns the single-value market data keys.
    #[must_use]
    pub fn value_requirements(&self) -> &BTreeSet<MarketDataKey> {
        &self.value_requirements
    }

    /// Returns the time series ids.
    #[must_use]
    pub fn time_series_requirements(&self) -> &BTreeSet<TimeSeriesId> {
        &self.time_series_requirements
    }

    /// Returns the currencies of the function outputs.
    #[must_use]
    pub fn output_currencies(&self) -> &BTreeSet<Currency> {
        &self.output_currencies
    }

    /// Returns the union of two sets of requirements.
    #[must_use]
    pub fn combined_with(&self, other: &FunctionRequirements) -> Self {
        Self {
            value_requirements: self
                .value_requirements
                .union(&other.value_requirements)
                .cloned()
                .collect(),
            time_series_requirements: self
                .time_series_requirements
                .union(&other.time_series_requirements)
                .cloned()
                .collect(),
            output_currencies: self
                .output_currencies
                .union(&other.output_currencies)
                .copied()
                .collect(),
        }
    }
}

/// Builder for [`FunctionRequirements`].
#[derive(Debug, Clone, Default)]
pub struct FunctionRequirementsBuilder {
    requirements: FunctionRequirements,
}

impl FunctionRequirementsBuilder {
    /// Adds a market data value.
    pub fn value<I: MarketDataId>(mut self, id: &I) -> Self {
        self.requirements.value_requirements.insert(id.key());
        self
    }

    /// Adds a market data value by key.
    pub fn value_key(mut self, key: MarketDataKey) -> Self {
        self.requirements.value_requirements.insert(key);
        self
    }

    /// Adds a time series.
    pub fn time_series(mut self, id: TimeSeriesId) -> Self {
        self.requirements.time_series_requirements.insert(id);
        self
    }

    /// Adds an output currency.
    pub fn output_currency(mut self, currency: Currency) -> Self {
        self.requirements.output_currencies.insert(currency);
        self
    }

    /// Adds several output currencies.
    pub fn output_currencies(mut self, currencies: impl IntoIterator<Item = Currency>) -> Self {
        self.requirements.output_currencies.extend(currencies);
        self
    }

    /// Builds the requirements.
    pub fn build(self) -> FunctionRequirements {
        self.requirements
    }
}

/// The market data needed by a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarketDataRequirements {
    values: BTreeSet<MarketDataKey>,
    time_series: BTreeSet<TimeSeriesId>,
}

impl MarketDataRequirements {
    /// Collects the market data of several function requirements.
    #[must_use]
    pub fn of<'a>(requirements: impl IntoIterator<Item = &'a FunctionRequirements>) -> Self {
        let mut result = Self::default();
        for req in requirements {
            result.values.extend(req.value_requirements.iter().cloned());
            result.time_series.extend(req.time_series_requirements.iter().cloned());
        }
        result
    }

    /// Returns the single-value keys.
    #[must_use]
    pub fn values(&self) -> &BTreeSet<MarketDataKey> {
        &self.values
    }

    /// Returns the time series ids.
    #[must_use]
    pub fn time_series(&self) -> &BTreeSet<TimeSeriesId> {
        &self.time_series
    }

    /// Checks if nothing is required.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.time_series.is_empty()
    }

    /// Returns the requirements not satisfied by the market data.
    #[must_use]
    pub fn missing_from(&self, market_data: &ScenarioMarketData) -> Self {
        Self {
            values: self
                .values
                .iter()
                .filter(|key| market_data.find_raw_box(key).is_none())
                .cloned()
                .collect(),
            time_series: self
                .time_series
                .iter()
                .filter(|id| market_data.find_time_series(id).is_none())
                .cloned()
                .collect(),
        }
    }
}
