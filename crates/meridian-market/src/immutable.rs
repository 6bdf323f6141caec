//! Market data for a single scenario.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use meridian_core::Date;

use crate::error::{MarketDataError, MarketDataResult};
use crate::ids::{MarketDataId, MarketDataKey};
use crate::market_data::{MarketData, MarketValue};
use crate::time_series::{LocalDateDoubleTimeSeries, TimeSeriesId};

/// An immutable set of market data for one valuation date.
#[derive(Clone)]
pub struct ImmutableMarketData {
    valuation_date: Date,
    values: HashMap<MarketDataKey, MarketValue>,
    time_series: HashMap<TimeSeriesId, LocalDateDoubleTimeSeries>,
}

impl ImmutableMarketData {
    /// Starts building market data for a valuation date.
    #[must_use]
    pub fn builder(valuation_date: Date) -> ImmutableMarketDataBuilder {
        ImmutableMarketDataBuilder {
            valuation_date,
            values: HashMap::new(),
            time_series: HashMap::new(),
        }
    }

    /// Creates empty market data.
    #[must_use]
    pub fn empty(valuation_date: Date) -> Self {
        Self::builder(valuation_date).build()
    }

    /// Returns a builder pre-populated with this data.
    #[must_use]
    pub fn to_builder(&self) -> ImmutableMarketDataBuilder {
        ImmutableMarketDataBuilder {
            valuation_date: self.valuation_date,
            values: self.values.clone(),
            time_series: self.time_series.clone(),
        }
    }

    /// Returns the number of single values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Checks if no single value or time series is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.time_series.is_empty()
    }

    /// Merges two sets of market data.
    ///
    /// # Errors
    ///
    /// Returns `MarketDataError::ValuationDateMismatch` if the valuation dates
    /// differ and `MarketDataError::ConflictingKey` if a key or time series id
    /// is present in both.
    pub fn combined_with(&self, other: &ImmutableMarketData) -> MarketDataResult<Self> {
        if self.valuation_date != other.valuation_date {
            return Err(MarketDataError::ValuationDateMismatch {
                first: self.valuation_date,
                second: other.valuation_date,
            });
        }
        let mut combined = self.clone();
        for (key, value) in &other.values {
            if combined.values.insert(key.clone(), Arc::clone(value)).is_some() {
                return Err(MarketDataError::ConflictingKey { key: key.clone() });
            }
        }
        for (id, series) in &other.time_series {
            if combined.time_series.insert(id.clone(), series.clone()).is_some() {
                return Err(MarketDataError::ConflictingKey {
                    key: MarketDataKey::new("TimeSeries", id.as_str()),
                });
            }
        }
        Ok(combined)
    }

    pub(crate) fn into_parts(
        self,
    ) -> (
        Date,
        HashMap<MarketDataKey, MarketValue>,
        HashMap<TimeSeriesId, LocalDateDoubleTimeSeries>,
    ) {
        (self.valuation_date, self.values, self.time_series)
    }
}

impl MarketData for ImmutableMarketData {
    fn valuation_date(&self) -> Date {
        self.valuation_date
    }

    fn find_raw(&self, key: &MarketDataKey) -> Option<&MarketValue> {
        self.values.get(key)
    }

    fn identifiers(&self) -> BTreeSet<MarketDataKey> {
        self.values.keys().cloned().collect()
    }

    fn find_time_series(&self, id: &TimeSeriesId) -> Option<&LocalDateDoubleTimeSeries> {
        self.time_series.get(id)
    }

    fn time_series_ids(&self) -> BTreeSet<TimeSeriesId> {
        self.time_series.keys().cloned().collect()
    }
}

impl fmt::Debug for ImmutableMarketData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImmutableMarketData")
            .field("valuation_date", &self.valuation_date)
            .field("values", &self.identifiers())
            .field("time_series", &self.time_series_ids())
            .finish()
    }
}

/// Builder for [`ImmutableMarketData`].
pub struct ImmutableMarketDataBuilder {
    valuation_date: Date,
    values: HashMap<MarketDataKey, MarketValue>,
    time_series: HashMap<TimeSeriesId, LocalDateDoubleTimeSeries>,
}

impl ImmutableMarketDataBuilder {
    /// Adds a value, replacing any previous value for the id.
    #[must_use]
    pub fn add_value<I: MarketDataId>(mut self, id: &I, value: I::Value) -> Self {
        self.values.insert(id.key(), Arc::new(value));
        self
    }

    /// Adds a time series, replacing any previous series for the id.
    #[must_use]
    pub fn add_time_series(mut self, id: TimeSeriesId, series: LocalDateDoubleTimeSeries) -> Self {
        self.time_series.insert(id, series);
        self
    }

    /// Sets the valuation date.
    #[must_use]
    pub fn valuation_date(mut self, valuation_date: Date) -> Self {
        self.valuation_date = valuation_date;
        self
    }

    /// Builds the market data.
    #[must_use]
    pub fn build(self) -> ImmutableMarketData {
        ImmutableMarketData {
            valuation_date: self.valuation_date,
            values: self.values,
            time_series: self.time_series,
        }
    }
}
