//! Market data for multiple scenarios.
//!
//! Each value is held in a [`MarketDataBox`]: either one value shared by
//! every scenario, or one value per scenario. [`ScenarioMarketData::scenario`]
//! returns a [`MarketData`] view of a single scenario.

use std::any::type_name;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use meridian_core::Date;

use crate::error::{MarketDataError, MarketDataResult};
use crate::ids::{MarketDataId, MarketDataKey};
use crate::immutable::ImmutableMarketData;
use crate::market_data::{MarketData, MarketValue};
use crate::time_series::{LocalDateDoubleTimeSeries, TimeSeriesId};

/// A market data value for all scenarios of a run.
#[derive(Debug, Clone, PartialEq)]
pub enum MarketDataBox<T> {
    /// One value used by every scenario.
    Single(T),
    /// One value per scenario.
    Scenario(Vec<T>),
}

impl<T> MarketDataBox<T> {
    /// Returns the value for a scenario.
    ///
    /// A single value is returned for every index.
    #[must_use]
    pub fn value(&self, scenario: usize) -> Option<&T> {
        match self {
            MarketDataBox::Single(value) => Some(value),
            MarketDataBox::Scenario(values) => values.get(scenario),
        }
    }

    /// Checks if the box holds a single value.
    #[must_use]
    pub fn is_single(&self) -> bool {
        matches!(self, MarketDataBox::Single(_))
    }

    /// Returns the number of scenario values, `None` for a single value.
    #[must_use]
    pub fn scenario_count(&self) -> Option<usize> {
        match self {
            MarketDataBox::Single(_) => None,
            MarketDataBox::Scenario(values) => Some(values.len()),
        }
    }

    /// Returns the stored values.
    #[must_use]
    pub fn values(&self) -> &[T] {
        match self {
            MarketDataBox::Single(value) => std::slice::from_ref(value),
            MarketDataBox::Scenario(values) => values,
        }
    }

    /// Applies a function to every stored value.
    #[must_use]
    pub fn map<U>(&self, f: impl Fn(&T) -> U) -> MarketDataBox<U> {
        match self {
            MarketDataBox::Single(value) => MarketDataBox::Single(f(value)),
            MarketDataBox::Scenario(values) => {
                MarketDataBox::Scenario(values.iter().map(f).collect())
            }
        }
    }
}

/// Market data for a run of one or more scenarios.
#[derive(Clone)]
pub struct ScenarioMarketData {
    valuation_date: MarketDataBox<Date>,
    scenario_count: usize,
    values: HashMap<MarketDataKey, MarketDataBox<MarketValue>>,
    time_series: HashMap<TimeSeriesId, LocalDateDoubleTimeSeries>,
}

impl ScenarioMarketData {
    /// Starts building market data for a number of scenarios.
    #[must_use]
    pub fn builder(scenario_count: usize, valuation_date: Date) -> ScenarioMarketDataBuilder {
        ScenarioMarketDataBuilder {
            valuation_date: MarketDataBox::Single(valuation_date),
            scenario_count,
            values: HashMap::new(),
            time_series: HashMap::new(),
        }
    }

    /// Wraps single-scenario market data, sharing every value across
    /// `scenario_count` scenarios.
    pub fn of_market_data(
        market_data: ImmutableMarketData,
        scenario_count: usize,
    ) -> MarketDataResult<Self> {
        if scenario_count == 0 {
            return Err(MarketDataError::invalid("scenario count must be at least one"));
        }
        let (valuation_date, values, time_series) = market_data.into_parts();
        Ok(Self {
            valuation_date: MarketDataBox::Single(valuation_date),
            scenario_count,
            values: values
                .into_iter()
                .map(|(key, value)| (key, MarketDataBox::Single(value)))
                .collect(),
            time_series,
        })
    }

    /// Returns the number of scenarios.
    #[must_use]
    pub fn scenario_count(&self) -> usize {
        self.scenario_count
    }

    /// Returns the valuation dates.
    #[must_use]
    pub fn valuation_date(&self) -> &MarketDataBox<Date> {
        &self.valuation_date
    }

    /// Returns the keys of all values.
    #[must_use]
    pub fn identifiers(&self) -> BTreeSet<MarketDataKey> {
        self.values.keys().cloned().collect()
    }

    /// Returns the ids of all time series.
    #[must_use]
    pub fn time_series_ids(&self) -> BTreeSet<TimeSeriesId> {
        self.time_series.keys().cloned().collect()
    }

    /// Returns the time series with the id.
    #[must_use]
    pub fn find_time_series(&self, id: &TimeSeriesId) -> Option<&LocalDateDoubleTimeSeries> {
        self.time_series.get(id)
    }

    /// Returns the untyped box stored under a key.
    #[must_use]
    pub fn find_raw_box(&self, key: &MarketDataKey) -> Option<&MarketDataBox<MarketValue>> {
        self.values.get(key)
    }

    /// Checks if a value is stored under the id.
    #[must_use]
    pub fn contains_value<I: MarketDataId>(&self, id: &I) -> bool {
        self.values.contains_key(&id.key())
    }

    /// Returns the box for the id, if present with the expected type.
    #[must_use]
    pub fn find_box<I: MarketDataId>(&self, id: &I) -> Option<MarketDataBox<I::Value>> {
        self.get_box(id).ok()
    }

    /// Returns the box for the id.
    ///
    /// # Errors
    ///
    /// Returns `MarketDataError::NotFound` or `MarketDataError::TypeMismatch`.
    pub fn get_box<I: MarketDataId>(&self, id: &I) -> MarketDataResult<MarketDataBox<I::Value>> {
        let key = id.key();
        let raw = self
            .values
            .get(&key)
            .ok_or_else(|| MarketDataError::not_found(key.clone()))?;
        let typed = raw
            .values()
            .iter()
            .map(|value| value.downcast_ref::<I::Value>().cloned())
            .collect::<Option<Vec<_>>>()
            .ok_or(MarketDataError::TypeMismatch {
                key,
                expected: type_name::<I::Value>(),
            })?;
        Ok(match raw {
            MarketDataBox::Single(_) => {
                MarketDataBox::Single(typed.into_iter().next().ok_or_else(|| {
                    MarketDataError::invalid("single box without a value")
                })?)
            }
            MarketDataBox::Scenario(_) => MarketDataBox::Scenario(typed),
        })
    }

    /// Returns a view of one scenario.
    ///
    /// # Errors
    ///
    /// Returns `MarketDataError::ScenarioIndexOutOfRange` if the index is not
    /// below the scenario count.
    pub fn scenario(&self, scenario: usize) -> MarketDataResult<ScenarioView<'_>> {
        let out_of_range = MarketDataError::ScenarioIndexOutOfRange {
            index: scenario,
            count: self.scenario_count,
        };
        if scenario >= self.scenario_count {
            return Err(out_of_range);
        }
        let valuation_date = *self.valuation_date.value(scenario).ok_or(out_of_range)?;
        Ok(ScenarioView {
            data: self,
            scenario,
            valuation_date,
        })
    }

    /// Iterates over views of every scenario.
    pub fn scenarios(&self) -> impl Iterator<Item = ScenarioView<'_>> + '_ {
        (0..self.scenario_count).filter_map(move |i| self.scenario(i).ok())
    }

    /// Merges two sets of scenario market data.
    ///
    /// # Errors
    ///
    /// Returns an error if the scenario counts or valuation dates differ, or if
    /// a key or time series id is present in both.
    pub fn combined_with(&self, other: &ScenarioMarketData) -> MarketDataResult<Self> {
        if self.scenario_count != other.scenario_count {
            return Err(MarketDataError::ScenarioCountMismatch {
                key: "combined market data".to_string(),
                expected: self.scenario_count,
                actual: other.scenario_count,
            });
        }
        if self.valuation_date != other.valuation_date {
            let first = self.valuation_date.values()[0];
            let second = other.valuation_date.values()[0];
            return Err(MarketDataError::ValuationDateMismatch { first, second });
        }
        let mut combined = self.clone();
        for (key, value) in &other.values {
            if combined.values.insert(key.clone(), value.clone()).is_some() {
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
}

impl fmt::Debug for ScenarioMarketData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScenarioMarketData")
            .field("scenario_count", &self.scenario_count)
            .field("valuation_date", &self.valuation_date)
            .field("values", &self.identifiers())
            .field("time_series", &self.time_series_ids())
            .finish()
    }
}

/// Builder for [`ScenarioMarketData`].
pub struct ScenarioMarketDataBuilder {
    valuation_date: MarketDataBox<Date>,
    scenario_count: usize,
    values: HashMap<MarketDataKey, MarketDataBox<MarketValue>>,
    time_series: HashMap<TimeSeriesId, LocalDateDoubleTimeSeries>,
}

impl ScenarioMarketDataBuilder {
    /// Sets a valuation date per scenario.
    #[must_use]
    pub fn valuation_dates(mut self, dates: MarketDataBox<Date>) -> Self {
        self.valuation_date = dates;
        self
    }

    /// Adds a value shared by every scenario.
    #[must_use]
    pub fn add_value<I: MarketDataId>(self, id: &I, value: I::Value) -> Self {
        self.add_box(id, MarketDataBox::Single(value))
    }

    /// Adds one value per scenario.
    #[must_use]
    pub fn add_scenario_values<I: MarketDataId>(self, id: &I, values: Vec<I::Value>) -> Self {
        self.add_box(id, MarketDataBox::Scenario(values))
    }

    /// Adds a box of values.
    #[must_use]
    pub fn add_box<I: MarketDataId>(mut self, id: &I, value: MarketDataBox<I::Value>) -> Self {
        let erased = match value {
            MarketDataBox::Single(v) => MarketDataBox::Single(Arc::new(v) as MarketValue),
            MarketDataBox::Scenario(vs) => MarketDataBox::Scenario(
                vs.into_iter()
                    .map(|v| Arc::new(v) as MarketValue)
                    .collect(),
            ),
        };
        self.values.insert(id.key(), erased);
        self
    }

    /// Adds a time series shared by every scenario.
    #[must_use]
    pub fn add_time_series(mut self, id: TimeSeriesId, series: LocalDateDoubleTimeSeries) -> Self {
        self.time_series.insert(id, series);
        self
    }

    /// Builds the market data.
    ///
    /// # Errors
    ///
    /// Returns `MarketDataError::ScenarioCountMismatch` if any scenario box,
    /// including the valuation dates, does not hold exactly one value per
    /// scenario.
    pub fn build(self) -> MarketDataResult<ScenarioMarketData> {
        if self.scenario_count == 0 {
            return Err(MarketDataError::invalid("scenario count must be at least one"));
        }
        let check = |key: String, count: Option<usize>| match count {
            Some(actual) if actual != self.scenario_count => {
                Err(MarketDataError::ScenarioCountMismatch {
                    key,
                    expected: self.scenario_count,
                    actual,
                })
            }
            _ => Ok(()),
        };
        check("valuation date".to_string(), self.valuation_date.scenario_count())?;
        for (key, value) in &self.values {
            check(key.to_string(), value.scenario_count())?;
        }
        Ok(ScenarioMarketData {
            valuation_date: self.valuation_date,
            scenario_count: self.scenario_count,
            values: self.values,
            time_series: self.time_series,
        })
    }
}

/// A single-scenario view of [`ScenarioMarketData`].
#[derive(Clone, Copy)]
pub struct ScenarioView<'a> {
    data: &'a ScenarioMarketData,
    scenario: usize,
    valuation_date: Date,
}

impl ScenarioView<'_> {
    /// Returns the scenario index.
    #[must_use]
    pub fn scenario_index(&self) -> usize {
        self.scenario
    }
}

impl MarketData for ScenarioView<'_> {
    fn valuation_date(&self) -> Date {
        self.valuation_date
    }

    fn find_raw(&self, key: &MarketDataKey) -> Option<&MarketValue> {
        self.data
            .values
            .get(key)
            .and_then(|value| value.value(self.scenario))
    }

    fn identifiers(&self) -> BTreeSet<MarketDataKey> {
        self.data.identifiers()
    }

    fn find_time_series(&self, id: &TimeSeriesId) -> Option<&LocalDateDoubleTimeSeries> {
        self.data.time_series.get(id)
    }

    fn time_series_ids(&self) -> BTreeSet<TimeSeriesId> {
        self.data.time_series_ids()
    }
}

impl fmt::Debug for ScenarioView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScenarioView")
            .field("scenario", &self.scenario)
            .field("valuation_date", &self.valuation_date)
            .finish()
    }
}
