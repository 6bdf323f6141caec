//! The market data lookup interface.

use std::any::{type_name, Any};
use std::collections::BTreeSet;
use std::sync::{Arc, OnceLock};

use meridian_core::Date;

use crate::error::{MarketDataError, MarketDataResult};
use crate::ids::{MarketDataId, MarketDataKey};
use crate::time_series::{LocalDateDoubleTimeSeries, TimeSeriesId};

/// A type-erased market data value.
pub type MarketValue = Arc<dyn Any + Send + Sync>;

fn empty_series() -> &'static LocalDateDoubleTimeSeries {
    static EMPTY: OnceLock<LocalDateDoubleTimeSeries> = OnceLock::new();
    EMPTY.get_or_init(LocalDateDoubleTimeSeries::empty)
}

/// Market data for a single scenario.
///
/// Values are stored untyped; use the [`MarketDataExt`] accessors for
/// typed lookups by [`MarketDataId`].
pub trait MarketData: Send + Sync {
    /// Returns the valuation date.
    fn valuation_date(&self) -> Date;

    /// Returns the raw value stored under a key.
    fn find_raw(&self, key: &MarketDataKey) -> Option<&MarketValue>;

    /// Returns the keys of all single values.
    fn identifiers(&self) -> BTreeSet<MarketDataKey>;

    /// Returns the time series with the id.
    fn find_time_series(&self, id: &TimeSeriesId) -> Option<&LocalDateDoubleTimeSeries>;

    /// Returns the ids of all time series.
    fn time_series_ids(&self) -> BTreeSet<TimeSeriesId>;
}

/// Typed accessors available on every [`MarketData`].
pub trait MarketDataExt: MarketData {
    /// Returns the value for the id, if present with the expected type.
    fn find_value<I: MarketDataId>(&self, id: &I) -> Option<I::Value> {
        self.find_raw(&id.key())
            .and_then(|value| value.downcast_ref::<I::Value>())
            .cloned()
    }

    /// Returns the value for the id.
    ///
    /// # Errors
    ///
    /// Returns `MarketDataError::NotFound` if no value is stored under the id,
    /// or `MarketDataError::TypeMismatch` if the stored value has another type.
    fn get_value<I: MarketDataId>(&self, id: &I) -> MarketDataResult<I::Value> {
        let key = id.key();
        let raw = self
            .find_raw(&key)
            .ok_or_else(|| MarketDataError::not_found(key.clone()))?;
        raw.downcast_ref::<I::Value>()
            .cloned()
            .ok_or(MarketDataError::TypeMismatch {
                key,
                expected: type_name::<I::Value>(),
            })
    }

    /// Checks if a value is stored under the id.
    fn contains_value<I: MarketDataId>(&self, id: &I) -> bool {
        self.find_raw(&id.key()).is_some()
    }

    /// Returns the time series with the id, empty if absent.
    fn time_series(&self, id: &TimeSeriesId) -> &LocalDateDoubleTimeSeries {
        self.find_time_series(id).unwrap_or_else(|| empty_series())
    }
}

impl<T: MarketData + ?Sized> MarketDataExt for T {}
