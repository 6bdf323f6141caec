//! # Meridian Market
//!
//! Market data lookup for single and multi-scenario calculations.
//!
//! - **Identifiers**: [`MarketDataId`] is a typed key whose associated
//!   `Value` is the type stored under it; [`MarketDataKey`] is its untyped
//!   form used in requirement sets
//! - **Lookup**: the object-safe [`MarketData`] trait and the typed
//!   [`MarketDataExt`] accessors available on every implementation
//! - **Containers**: [`ImmutableMarketData`] for one scenario and
//!   [`ScenarioMarketData`] holding a [`MarketDataBox`] per key
//! - **FX**: [`MarketDataFxRateProvider`] resolving direct, inverse and
//!   triangulated rates, and [`ScenarioFxRateProvider`] per scenario
//!
//! ## Example
//!
//! ```rust
//! use meridian_core::Date;
//! use meridian_market::prelude::*;
//!
//! let date = Date::from_ymd(2024, 6, 14).unwrap();
//! let quote = QuoteId::new("USD-DEP-3M");
//! let data = ImmutableMarketData::builder(date)
//!     .add_value(&quote, 0.0525)
//!     .build();
//!
//! assert_eq!(data.get_value(&quote).unwrap(), 0.0525);
//! assert!(data.find_value(&QuoteId::new("USD-DEP-6M")).is_none());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::uninlined_format_args)]

pub mod error;
pub mod fx;
pub mod ids;
pub mod immutable;
pub mod market_data;
pub mod scenario;
pub mod time_series;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{MarketDataError, MarketDataResult};
    pub use crate::fx::{
        MarketDataFxRateProvider, ScenarioFxRateProvider, ScenarioFxRates,
        ScenarioMarketDataFxRateProvider,
    };
    pub use crate::ids::{FxRateId, MarketDataId, MarketDataKey, QuoteId};
    pub use crate::immutable::{ImmutableMarketData, ImmutableMarketDataBuilder};
    pub use crate::market_data::{MarketData, MarketDataExt, MarketValue};
    pub use crate::scenario::{
        MarketDataBox, ScenarioMarketData, ScenarioMarketDataBuilder, ScenarioView,
    };
    pub use crate::time_series::{LocalDateDoubleTimeSeries, TimeSeriesId};
}

pub use error::{MarketDataError, MarketDataResult};
pub use fx::{MarketDataFxRateProvider, ScenarioFxRateProvider, ScenarioFxRates};
pub use ids::{FxRateId, MarketDataId, MarketDataKey, QuoteId};
pub use immutable::ImmutableMarketData;
pub use market_data::{MarketData, MarketDataExt};
pub use scenario::{MarketDataBox, ScenarioMarketData};
pub use time_series::{LocalDateDoubleTimeSeries, TimeSeriesId};
