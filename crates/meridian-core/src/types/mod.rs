//! Domain types shared across the calculation engine.
//!
//! - [`Date`]: Calendar date for financial calculations
//! - [`Currency`]: ISO currency codes
//! - [`CurrencyPair`] and [`FxRate`]: FX market conventions
//! - [`CurrencyAmount`] and [`MultiCurrencyAmount`]: monetary results
//! - [`FxRateProvider`] and [`FxConvertible`]: currency conversion

mod amount;
mod currency;
mod date;
mod fx;

pub use amount::{CurrencyAmount, MultiCurrencyAmount};
pub use currency::Currency;
pub use date::Date;
pub use fx::{CurrencyPair, FxConvertible, FxRate, FxRateProvider};
