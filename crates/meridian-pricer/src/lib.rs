//! # Meridian Pricer
//!
//! Products, discounting pricers, curve calibration and the calculation
//! functions that plug them into the Meridian calculation engine.
//!
//! - **Products**: [`Fra`](product::Fra), [`TermDeposit`](product::TermDeposit)
//!   and [`FxSingle`](product::FxSingle), each resolved into a form ready
//!   for pricing and wrapped in a trade
//! - **Pricers**: present value, par rate and point sensitivities from a
//!   [`RatesProvider`](meridian_curves::provider::RatesProvider)
//! - **Calibration**: [`CurveCalibrator`](calibration::CurveCalibrator)
//!   solves a curve group against market quotes and attaches the Jacobians
//!   market quote sensitivity needs
//! - **Functions**: calculation functions and
//!   [`standard_pricing_rules`](function::standard_pricing_rules), reading
//!   curves through a [`RatesMarketDataLookup`](lookup::RatesMarketDataLookup)
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use meridian_calc::prelude::*;
//! use meridian_core::{Currency, Date};
//! use meridian_curves::prelude::*;
//! use meridian_core::daycounts::DayCount;
//! use meridian_market::ScenarioMarketData;
//! use meridian_pricer::prelude::*;
//!
//! let valuation = Date::from_ymd(2024, 6, 14).unwrap();
//! let disc = CurveId::new("Default", CurveName::new("USD-Disc"));
//! let fwd = CurveId::new("Default", CurveName::new("USD-3M"));
//! let flat = |name: &str, rate: f64| -> Arc<dyn Curve> {
//!     let metadata =
//!         CurveMetadata::new(CurveName::new(name), ValueType::ZeroRate, DayCount::Act365Fixed);
//!     Arc::new(ConstantCurve::new(metadata, rate))
//! };
//! let market_data = ScenarioMarketData::builder(1, valuation)
//!     .add_value(&disc, flat("USD-Disc", 0.04))
//!     .add_value(&fwd, flat("USD-3M", 0.045))
//!     .build()
//!     .unwrap();
//!
//! let fra = Fra::new(
//!     BuySell::Buy,
//!     1_000_000.0,
//!     Date::from_ymd(2024, 9, 18).unwrap(),
//!     Date::from_ymd(2024, 12, 18).unwrap(),
//!     0.04,
//!     IborIndex::usd_libor_3m(),
//! )
//! .unwrap();
//! let targets: Vec<Arc<dyn CalculationTarget>> =
//!     vec![Arc::new(FraTrade::new(TradeInfo::empty(), fra))];
//!
//! let lookup =
//!     RatesMarketDataLookup::of([(Currency::USD, disc)], [(IborIndex::usd_libor_3m(), fwd)]);
//! let rules = CalculationRules::of(standard_pricing_rules(Pricers::default()))
//!     .with_parameters(CalculationParameters::empty().with(lookup));
//! let columns = [Column::of(Measure::PRESENT_VALUE), Column::of(Measure::PAR_RATE)];
//!
//! let results = CalculationRunner::single_threaded()
//!     .calculate(&rules, &targets, &columns, &market_data)
//!     .unwrap();
//! let pv = results.value::<CurrencyScenarioArray>(0, 0).unwrap();
//! assert!(pv.get(0).unwrap().amount() > 0.0);
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
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::uninlined_format_args)]

pub mod calibration;
pub mod error;
pub mod function;
pub mod lookup;
pub mod pricer;
pub mod product;

#[cfg(test)]
mod test_support;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::calibration::CurveCalibrator;
    pub use crate::error::{PricerError, PricerResult};
    pub use crate::function::{
        standard_pricing_rules, FraTradeCalculationFunction, FxSingleTradeCalculationFunction,
        TermDepositTradeCalculationFunction, DEFAULT_PV01_SHIFT, PV01_SHIFT_ARGUMENT,
    };
    pub use crate::lookup::RatesMarketDataLookup;
    pub use crate::pricer::{
        DiscountingFraProductPricer, DiscountingFxSingleProductPricer,
        DiscountingTermDepositProductPricer, Pricers,
    };
    pub use crate::product::{
        BuySell, Fra, FraDiscounting, FraTrade, FxSingle, FxSingleTrade, ResolvedFra,
        ResolvedFxSingle, ResolvedTermDeposit, TermDeposit, TermDepositTrade, TradeInfo,
    };
}

pub use error::{PricerError, PricerResult};
