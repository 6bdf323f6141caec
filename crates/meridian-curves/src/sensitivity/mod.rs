//! The sensitivity chain.
//!
//! Pricers produce [`PointSensitivities`]; a rates provider maps them onto
//! curve parameters as [`CurrencyParameterSensitivities`]; the
//! [`MarketQuoteSensitivityCalculator`] then maps those onto the market
//! quotes the curves were calibrated to, using the calibration Jacobian.

mod gamma;
mod market_quote;
mod parameter;
mod point;

pub use gamma::CurveGammaCalculator;
pub use market_quote::MarketQuoteSensitivityCalculator;
pub use parameter::{CurrencyParameterSensitivities, CurrencyParameterSensitivity};
pub use point::{IborRateSensitivity, PointSensitivities, PointSensitivity, ZeroRateSensitivity};
