//! Shared fixtures for unit tests.

use std::sync::Arc;

use meridian_core::daycounts::DayCount;
use meridian_core::{Currency, Date};
use meridian_curves::curve::{ConstantCurve, Curve, CurveMetadata, CurveName, ValueType};
use meridian_curves::index::IborIndex;
use meridian_curves::provider::ImmutableRatesProvider;

pub(crate) fn date(year: i32, month: u32, day: u32) -> Date {
    Date::from_ymd(year, month, day).unwrap()
}

/// Friday 14 June 2024.
pub(crate) fn valuation() -> Date {
    date(2024, 6, 14)
}

pub(crate) fn flat_curve(name: &str, rate: f64) -> Arc<dyn Curve> {
    let metadata =
        CurveMetadata::new(CurveName::new(name), ValueType::ZeroRate, DayCount::Act365Fixed);
    Arc::new(ConstantCurve::new(metadata, rate))
}

/// USD discounting and USD-LIBOR-3M forecasting on flat zero rate curves.
pub(crate) fn flat_zero_provider(discount_rate: f64, forward_rate: f64) -> ImmutableRatesProvider {
    ImmutableRatesProvider::builder(valuation())
        .discount_curve(Currency::USD, flat_curve("USD-Disc", discount_rate))
        .ibor_index_curve(IborIndex::usd_libor_3m(), flat_curve("USD-3M", forward_rate))
        .build()
}

/// USD discounting and USD-LIBOR-3M forecasting on one flat discount factor
/// curve.
pub(crate) fn flat_df_provider(discount_factor: f64) -> ImmutableRatesProvider {
    let metadata = CurveMetadata::new(
        CurveName::new("USD-Flat"),
        ValueType::DiscountFactor,
        DayCount::Act365Fixed,
    );
    let curve: Arc<dyn Curve> = Arc::new(ConstantCurve::new(metadata, discount_factor));
    ImmutableRatesProvider::builder(valuation())
        .discount_curve(Currency::USD, curve.clone())
        .ibor_index_curve(IborIndex::usd_libor_3m(), curve)
        .build()
}
