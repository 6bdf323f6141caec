//! # Meridian Curves
//!
//! Curves, rates providers and the sensitivity chain used by the pricers.
//!
//! This crate provides:
//!
//! - **Curves**: the [`Curve`](curve::Curve) trait with interpolated nodal
//!   and constant implementations, plus metadata carrying the calibration
//!   [`JacobianCalibrationMatrix`](curve::JacobianCalibrationMatrix)
//! - **Rates**: [`DiscountFactors`](rates::DiscountFactors) and
//!   [`IborIndexRates`](rates::IborIndexRates) read from curves
//! - **Providers**: the [`RatesProvider`](provider::RatesProvider) trait,
//!   its immutable implementation and a generator building providers from a
//!   flat parameter vector
//! - **Sensitivities**: point, parameter and market quote sensitivities and
//!   bucketed gamma
//! - **Definitions**: nodal curve definitions and curve groups for
//!   calibration
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use meridian_core::{daycounts::DayCount, Currency, Date};
//! use meridian_curves::prelude::*;
//!
//! let date = Date::from_ymd(2024, 6, 14).unwrap();
//! let metadata =
//!     CurveMetadata::new(CurveName::new("USD-Disc"), ValueType::ZeroRate, DayCount::Act365Fixed);
//! let curve: Arc<dyn Curve> = Arc::new(ConstantCurve::new(metadata, 0.03));
//! let provider = ImmutableRatesProvider::builder(date)
//!     .discount_curve(Currency::USD, curve)
//!     .build();
//!
//! let df = provider.discount_factors(Currency::USD).unwrap();
//! assert!(df.discount_factor(date.add_days(365)) < 1.0);
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

pub mod curve;
pub mod definition;
pub mod error;
pub mod index;
pub mod provider;
pub mod rates;
pub mod sensitivity;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::curve::{
        ConstantCurve, Curve, CurveId, CurveMetadata, CurveName, CurveParameterSize,
        InterpolatedNodalCurve, JacobianCalibrationMatrix, ParameterMetadata, ValueType,
    };
    pub use crate::definition::{
        CurveGroupDefinition, CurveGroupEntry, CurveNode, CurveNodeKind, NodalCurveDefinition,
    };
    pub use crate::error::{CurveError, CurveResult};
    pub use crate::index::{IborIndex, IborIndexObservation};
    pub use crate::provider::{
        ImmutableRatesProvider, ImmutableRatesProviderBuilder, ImmutableRatesProviderGenerator,
        RatesProvider,
    };
    pub use crate::rates::{DiscountFactors, IborIndexRates};
    pub use crate::sensitivity::{
        CurrencyParameterSensitivities, CurrencyParameterSensitivity, CurveGammaCalculator,
        IborRateSensitivity, MarketQuoteSensitivityCalculator, PointSensitivities,
        PointSensitivity, ZeroRateSensitivity,
    };
}

pub use error::{CurveError, CurveResult};
