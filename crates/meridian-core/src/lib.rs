//! # Meridian Core
//!
//! Core types shared by every Meridian crate.
//!
//! This crate provides the foundational building blocks used throughout Meridian:
//!
//! - **Types**: `Date`, `Currency`, `CurrencyPair`, `FxRate`
//! - **Amounts**: `CurrencyAmount` and `MultiCurrencyAmount`
//! - **FX**: the [`FxRateProvider`] lookup and the [`FxConvertible`] capability
//! - **Day Count Conventions**: year fractions for accrual and curve time
//!
//! ## Example
//!
//! ```rust
//! use meridian_core::prelude::*;
//!
//! let rate = FxRate::new(CurrencyPair::new(Currency::EUR, Currency::USD), 1.10).unwrap();
//! let eur = CurrencyAmount::new(Currency::EUR, 100.0);
//! let usd = eur.convert_to(Currency::USD, &rate).unwrap();
//! assert!((usd.amount() - 110.0).abs() < 1e-12);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::uninlined_format_args)]

pub mod daycounts;
pub mod error;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::daycounts::DayCount;
    pub use crate::error::{MeridianError, MeridianResult};
    pub use crate::types::{
        Currency, CurrencyAmount, CurrencyPair, Date, FxConvertible, FxRate, FxRateProvider,
        MultiCurrencyAmount,
    };
}

// Re-export commonly used types at crate root
pub use error::{MeridianError, MeridianResult};
pub use types::{Currency, CurrencyAmount, CurrencyPair, Date, MultiCurrencyAmount};
