//! Discounting product pricers.
//!
//! Pricers hold no state and read everything from a
//! [`RatesProvider`](meridian_curves::provider::RatesProvider).
//! They are passed to the calculation functions explicitly.

mod fra;
mod fx_single;
mod term_deposit;

pub use fra::DiscountingFraProductPricer;
pub use fx_single::DiscountingFxSingleProductPricer;
pub use term_deposit::DiscountingTermDepositProductPricer;

/// The pricers used by the standard calculation functions.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pricers {
    /// FRA pricer.
    pub fra: DiscountingFraProductPricer,
    /// Term deposit pricer.
    pub term_deposit: DiscountingTermDepositProductPricer,
    /// FX exchange pricer.
    pub fx_single: DiscountingFxSingleProductPricer,
}
