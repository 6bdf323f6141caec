//! Rates derived from curves: discount factors and Ibor index rates.

mod discount;
mod ibor;

pub use discount::DiscountFactors;
pub use ibor::IborIndexRates;
