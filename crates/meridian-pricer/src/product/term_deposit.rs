//! Term deposits.

use serde::{Deserialize, Serialize};

use meridian_core::daycounts::DayCount;
use meridian_core::{Currency, Date};

use super::{BuySell, TradeInfo};
use crate::error::{PricerError, PricerResult};

/// A deposit of a notional from a start date to an end date at a fixed
/// rate, with simple interest paid at the end.
///
/// Buying pays the notional at the start and receives notional plus
/// interest at the end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermDeposit {
    buy_sell: BuySell,
    currency: Currency,
    notional: f64,
    start_date: Date,
    end_date: Date,
    day_count: DayCount,
    rate: f64,
}

impl TermDeposit {
    /// Creates a term deposit.
    ///
    /// # Errors
    ///
    /// Returns `PricerError::InvalidProduct` unless the start date is
    /// before the end date and the notional and rate are finite.
    pub fn new(
        buy_sell: BuySell,
        currency: Currency,
        notional: f64,
        start_date: Date,
        end_date: Date,
        day_count: DayCount,
        rate: f64,
    ) -> PricerResult<Self> {
        if start_date >= end_date {
            return Err(PricerError::invalid_product(format!(
                "term deposit start date {start_date} must be before end date {end_date}"
            )));
        }
        if !notional.is_finite() || !rate.is_finite() {
            return Err(PricerError::invalid_product(
                "term deposit notional and rate must be finite",
            ));
        }
        Ok(Self {
            buy_sell,
            currency,
            notional: notional.abs(),
            start_date,
            end_date,
            day_count,
            rate,
        })
    }

    /// Returns the direction.
    #[must_use]
    pub fn buy_sell(&self) -> BuySell {
        self.buy_sell
    }

    /// Returns the currency.
    #[must_use]
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns the unsigned notional.
    #[must_use]
    pub fn notional(&self) -> f64 {
        self.notional
    }

    /// Returns the start date.
    #[must_use]
    pub fn start_date(&self) -> Date {
        self.start_date
    }

    /// Returns the end date.
    #[must_use]
    pub fn end_date(&self) -> Date {
        self.end_date
    }

    /// Returns the accrual day count.
    #[must_use]
    pub fn day_count(&self) -> DayCount {
        self.day_count
    }

    /// Returns the deposit rate.
    #[must_use]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Resolves the deposit for pricing.
    #[must_use]
    pub fn resolve(&self) -> ResolvedTermDeposit {
        let year_fraction = self.day_count.year_fraction(self.start_date, self.end_date);
        let notional = self.buy_sell.normalize(self.notional);
        ResolvedTermDeposit {
            currency: self.currency,
            notional,
            start_date: self.start_date,
            end_date: self.end_date,
            year_fraction,
            rate: self.rate,
            interest: notional * self.rate * year_fraction,
        }
    }
}

/// A term deposit resolved for pricing.
///
/// The notional and interest are signed: positive when the deposit was
/// bought.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTermDeposit {
    currency: Currency,
    notional: f64,
    start_date: Date,
    end_date: Date,
    year_fraction: f64,
    rate: f64,
    interest: f64,
}

impl ResolvedTermDeposit {
    /// Returns the currency.
    #[must_use]
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns the signed notional.
    #[must_use]
    pub fn notional(&self) -> f64 {
        self.notional
    }

    /// Returns the start date.
    #[must_use]
    pub fn start_date(&self) -> Date {
        self.start_date
    }

    /// Returns the end date.
    #[must_use]
    pub fn end_date(&self) -> Date {
        self.end_date
    }

    /// Returns the accrual year fraction.
    #[must_use]
    pub fn year_fraction(&self) -> f64 {
        self.year_fraction
    }

    /// Returns the deposit rate.
    #[must_use]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Returns the signed interest paid at the end date.
    #[must_use]
    pub fn interest(&self) -> f64 {
        self.interest
    }
}

/// A trade in a term deposit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermDepositTrade {
    info: TradeInfo,
    product: TermDeposit,
}

impl TermDepositTrade {
    /// Creates a trade.
    #[must_use]
    pub fn new(info: TradeInfo, product: TermDeposit) -> Self {
        Self { info, product }
    }

    /// Returns the trade information.
    #[must_use]
    pub fn info(&self) -> &TradeInfo {
        &self.info
    }

    /// Returns the product.
    #[must_use]
    pub fn product(&self) -> &TermDeposit {
        &self.product
    }

    /// Resolves the product for pricing.
    #[must_use]
    pub fn resolve(&self) -> ResolvedTermDeposit {
        self.product.resolve()
    }
}
