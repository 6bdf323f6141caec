//! Forward rate agreements.

use serde::{Deserialize, Serialize};

use meridian_core::daycounts::DayCount;
use meridian_core::{Currency, Date};
use meridian_curves::index::{IborIndex, IborIndexObservation};

use super::{BuySell, TradeInfo};
use crate::error::{PricerError, PricerResult};

/// How a FRA settlement amount is discounted from the end of the period
/// back to the payment date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FraDiscounting {
    /// Discounted at the index rate, `1 / (1 + τF)`.
    #[default]
    Isda,
    /// Not discounted.
    None,
}

/// A forward rate agreement.
///
/// A FRA exchanges a fixed rate for an Ibor index fixing over a single
/// period, settled at the start of the period. Buying pays fixed and
/// receives the index rate.
///
/// # FRA Notation
///
/// FRAs are quoted as "A x B": the period starts A months and ends B months
/// after spot. A 3x6 FRA locks in the 3 month rate in 3 months' time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fra {
    buy_sell: BuySell,
    currency: Currency,
    notional: f64,
    start_date: Date,
    end_date: Date,
    payment_date: Option<Date>,
    fixed_rate: f64,
    index: IborIndex,
    day_count: DayCount,
    discounting: FraDiscounting,
}

impl Fra {
    /// Creates a FRA in the currency and day count of its index, with ISDA
    /// discounting and payment on the start date.
    ///
    /// # Errors
    ///
    /// Returns `PricerError::InvalidProduct` unless the start date is
    /// before the end date and the notional and rate are finite.
    pub fn new(
        buy_sell: BuySell,
        notional: f64,
        start_date: Date,
        end_date: Date,
        fixed_rate: f64,
        index: IborIndex,
    ) -> PricerResult<Self> {
        if start_date >= end_date {
            return Err(PricerError::invalid_product(format!(
                "FRA start date {start_date} must be before end date {end_date}"
            )));
        }
        if !notional.is_finite() || !fixed_rate.is_finite() {
            return Err(PricerError::invalid_product("FRA notional and fixed rate must be finite"));
        }
        Ok(Self {
            buy_sell,
            currency: index.currency(),
            notional: notional.abs(),
            start_date,
            end_date,
            payment_date: None,
            fixed_rate,
            day_count: index.day_count(),
            index,
            discounting: FraDiscounting::Isda,
        })
    }

    /// Creates an "A x B" FRA from the spot date implied by a trade date.
    pub fn of_months(
        buy_sell: BuySell,
        notional: f64,
        trade_date: Date,
        start_months: i32,
        end_months: i32,
        fixed_rate: f64,
        index: IborIndex,
    ) -> PricerResult<Self> {
        let spot = trade_date.add_business_days(index.fixing_offset_days());
        let start = spot.add_months(start_months)?;
        let end = spot.add_months(end_months)?;
        Self::new(buy_sell, notional, start, end, fixed_rate, index)
    }

    /// Sets the settlement currency.
    #[must_use]
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    /// Sets the accrual day count.
    #[must_use]
    pub fn with_day_count(mut self, day_count: DayCount) -> Self {
        self.day_count = day_count;
        self
    }

    /// Sets the discounting method.
    #[must_use]
    pub fn with_discounting(mut self, discounting: FraDiscounting) -> Self {
        self.discounting = discounting;
        self
    }

    /// Sets the payment date.
    #[must_use]
    pub fn with_payment_date(mut self, payment_date: Date) -> Self {
        self.payment_date = Some(payment_date);
        self
    }

    /// Returns the direction.
    #[must_use]
    pub fn buy_sell(&self) -> BuySell {
        self.buy_sell
    }

    /// Returns the settlement currency.
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

    /// Returns the payment date.
    #[must_use]
    pub fn payment_date(&self) -> Date {
        self.payment_date.unwrap_or(self.start_date)
    }

    /// Returns the fixed rate.
    #[must_use]
    pub fn fixed_rate(&self) -> f64 {
        self.fixed_rate
    }

    /// Returns the index.
    #[must_use]
    pub fn index(&self) -> &IborIndex {
        &self.index
    }

    /// Returns the discounting method.
    #[must_use]
    pub fn discounting(&self) -> FraDiscounting {
        self.discounting
    }

    /// Resolves the FRA for pricing.
    ///
    /// # Errors
    ///
    /// Returns `PricerError::InvalidProduct` if the payment date is after
    /// the end date.
    pub fn resolve(&self) -> PricerResult<ResolvedFra> {
        let payment_date = self.payment_date();
        if payment_date > self.end_date {
            return Err(PricerError::invalid_product(format!(
                "FRA payment date {payment_date} is after end date {}",
                self.end_date
            )));
        }
        let fixing_date = self.index.fixing_date(self.start_date);
        Ok(ResolvedFra {
            currency: self.currency,
            notional: self.buy_sell.normalize(self.notional),
            payment_date,
            start_date: self.start_date,
            end_date: self.end_date,
            year_fraction: self.day_count.year_fraction(self.start_date, self.end_date),
            fixed_rate: self.fixed_rate,
            observation: IborIndexObservation::new(
                &self.index,
                fixing_date,
                self.start_date,
                self.end_date,
            ),
            discounting: self.discounting,
        })
    }
}

/// A FRA resolved for pricing.
///
/// The notional is signed: positive when the FRA was bought.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFra {
    currency: Currency,
    notional: f64,
    payment_date: Date,
    start_date: Date,
    end_date: Date,
    year_fraction: f64,
    fixed_rate: f64,
    observation: IborIndexObservation,
    discounting: FraDiscounting,
}

impl ResolvedFra {
    /// Returns the settlement currency.
    #[must_use]
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns the signed notional.
    #[must_use]
    pub fn notional(&self) -> f64 {
        self.notional
    }

    /// Returns the payment date.
    #[must_use]
    pub fn payment_date(&self) -> Date {
        self.payment_date
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

    /// Returns the fixed rate.
    #[must_use]
    pub fn fixed_rate(&self) -> f64 {
        self.fixed_rate
    }

    /// Returns the index observation.
    #[must_use]
    pub fn observation(&self) -> &IborIndexObservation {
        &self.observation
    }

    /// Returns the discounting method.
    #[must_use]
    pub fn discounting(&self) -> FraDiscounting {
        self.discounting
    }
}

/// A trade in a FRA.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraTrade {
    info: TradeInfo,
    product: Fra,
}

impl FraTrade {
    /// Creates a trade.
    #[must_use]
    pub fn new(info: TradeInfo, product: Fra) -> Self {
        Self { info, product }
    }

    /// Returns the trade information.
    #[must_use]
    pub fn info(&self) -> &TradeInfo {
        &self.info
    }

    /// Returns the product.
    #[must_use]
    pub fn product(&self) -> &Fra {
        &self.product
    }

    /// Resolves the product for pricing.
    pub fn resolve(&self) -> PricerResult<ResolvedFra> {
        self.product.resolve()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn test_resolve() {
        let fra = Fra::new(
            BuySell::Sell,
            1_000_000.0,
            date(2024, 9, 18),
            date(2024, 12, 18),
            0.05,
            IborIndex::usd_libor_3m(),
        )
        .unwrap();
        let resolved = fra.resolve().unwrap();
        assert_relative_eq!(resolved.notional(), -1_000_000.0);
        assert_eq!(resolved.payment_date(), date(2024, 9, 18));
        assert_eq!(resolved.observation().fixing_date(), date(2024, 9, 16));
        assert_relative_eq!(resolved.year_fraction(), 91.0 / 360.0);
        assert_eq!(resolved.discounting(), FraDiscounting::Isda);
        assert_eq!(resolved.currency(), Currency::USD);
    }

    #[test]
    fn test_of_months() {
        // Friday trade, spot on Tuesday
        let index = IborIndex::usd_libor_3m();
        let fra = Fra::of_months(BuySell::Buy, 1e6, date(2024, 6, 14), 3, 6, 0.05, index).unwrap();
        assert_eq!(fra.start_date(), date(2024, 9, 18));
        assert_eq!(fra.end_date(), date(2024, 12, 18));
    }

    #[test]
    fn test_rejects_inverted_dates() {
        let err = Fra::new(
            BuySell::Buy,
            1e6,
            date(2024, 12, 18),
            date(2024, 9, 18),
            0.05,
            IborIndex::usd_libor_3m(),
        )
        .unwrap_err();
        assert!(matches!(err, PricerError::InvalidProduct { .. }));
    }

    #[test]
    fn test_rejects_late_payment() {
        let fra = Fra::new(
            BuySell::Buy,
            1e6,
            date(2024, 9, 18),
            date(2024, 12, 18),
            0.05,
            IborIndex::usd_libor_3m(),
        )
        .unwrap()
        .with_payment_date(date(2025, 1, 2));
        assert!(fra.resolve().is_err());
    }
}
