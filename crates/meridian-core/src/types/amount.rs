//! Single and multi-currency amounts.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::{Currency, FxConvertible, FxRateProvider};
use crate::error::{MeridianError, MeridianResult};

/// An amount of money in a single currency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurrencyAmount {
    currency: Currency,
    amount: f64,
}

impl CurrencyAmount {
    /// Creates an amount.
    #[must_use]
    pub fn new(currency: Currency, amount: f64) -> Self {
        Self { currency, amount }
    }

    /// Creates a zero amount.
    #[must_use]
    pub fn zero(currency: Currency) -> Self {
        Self::new(currency, 0.0)
    }

    /// Returns the currency.
    #[must_use]
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns the amount.
    #[must_use]
    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// Adds another amount in the same currency.
    ///
    /// # Errors
    ///
    /// Returns `MeridianError::CurrencyMismatch` if the currencies differ.
    pub fn plus(&self, other: &CurrencyAmount) -> MeridianResult<Self> {
        if other.currency != self.currency {
            return Err(MeridianError::CurrencyMismatch {
                expected: self.currency,
                got: other.currency,
            });
        }
        Ok(Self::new(self.currency, self.amount + other.amount))
    }

    /// Multiplies the amount by a factor.
    #[must_use]
    pub fn multiplied_by(&self, factor: f64) -> Self {
        Self::new(self.currency, self.amount * factor)
    }

    /// Returns the negated amount.
    #[must_use]
    pub fn negated(&self) -> Self {
        Self::new(self.currency, -self.amount)
    }

    /// Rounds the amount to the minor units of its currency (half-even).
    #[must_use]
    pub fn rounded(&self) -> Self {
        let rounded = Decimal::from_f64(self.amount)
            .map(|d| {
                d.round_dp_with_strategy(
                    self.currency.minor_units(),
                    RoundingStrategy::MidpointNearestEven,
                )
            })
            .and_then(|d| d.to_f64())
            .unwrap_or(self.amount);
        Self::new(self.currency, rounded)
    }
}

impl FxConvertible for CurrencyAmount {
    fn convert_to(
        &self,
        result_currency: Currency,
        rates: &dyn FxRateProvider,
    ) -> MeridianResult<Self> {
        let converted = rates.convert(self.amount, self.currency, result_currency)?;
        Ok(Self::new(result_currency, converted))
    }
}

impl fmt::Display for CurrencyAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.currency, self.amount)
    }
}

/// A collection of amounts in different currencies, at most one per currency.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MultiCurrencyAmount {
    amounts: BTreeMap<Currency, f64>,
}

impl MultiCurrencyAmount {
    /// Creates an empty amount.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a multi-currency amount by summing single amounts.
    #[must_use]
    pub fn of(amounts: impl IntoIterator<Item = CurrencyAmount>) -> Self {
        amounts
            .into_iter()
            .fold(Self::empty(), |acc, amount| acc.plus(&amount))
    }

    /// Returns the amount for a currency, if present.
    #[must_use]
    pub fn get(&self, currency: Currency) -> Option<CurrencyAmount> {
        self.amounts
            .get(&currency)
            .map(|amount| CurrencyAmount::new(currency, *amount))
    }

    /// Returns the amount for a currency, zero if absent.
    #[must_use]
    pub fn amount(&self, currency: Currency) -> f64 {
        self.amounts.get(&currency).copied().unwrap_or(0.0)
    }

    /// Returns the currencies present, in sorted order.
    pub fn currencies(&self) -> impl Iterator<Item = Currency> + '_ {
        self.amounts.keys().copied()
    }

    /// Returns the amounts, in currency order.
    pub fn amounts(&self) -> impl Iterator<Item = CurrencyAmount> + '_ {
        self.amounts
            .iter()
            .map(|(currency, amount)| CurrencyAmount::new(*currency, *amount))
    }

    /// Returns the number of currencies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.amounts.len()
    }

    /// Checks if no currency is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }

    /// Adds a single-currency amount.
    #[must_use]
    pub fn plus(&self, amount: &CurrencyAmount) -> Self {
        let mut amounts = self.amounts.clone();
        *amounts.entry(amount.currency()).or_insert(0.0) += amount.amount();
        Self { amounts }
    }

    /// Adds another multi-currency amount.
    #[must_use]
    pub fn plus_all(&self, other: &MultiCurrencyAmount) -> Self {
        other.amounts().fold(self.clone(), |acc, a| acc.plus(&a))
    }

    /// Multiplies every amount by a factor.
    #[must_use]
    pub fn multiplied_by(&self, factor: f64) -> Self {
        Self {
            amounts: self
                .amounts
                .iter()
                .map(|(currency, amount)| (*currency, amount * factor))
                .collect(),
        }
    }

    /// Converts every amount into one currency and sums them.
    pub fn total(
        &self,
        result_currency: Currency,
        rates: &dyn FxRateProvider,
    ) -> MeridianResult<CurrencyAmount> {
        let mut total = 0.0;
        for (currency, amount) in &self.amounts {
            total += rates.convert(*amount, *currency, result_currency)?;
        }
        Ok(CurrencyAmount::new(result_currency, total))
    }
}

impl FxConvertible for MultiCurrencyAmount {
    fn convert_to(
        &self,
        result_currency: Currency,
        rates: &dyn FxRateProvider,
    ) -> MeridianResult<Self> {
        let total = self.total(result_currency, rates)?;
        Ok(Self::of([total]))
    }
}

impl From<CurrencyAmount> for MultiCurrencyAmount {
    fn from(amount: CurrencyAmount) -> Self {
        Self::of([amount])
    }
}

impl fmt::Display for MultiCurrencyAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.amounts().map(|a| a.to_string()).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CurrencyPair, FxRate};
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn eur_usd(rate: f64) -> FxRate {
        FxRate::new(CurrencyPair::new(Currency::EUR, Currency::USD), rate).unwrap()
    }

    #[test]
    fn test_plus_rejects_mismatch() {
        let usd = CurrencyAmount::new(Currency::USD, 10.0);
        let eur = CurrencyAmount::new(Currency::EUR, 10.0);
        assert!(usd.plus(&eur).is_err());
        assert_relative_eq!(usd.plus(&usd).unwrap().amount(), 20.0);
    }

    #[test]
    fn test_rounded_to_minor_units() {
        let usd = CurrencyAmount::new(Currency::USD, 12.345_678);
        assert_relative_eq!(usd.rounded().amount(), 12.35);
        let jpy = CurrencyAmount::new(Currency::JPY, 1234.5);
        assert_relative_eq!(jpy.rounded().amount(), 1234.0);
    }

    #[test]
    fn test_rounding_is_half_even() {
        let decimal =
            |amount: CurrencyAmount| Decimal::from_f64(amount.rounded().amount()).unwrap();
        assert_eq!(decimal(CurrencyAmount::new(Currency::USD, 0.125)), dec!(0.12));
        assert_eq!(decimal(CurrencyAmount::new(Currency::USD, 0.375)), dec!(0.38));
        assert_eq!(decimal(CurrencyAmount::new(Currency::JPY, 2.5)), dec!(2));
        assert_eq!(decimal(CurrencyAmount::new(Currency::JPY, -3.5)), dec!(-4));
    }

    #[test]
    fn test_multi_currency_accumulates() {
        let mca = MultiCurrencyAmount::of([
            CurrencyAmount::new(Currency::USD, 10.0),
            CurrencyAmount::new(Currency::EUR, 5.0),
            CurrencyAmount::new(Currency::USD, -4.0),
        ]);
        assert_eq!(mca.len(), 2);
        assert_relative_eq!(mca.amount(Currency::USD), 6.0);
        assert_relative_eq!(mca.amount(Currency::GBP), 0.0);
    }

    #[test]
    fn test_multi_currency_convert() {
        let mca = MultiCurrencyAmount::of([
            CurrencyAmount::new(Currency::USD, 110.0),
            CurrencyAmount::new(Currency::EUR, 100.0),
        ]);
        let converted = mca.convert_to(Currency::USD, &eur_usd(1.1)).unwrap();
        assert_eq!(converted.len(), 1);
        assert_relative_eq!(converted.amount(Currency::USD), 220.0, epsilon = 1e-9);
    }

    proptest! {
        #[test]
        fn prop_convert_round_trip(amount in -1.0e9f64..1.0e9, rate in 0.01f64..100.0) {
            let fx = eur_usd(rate);
            let original = MultiCurrencyAmount::of([CurrencyAmount::new(Currency::EUR, amount)]);
            let there = original.convert_to(Currency::USD, &fx).unwrap();
            let back = there.convert_to(Currency::EUR, &fx.inverse()).unwrap();
            let error = (back.amount(Currency::EUR) - amount).abs();
            prop_assert!(error <= 1e-9 * amount.abs().max(1.0));
        }
    }
}
