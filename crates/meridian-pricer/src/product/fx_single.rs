//! Single FX exchanges: spot or forward.

use serde::{Deserialize, Serialize};

use meridian_core::types::{FxRate, FxRateProvider};
use meridian_core::{CurrencyAmount, CurrencyPair, Date};

use super::TradeInfo;
use crate::error::{PricerError, PricerResult};

/// An exchange of two currency amounts on a payment date.
///
/// One amount is received and the other paid, so their signs differ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FxSingle {
    base_currency_amount: CurrencyAmount,
    counter_currency_amount: CurrencyAmount,
    payment_date: Date,
}

impl FxSingle {
    /// Creates an exchange from both amounts.
    ///
    /// # Errors
    ///
    /// Returns `PricerError::InvalidProduct` if the currencies are equal or
    /// the amounts do not have opposite signs.
    pub fn new(
        base_currency_amount: CurrencyAmount,
        counter_currency_amount: CurrencyAmount,
        payment_date: Date,
    ) -> PricerResult<Self> {
        if base_currency_amount.currency() == counter_currency_amount.currency() {
            return Err(PricerError::invalid_product(format!(
                "FX exchange needs two currencies, got {} twice",
                base_currency_amount.currency()
            )));
        }
        let (base, counter) = (base_currency_amount.amount(), counter_currency_amount.amount());
        if !base.is_finite() || !counter.is_finite() {
            return Err(PricerError::invalid_product("FX amounts must be finite"));
        }
        if base != 0.0 && counter != 0.0 && base.signum() == counter.signum() {
            return Err(PricerError::invalid_product(format!(
                "FX amounts must have opposite signs: {base_currency_amount} and \
                 {counter_currency_amount}"
            )));
        }
        Ok(Self {
            base_currency_amount,
            counter_currency_amount,
            payment_date,
        })
    }

    /// Creates an exchange of a base amount at a rate; the counter amount is
    /// `-amount × rate`.
    ///
    /// # Errors
    ///
    /// Returns `PricerError::InvalidProduct` if the amount's currency is not
    /// in the rate's pair.
    pub fn of(amount: CurrencyAmount, rate: &FxRate, payment_date: Date) -> PricerResult<Self> {
        let pair = rate.pair();
        let counter_currency = if amount.currency() == pair.base() {
            pair.counter()
        } else if amount.currency() == pair.counter() {
            pair.base()
        } else {
            return Err(PricerError::invalid_product(format!(
                "amount in {} cannot be exchanged at a {pair} rate",
                amount.currency()
            )));
        };
        let converted = -amount.amount() * rate.fx_rate(amount.currency(), counter_currency)?;
        Self::new(amount, CurrencyAmount::new(counter_currency, converted), payment_date)
    }

    /// Returns the base currency amount.
    #[must_use]
    pub fn base_currency_amount(&self) -> CurrencyAmount {
        self.base_currency_amount
    }

    /// Returns the counter currency amount.
    #[must_use]
    pub fn counter_currency_amount(&self) -> CurrencyAmount {
        self.counter_currency_amount
    }

    /// Returns the currency pair, base then counter.
    #[must_use]
    pub fn currency_pair(&self) -> CurrencyPair {
        CurrencyPair::new(
            self.base_currency_amount.currency(),
            self.counter_currency_amount.currency(),
        )
    }

    /// Returns the payment date.
    #[must_use]
    pub fn payment_date(&self) -> Date {
        self.payment_date
    }

    /// Resolves the exchange for pricing.
    #[must_use]
    pub fn resolve(&self) -> ResolvedFxSingle {
        ResolvedFxSingle {
            base_payment: self.base_currency_amount,
            counter_payment: self.counter_currency_amount,
            payment_date: self.payment_date,
        }
    }
}

/// An FX exchange resolved for pricing: two payments on one date.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFxSingle {
    base_payment: CurrencyAmount,
    counter_payment: CurrencyAmount,
    payment_date: Date,
}

impl ResolvedFxSingle {
    /// Returns the base currency payment.
    #[must_use]
    pub fn base_payment(&self) -> CurrencyAmount {
        self.base_payment
    }

    /// Returns the counter currency payment.
    #[must_use]
    pub fn counter_payment(&self) -> CurrencyAmount {
        self.counter_payment
    }

    /// Returns the payment date.
    #[must_use]
    pub fn payment_date(&self) -> Date {
        self.payment_date
    }

    /// Returns the currency pair, base then counter.
    #[must_use]
    pub fn currency_pair(&self) -> CurrencyPair {
        CurrencyPair::new(self.base_payment.currency(), self.counter_payment.currency())
    }
}

/// A trade in an FX exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FxSingleTrade {
    info: TradeInfo,
    product: FxSingle,
}

impl FxSingleTrade {
    /// Creates a trade.
    #[must_use]
    pub fn new(info: TradeInfo, product: FxSingle) -> Self {
        Self { info, product }
    }

    /// Returns the trade information.
    #[must_use]
    pub fn info(&self) -> &TradeInfo {
        &self.info
    }

    /// Returns the product.
    #[must_use]
    pub fn product(&self) -> &FxSingle {
        &self.product
    }

    /// Resolves the product for pricing.
    #[must_use]
    pub fn resolve(&self) -> ResolvedFxSingle {
        self.product.resolve()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use meridian_core::Currency;

    fn pay() -> Date {
        Date::from_ymd(2024, 9, 18).unwrap()
    }

    #[test]
    fn test_of_rate() {
        let rate = FxRate::new(CurrencyPair::new(Currency::EUR, Currency::USD), 1.10).unwrap();
        let fx = FxSingle::of(CurrencyAmount::new(Currency::EUR, 1_000.0), &rate, pay()).unwrap();
        assert_eq!(fx.counter_currency_amount().currency(), Currency::USD);
        assert_relative_eq!(fx.counter_currency_amount().amount(), -1_100.0);

        let fx = FxSingle::of(CurrencyAmount::new(Currency::USD, -1_100.0), &rate, pay()).unwrap();
        assert_eq!(fx.currency_pair(), CurrencyPair::new(Currency::USD, Currency::EUR));
        assert_relative_eq!(fx.counter_currency_amount().amount(), 1_000.0);
    }

    #[test]
    fn test_rejects_same_sign() {
        let result = FxSingle::new(
            CurrencyAmount::new(Currency::EUR, 1.0),
            CurrencyAmount::new(Currency::USD, 1.0),
            pay(),
        );
        assert!(matches!(result, Err(PricerError::InvalidProduct { .. })));
    }

    #[test]
    fn test_rejects_unrelated_currency() {
        let rate = FxRate::new(CurrencyPair::new(Currency::EUR, Currency::USD), 1.10).unwrap();
        assert!(FxSingle::of(CurrencyAmount::new(Currency::GBP, 1.0), &rate, pay()).is_err());
    }
}
