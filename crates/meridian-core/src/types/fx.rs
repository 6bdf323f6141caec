//! Currency pairs, FX rates and the FX conversion capability.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Currency;
use crate::error::{MeridianError, MeridianResult};

/// An ordered pair of currencies, such as `EUR/USD`.
///
/// The rate of a pair is the number of units of the counter currency
/// bought by one unit of the base currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    base: Currency,
    counter: Currency,
}

impl CurrencyPair {
    /// Creates a currency pair.
    #[must_use]
    pub fn new(base: Currency, counter: Currency) -> Self {
        Self { base, counter }
    }

    /// Returns the base currency.
    #[must_use]
    pub fn base(&self) -> Currency {
        self.base
    }

    /// Returns the counter currency.
    #[must_use]
    pub fn counter(&self) -> Currency {
        self.counter
    }

    /// Returns the inverse pair.
    #[must_use]
    pub fn inverse(&self) -> Self {
        Self::new(self.counter, self.base)
    }

    /// Checks if the pair is the inverse of another.
    #[must_use]
    pub fn is_inverse(&self, other: &CurrencyPair) -> bool {
        self.base == other.counter && self.counter == other.base
    }

    /// Checks if base and counter are the same currency.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.base == self.counter
    }

    /// Checks if the pair contains the currency.
    #[must_use]
    pub fn contains(&self, currency: Currency) -> bool {
        self.base == currency || self.counter == currency
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.counter)
    }
}

impl FromStr for CurrencyPair {
    type Err = MeridianError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (base, counter) = s.split_once('/').ok_or_else(|| {
            MeridianError::invalid_argument(format!("Currency pair must be 'AAA/BBB': {s}"))
        })?;
        Ok(Self::new(base.parse()?, counter.parse()?))
    }
}

/// A single FX rate for a currency pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FxRate {
    pair: CurrencyPair,
    rate: f64,
}

impl FxRate {
    /// Creates an FX rate.
    ///
    /// # Errors
    ///
    /// Returns an error if the rate is not strictly positive, or if the
    /// pair is an identity pair with a rate other than one.
    pub fn new(pair: CurrencyPair, rate: f64) -> MeridianResult<Self> {
        if !(rate.is_finite() && rate > 0.0) {
            return Err(MeridianError::invalid_argument(format!(
                "FX rate for {pair} must be positive: {rate}"
            )));
        }
        if pair.is_identity() && (rate - 1.0).abs() > f64::EPSILON {
            return Err(MeridianError::invalid_argument(format!(
                "Identity pair {pair} must have rate 1, got {rate}"
            )));
        }
        Ok(Self { pair, rate })
    }

    /// Returns the currency pair.
    #[must_use]
    pub fn pair(&self) -> CurrencyPair {
        self.pair
    }

    /// Returns the rate quoted for the pair.
    #[must_use]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Returns the inverse rate.
    #[must_use]
    pub fn inverse(&self) -> Self {
        Self {
            pair: self.pair.inverse(),
            rate: 1.0 / self.rate,
        }
    }
}

impl FxRateProvider for FxRate {
    fn fx_rate(&self, base: Currency, counter: Currency) -> MeridianResult<f64> {
        if base == counter {
            return Ok(1.0);
        }
        let requested = CurrencyPair::new(base, counter);
        if requested == self.pair {
            Ok(self.rate)
        } else if requested.is_inverse(&self.pair) {
            Ok(1.0 / self.rate)
        } else {
            Err(MeridianError::fx_rate_not_found(base, counter))
        }
    }
}

/// A provider of FX rates.
///
/// Implementations only need to supply rates for distinct currencies;
/// [`FxRateProvider::convert`] handles the identity case.
pub trait FxRateProvider: Send + Sync {
    /// Returns the rate converting one unit of `base` into `counter`.
    fn fx_rate(&self, base: Currency, counter: Currency) -> MeridianResult<f64>;

    /// Converts an amount from one currency into another.
    fn convert(&self, amount: f64, from: Currency, to: Currency) -> MeridianResult<f64> {
        if from == to {
            return Ok(amount);
        }
        Ok(amount * self.fx_rate(from, to)?)
    }
}

/// A value that can be converted into a single currency.
///
/// Implemented by amounts and sensitivities; the calculation engine uses it
/// to convert results into the reporting currency.
pub trait FxConvertible: Sized {
    /// Converts the value into `result_currency` using the given rates.
    fn convert_to(
        &self,
        result_currency: Currency,
        rates: &dyn FxRateProvider,
    ) -> MeridianResult<Self>;
}
