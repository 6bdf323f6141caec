//! Currency type with ISO 4217 codes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MeridianError;

/// ISO 4217 currency codes.
///
/// Ordering follows declaration order, which keeps sorted maps of
/// amounts stable across runs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[non_exhaustive]
pub enum Currency {
    /// United States Dollar
    #[default]
    USD,
    /// Euro
    EUR,
    /// British Pound Sterling
    GBP,
    /// Japanese Yen
    JPY,
    /// Swiss Franc
    CHF,
    /// Canadian Dollar
    CAD,
    /// Australian Dollar
    AUD,
    /// New Zealand Dollar
    NZD,
    /// Swedish Krona
    SEK,
    /// Norwegian Krone
    NOK,
    /// Danish Krone
    DKK,
    /// Hong Kong Dollar
    HKD,
    /// Singapore Dollar
    SGD,
}

impl Currency {
    /// Returns the ISO 4217 3-letter code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::CHF => "CHF",
            Currency::CAD => "CAD",
            Currency::AUD => "AUD",
            Currency::NZD => "NZD",
            Currency::SEK => "SEK",
            Currency::NOK => "NOK",
            Currency::DKK => "DKK",
            Currency::HKD => "HKD",
            Currency::SGD => "SGD",
        }
    }

    /// Returns the number of minor units (decimal places) of the currency.
    #[must_use]
    pub fn minor_units(&self) -> u32 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Returns the currency used to triangulate FX rates when no direct
    /// quote exists.
    ///
    /// Every currency triangulates via USD; USD itself goes via EUR.
    #[must_use]
    pub fn triangulation_currency(&self) -> Currency {
        match self {
            Currency::USD => Currency::EUR,
            _ => Currency::USD,
        }
    }

    /// Creates a currency from its ISO code (case-insensitive).
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_uppercase().as_str() {
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            "GBP" => Some(Currency::GBP),
            "JPY" => Some(Currency::JPY),
            "CHF" => Some(Currency::CHF),
            "CAD" => Some(Currency::CAD),
            "AUD" => Some(Currency::AUD),
            "NZD" => Some(Currency::NZD),
            "SEK" => Some(Currency::SEK),
            "NOK" => Some(Currency::NOK),
            "DKK" => Some(Currency::DKK),
            "HKD" => Some(Currency::HKD),
            "SGD" => Some(Currency::SGD),
            _ => None,
        }
    }
}

impl FromStr for Currency {
    type Err = MeridianError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::from_code(s.trim()).ok_or_else(|| MeridianError::UnknownCurrency {
            code: s.to_string(),
        })
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_code() {
        assert_eq!(Currency::USD.code(), "USD");
        assert_eq!(Currency::EUR.code(), "EUR");
        assert_eq!(Currency::JPY.code(), "JPY");
    }

    #[test]
    fn test_from_str() {
        assert_eq!("usd".parse::<Currency>().unwrap(), Currency::USD);
        assert_eq!(" GBP ".parse::<Currency>().unwrap(), Currency::GBP);
        assert!("XXX".parse::<Currency>().is_err());
    }

    #[test]
    fn test_minor_units() {
        assert_eq!(Currency::USD.minor_units(), 2);
        assert_eq!(Currency::JPY.minor_units(), 0);
    }

    #[test]
    fn test_triangulation() {
        assert_eq!(Currency::GBP.triangulation_currency(), Currency::USD);
        assert_eq!(Currency::USD.triangulation_currency(), Currency::EUR);
    }

    #[test]
    fn test_serde() {
        let currency = Currency::EUR;
        let json = serde_json::to_string(&currency).unwrap();
        let parsed: Currency = serde_json::from_str(&json).unwrap();
        assert_eq!(currency, parsed);
    }
}
