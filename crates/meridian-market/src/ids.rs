//! Market data identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

use meridian_core::types::{CurrencyPair, FxRate};

/// Untyped key of a single market data value.
///
/// The category separates namespaces (`Quote`, `FxRate`, `Curve`, ...) so
/// that ids of different kinds never collide.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarketDataKey {
    category: &'static str,
    name: String,
}

impl MarketDataKey {
    /// Creates a key.
    #[must_use]
    pub fn new(category: &'static str, name: impl Into<String>) -> Self {
        Self {
            category,
            name: name.into(),
        }
    }

    /// Returns the category.
    #[must_use]
    pub fn category(&self) -> &'static str {
        self.category
    }

    /// Returns the name within the category.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for MarketDataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.category, self.name)
    }
}

/// A typed identifier of a single market data value.
///
/// The associated `Value` is the type stored under [`MarketDataId::key`];
/// typed lookups downcast to it.
pub trait MarketDataId: fmt::Debug + Send + Sync {
    /// The type of value identified.
    type Value: Clone + Send + Sync + 'static;

    /// Returns the untyped key.
    fn key(&self) -> MarketDataKey;
}

/// Identifies a market quote, such as a deposit rate.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QuoteId(String);

impl QuoteId {
    /// Key category of quotes.
    pub const CATEGORY: &'static str = "Quote";

    /// Creates a quote id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl MarketDataId for QuoteId {
    type Value = f64;

    fn key(&self) -> MarketDataKey {
        MarketDataKey::new(Self::CATEGORY, self.0.clone())
    }
}

impl fmt::Display for QuoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for QuoteId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identifies the FX rate of a currency pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FxRateId(CurrencyPair);

impl FxRateId {
    /// Key category of FX rates.
    pub const CATEGORY: &'static str = "FxRate";

    /// Creates an FX rate id.
    #[must_use]
    pub fn new(pair: CurrencyPair) -> Self {
        Self(pair)
    }

    /// Returns the currency pair.
    #[must_use]
    pub fn pair(&self) -> CurrencyPair {
        self.0
    }
}

impl MarketDataId for FxRateId {
    type Value = FxRate;

    fn key(&self) -> MarketDataKey {
        MarketDataKey::new(Self::CATEGORY, self.0.to_string())
    }
}

impl fmt::Display for FxRateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
