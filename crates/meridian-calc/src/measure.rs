//! Measures: the named outputs a calculation can produce.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifies an output of a calculation, such as present value.
///
/// Measures compare by name. The standard measures are available as
/// associated constants; other names can be created with [`Measure::of`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Measure(Cow<'static, str>);

impl Measure {
    /// Present value.
    pub const PRESENT_VALUE: Measure = Measure::standard("PresentValue");
    /// Par rate.
    pub const PAR_RATE: Measure = Measure::standard("ParRate");
    /// Par spread.
    pub const PAR_SPREAD: Measure = Measure::standard("ParSpread");
    /// PV01 against calibrated curve parameters, summed.
    pub const PV01_CALIBRATED_SUM: Measure = Measure::standard("PV01CalibratedSum");
    /// PV01 against calibrated curve parameters, per parameter.
    pub const PV01_CALIBRATED_BUCKETED: Measure = Measure::standard("PV01CalibratedBucketed");
    /// PV01 against market quotes, summed.
    pub const PV01_MARKET_QUOTE_SUM: Measure = Measure::standard("PV01MarketQuoteSum");
    /// PV01 against market quotes, per quote.
    pub const PV01_MARKET_QUOTE_BUCKETED: Measure = Measure::standard("PV01MarketQuoteBucketed");
    /// Semi-parallel gamma, per curve node.
    pub const PV01_SEMI_PARALLEL_GAMMA_BUCKETED: Measure =
        Measure::standard("PV01SemiParallelGammaBucketed");
    /// Currency exposure.
    pub const CURRENCY_EXPOSURE: Measure = Measure::standard("CurrencyExposure");
    /// Forward FX rate.
    pub const FORWARD_FX_RATE: Measure = Measure::standard("ForwardFxRate");
    /// Cash paid or received on the valuation date.
    pub const CURRENT_CASH: Measure = Measure::standard("CurrentCash");

    const fn standard(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Creates a measure from a name.
    #[must_use]
    pub fn of(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// Returns the name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Returns the standard measures.
    #[must_use]
    pub fn standard_measures() -> [Measure; 11] {
        [
            Self::PRESENT_VALUE,
            Self::PAR_RATE,
            Self::PAR_SPREAD,
            Self::PV01_CALIBRATED_SUM,
            Self::PV01_CALIBRATED_BUCKETED,
            Self::PV01_MARKET_QUOTE_SUM,
            Self::PV01_MARKET_QUOTE_BUCKETED,
            Self::PV01_SEMI_PARALLEL_GAMMA_BUCKETED,
            Self::CURRENCY_EXPOSURE,
            Self::FORWARD_FX_RATE,
            Self::CURRENT_CASH,
        ]
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Measure {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name.is_empty() {
            return Err("Measure name cannot be empty".to_string());
        }
        Ok(Self::standard_measures()
            .into_iter()
            .find(|m| m.name() == name)
            .unwrap_or_else(|| Self::of(name)))
    }
}
