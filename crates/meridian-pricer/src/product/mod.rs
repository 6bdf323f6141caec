//! Products and trades.
//!
//! Each product validates on construction and resolves into a form holding
//! the derived dates, year fractions and signed amounts the pricers read.

mod fra;
mod fx_single;
mod term_deposit;

pub use fra::{Fra, FraDiscounting, FraTrade, ResolvedFra};
pub use fx_single::{FxSingle, FxSingleTrade, ResolvedFxSingle};
pub use term_deposit::{ResolvedTermDeposit, TermDeposit, TermDepositTrade};

use serde::{Deserialize, Serialize};

use meridian_core::Date;

/// Direction of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuySell {
    /// Buy.
    Buy,
    /// Sell.
    Sell,
}

impl BuySell {
    /// Applies the direction to an amount: positive for buy, negative for sell.
    #[must_use]
    pub fn normalize(self, amount: f64) -> f64 {
        match self {
            BuySell::Buy => amount.abs(),
            BuySell::Sell => -amount.abs(),
        }
    }

    /// Checks if this is a buy.
    #[must_use]
    pub fn is_buy(self) -> bool {
        self == BuySell::Buy
    }
}

/// Information about a trade that does not affect its price.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeInfo {
    id: Option<String>,
    trade_date: Option<Date>,
    counterparty: Option<String>,
}

impl TradeInfo {
    /// Creates empty trade information.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Sets the trade id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the trade date.
    #[must_use]
    pub fn with_trade_date(mut self, trade_date: Date) -> Self {
        self.trade_date = Some(trade_date);
        self
    }

    /// Sets the counterparty.
    #[must_use]
    pub fn with_counterparty(mut self, counterparty: impl Into<String>) -> Self {
        self.counterparty = Some(counterparty.into());
        self
    }

    /// Returns the trade id.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Returns the trade date.
    #[must_use]
    pub fn trade_date(&self) -> Option<Date> {
        self.trade_date
    }

    /// Returns the counterparty.
    #[must_use]
    pub fn counterparty(&self) -> Option<&str> {
        self.counterparty.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buy_sell_sign() {
        assert_eq!(BuySell::Buy.normalize(-5.0), 5.0);
        assert_eq!(BuySell::Sell.normalize(5.0), -5.0);
        assert!(BuySell::Buy.is_buy());
    }

    #[test]
    fn test_trade_info() {
        let info = TradeInfo::empty().with_id("T1").with_counterparty("ACME");
        assert_eq!(info.id(), Some("T1"));
        assert_eq!(info.counterparty(), Some("ACME"));
        assert!(info.trade_date().is_none());
    }
}
