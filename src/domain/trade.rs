//! Simulated trade records emitted by strategies during backtesting.

use chrono::{DateTime, Utc};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeAction {
    Buy,
    Sell,
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::Buy => f.write_str("BUY"),
            TradeAction::Sell => f.write_str("SELL"),
        }
    }
}

/// One simulated trade. Never mutated after creation; consumed only by the
/// performance calculator.
#[derive(Debug, Clone, PartialEq)]
pub struct SimTrade {
    pub timestamp: DateTime<Utc>,
    pub action: TradeAction,
    pub price: f64,
    pub quantity: f64,
}

impl SimTrade {
    /// Signed cash flow: BUY is an outflow, SELL an inflow.
    pub fn cash_flow(&self) -> f64 {
        match self.action {
            TradeAction::Buy => -self.price * self.quantity,
            TradeAction::Sell => self.price * self.quantity,
        }
    }
}
