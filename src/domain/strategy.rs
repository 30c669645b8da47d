//! Strategy trait and the built-in moving-average crossover strategy.

use crate::domain::candle::Candle;
use crate::domain::error::TradecoreError;
use crate::domain::indicator::sma::sma_latest;
use crate::domain::trade::{SimTrade, TradeAction};

/// A trading strategy evaluated bar-by-bar against the history so far.
///
/// The runner only ever exposes candles up to the current bar, so a strategy
/// that derives its decisions purely from `history` cannot look ahead.
pub trait Strategy {
    fn name(&self) -> &str;

    /// Trades to emit at this point in the replay, given all candles up to
    /// (and excluding) the current bar.
    fn evaluate(&self, history: &[Candle]) -> Result<Vec<SimTrade>, TradecoreError>;
}

/// Buys one unit when the short SMA crosses above the long SMA, sells one
/// unit on the cross below. Emits at most one trade per bar.
#[derive(Debug, Clone)]
pub struct SmaCrossStrategy {
    pub short_window: usize,
    pub long_window: usize,
    pub quantity: f64,
}

impl SmaCrossStrategy {
    pub fn new(short_window: usize, long_window: usize) -> Self {
        SmaCrossStrategy {
            short_window,
            long_window,
            quantity: 1.0,
        }
    }
}

impl Strategy for SmaCrossStrategy {
    fn name(&self) -> &str {
        "sma-cross"
    }

    fn evaluate(&self, history: &[Candle]) -> Result<Vec<SimTrade>, TradecoreError> {
        if self.short_window == 0 || self.long_window <= self.short_window {
            return Err(TradecoreError::InvalidRequest {
                reason: format!(
                    "sma-cross windows must satisfy 0 < short < long, got {}/{}",
                    self.short_window, self.long_window
                ),
            });
        }

        // Need a full long window both now and one bar back.
        if history.len() < self.long_window + 1 {
            return Ok(Vec::new());
        }

        let closes: Vec<f64> = history.iter().map(|c| c.close).collect();
        let prev = &closes[..closes.len() - 1];

        let short_now = sma_latest(&closes, self.short_window);
        let long_now = sma_latest(&closes, self.long_window);
        let short_prev = sma_latest(prev, self.short_window);
        let long_prev = sma_latest(prev, self.long_window);

        let last = history.last().map(|c| (c.timestamp, c.close));
        let Some((timestamp, price)) = last else {
            return Ok(Vec::new());
        };

        let mut trades = Vec::new();
        if short_prev <= long_prev && short_now > long_now {
            trades.push(SimTrade {
                timestamp,
                action: TradeAction::Buy,
                price,
                quantity: self.quantity,
            });
        } else if short_prev >= long_prev && short_now < long_now {
            trades.push(SimTrade {
                timestamp,
                action: TradeAction::Sell,
                price,
                quantity: self.quantity,
            });
        }
        Ok(trades)
    }
}
