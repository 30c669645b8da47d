//! Backtest runner: bar-by-bar strategy replay.

use crate::domain::candle::Candle;
use crate::domain::error::TradecoreError;
use crate::domain::strategy::Strategy;
use crate::domain::trade::SimTrade;

/// Replay `strategy` over `candles`, collecting every emitted trade.
///
/// At step i (for i in 1..n) the strategy sees `candles[..i]` — the history
/// up to but excluding bar i. The final bar is therefore visible only to the
/// metrics stage, matching the replay loop this toolkit has always used.
pub fn run_backtest(
    candles: &[Candle],
    strategy: &dyn Strategy,
) -> Result<Vec<SimTrade>, TradecoreError> {
    let mut trades = Vec::new();
    for i in 1..candles.len() {
        trades.extend(strategy.evaluate(&candles[..i])?);
    }
    log::debug!(
        "backtest of {} over {} candles produced {} trades",
        strategy.name(),
        candles.len(),
        trades.len()
    );
    Ok(trades)
}
