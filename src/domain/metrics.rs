//! Performance metrics over a simulated trade list.
//!
//! P&L here is the naive per-trade signed cash flow (BUY = −price·qty,
//! SELL = +price·qty); entries are not matched to exits. This matches the
//! toolkit's historical definition and is kept so old results stay
//! comparable.

use crate::domain::trade::SimTrade;
use chrono::{DateTime, Utc};

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// One point of the equity curve: cumulative capital after a trade.
#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub equity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Performance {
    pub total_trades: usize,
    pub total_pnl: f64,
    /// One entry per trade, in timestamp order, starting from the
    /// initial-capital baseline.
    pub equity_curve: Vec<EquityPoint>,
    /// Minimum of (equity − running peak) / running peak; ≤ 0.
    pub max_drawdown: f64,
    /// mean / sample stdev of per-entry equity returns, annualized by √252.
    /// Zero when the stdev is zero.
    pub sharpe_ratio: f64,
    /// Fraction of trades with positive signed cash flow.
    pub win_rate: f64,
    /// Gross positive P&L over |gross negative P&L|; +∞ whenever there are
    /// trades but no losers, 0 for an empty trade list.
    pub profit_factor: f64,
}

impl Performance {
    pub fn compute(trades: &[SimTrade], initial_capital: f64) -> Self {
        if trades.is_empty() {
            return Performance {
                total_trades: 0,
                total_pnl: 0.0,
                equity_curve: Vec::new(),
                max_drawdown: 0.0,
                sharpe_ratio: 0.0,
                win_rate: 0.0,
                profit_factor: 0.0,
            };
        }

        let mut sorted: Vec<&SimTrade> = trades.iter().collect();
        sorted.sort_by_key(|t| t.timestamp);

        let mut equity = initial_capital;
        let mut equity_curve = Vec::with_capacity(sorted.len());
        let mut winners = 0usize;
        let mut gross_profit = 0.0_f64;
        let mut gross_loss = 0.0_f64;

        for trade in &sorted {
            let pnl = trade.cash_flow();
            equity += pnl;
            equity_curve.push(EquityPoint {
                timestamp: trade.timestamp,
                equity,
            });

            if pnl > 0.0 {
                winners += 1;
                gross_profit += pnl;
            } else if pnl < 0.0 {
                gross_loss += pnl.abs();
            }
        }

        let total_pnl = equity - initial_capital;
        let win_rate = winners as f64 / sorted.len() as f64;

        // No losing trades means an unbounded profit factor, even when every
        // cash flow is zero.
        let profit_factor = if gross_loss > 0.0 {
            gross_profit / gross_loss
        } else {
            f64::INFINITY
        };

        Performance {
            total_trades: sorted.len(),
            total_pnl,
            max_drawdown: compute_drawdown(initial_capital, &equity_curve),
            sharpe_ratio: compute_sharpe(initial_capital, &equity_curve),
            win_rate,
            profit_factor,
            equity_curve,
        }
    }
}

fn compute_drawdown(initial_capital: f64, equity_curve: &[EquityPoint]) -> f64 {
    let mut peak = initial_capital;
    let mut max_dd = 0.0_f64;

    for point in equity_curve {
        if point.equity > peak {
            peak = point.equity;
        } else if peak > 0.0 {
            let dd = (point.equity - peak) / peak;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd
}

fn compute_sharpe(initial_capital: f64, equity_curve: &[EquityPoint]) -> f64 {
    let mut values = Vec::with_capacity(equity_curve.len() + 1);
    values.push(initial_capital);
    values.extend(equity_curve.iter().map(|p| p.equity));

    let returns: Vec<f64> = values
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect();

    if returns.len() < 2 {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    // Sample variance, ddof = 1.
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let stddev = variance.sqrt();

    if stddev > 0.0 {
        (mean / stddev) * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    }
}
