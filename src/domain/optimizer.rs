//! Exhaustive grid search over strategy parameters.

use crate::domain::backtest::run_backtest;
use crate::domain::candle::Candle;
use crate::domain::error::TradecoreError;
use crate::domain::metrics::Performance;
use crate::domain::strategy::Strategy;
use std::collections::BTreeMap;
use std::fmt;

/// One parameter combination, keyed by parameter name.
pub type ParamSet = BTreeMap<String, f64>;

/// Candidate values per parameter name. A grid with no parameters yields a
/// single empty combination.
pub type ParamGrid = BTreeMap<String, Vec<f64>>;

/// Metric the search maximizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizeMetric {
    TotalPnl,
    SharpeRatio,
    WinRate,
    ProfitFactor,
}

impl OptimizeMetric {
    pub fn value(&self, performance: &Performance) -> f64 {
        match self {
            OptimizeMetric::TotalPnl => performance.total_pnl,
            OptimizeMetric::SharpeRatio => performance.sharpe_ratio,
            OptimizeMetric::WinRate => performance.win_rate,
            OptimizeMetric::ProfitFactor => performance.profit_factor,
        }
    }

    pub fn parse(s: &str) -> Option<OptimizeMetric> {
        match s {
            "total_pnl" => Some(OptimizeMetric::TotalPnl),
            "sharpe_ratio" => Some(OptimizeMetric::SharpeRatio),
            "win_rate" => Some(OptimizeMetric::WinRate),
            "profit_factor" => Some(OptimizeMetric::ProfitFactor),
            _ => None,
        }
    }
}

impl fmt::Display for OptimizeMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OptimizeMetric::TotalPnl => "total_pnl",
            OptimizeMetric::SharpeRatio => "sharpe_ratio",
            OptimizeMetric::WinRate => "win_rate",
            OptimizeMetric::ProfitFactor => "profit_factor",
        };
        f.write_str(name)
    }
}

/// Best parameter combination with its performance.
#[derive(Debug, Clone)]
pub struct OptimizeResult {
    pub params: ParamSet,
    pub performance: Performance,
}

/// Run a backtest for every combination in `grid` and keep the one whose
/// metric is strictly greatest. Ties keep the first-seen combination;
/// enumeration order is deterministic (parameter names sorted, last name
/// varying fastest). No pruning: the grid is searched exhaustively, and any
/// failing backtest aborts the whole search.
///
/// Returns `None` only when the grid has a parameter with no candidates.
pub fn optimize<S, F>(
    candles: &[Candle],
    build_strategy: F,
    grid: &ParamGrid,
    metric: OptimizeMetric,
    initial_capital: f64,
) -> Result<Option<OptimizeResult>, TradecoreError>
where
    S: Strategy,
    F: Fn(&ParamSet) -> S,
{
    let mut best: Option<(f64, OptimizeResult)> = None;

    for params in enumerate_grid(grid) {
        let strategy = build_strategy(&params);
        let trades = run_backtest(candles, &strategy)?;
        let performance = Performance::compute(&trades, initial_capital);
        let score = metric.value(&performance);

        let better = match &best {
            None => true,
            Some((best_score, _)) => score > *best_score,
        };
        if better {
            best = Some((
                score,
                OptimizeResult {
                    params,
                    performance,
                },
            ));
        }
    }

    Ok(best.map(|(_, result)| result))
}

/// Full Cartesian product in deterministic order.
fn enumerate_grid(grid: &ParamGrid) -> Vec<ParamSet> {
    let names: Vec<&String> = grid.keys().collect();
    let mut combinations = vec![ParamSet::new()];

    for name in names {
        let values = &grid[name];
        let mut next = Vec::with_capacity(combinations.len() * values.len());
        for combo in &combinations {
            for &value in values {
                let mut extended = combo.clone();
                extended.insert(name.clone(), value);
                next.push(extended);
            }
        }
        combinations = next;
    }

    combinations
}
