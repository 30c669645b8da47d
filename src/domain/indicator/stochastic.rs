//! Stochastic oscillator.
//!
//! %K = 100 * (close - lowest low) / (highest high - lowest low) over the
//! %K window; %D is the SMA of %K. A zero high-low range (flat market) makes
//! the quotient NaN, which the rolling %D then carries forward.

use crate::domain::candle::Candle;
use crate::domain::indicator::{latest, rolling_max, rolling_mean, rolling_min};

/// The aligned %K and %D series.
#[derive(Debug, Clone, PartialEq)]
pub struct StochasticSeries {
    pub percent_k: Vec<f64>,
    pub percent_d: Vec<f64>,
}

pub fn stochastic(candles: &[Candle], k_window: usize, d_window: usize) -> StochasticSeries {
    let highs: Vec<f64> = candles.iter().map(|c| c.high).collect();
    let lows: Vec<f64> = candles.iter().map(|c| c.low).collect();

    let highest = rolling_max(&highs, k_window);
    let lowest = rolling_min(&lows, k_window);

    let percent_k: Vec<f64> = candles
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let range = highest[i] - lowest[i];
            if range == 0.0 {
                f64::NAN
            } else {
                100.0 * (c.close - lowest[i]) / range
            }
        })
        .collect();
    let percent_d = rolling_mean(&percent_k, d_window);

    StochasticSeries {
        percent_k,
        percent_d,
    }
}

/// The latest %K / %D pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StochasticPoint {
    pub percent_k: f64,
    pub percent_d: f64,
}

/// Latest oscillator values, the streaming call shape. NaN until warm-up
/// completes.
pub fn stochastic_latest(candles: &[Candle], k_window: usize, d_window: usize) -> StochasticPoint {
    let series = stochastic(candles, k_window, d_window);
    StochasticPoint {
        percent_k: latest(&series.percent_k),
        percent_d: latest(&series.percent_d),
    }
}
