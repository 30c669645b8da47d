//! Simple Moving Average.

use crate::domain::indicator::{latest, rolling_mean};

/// Aligned SMA series; NaN for the first `window - 1` points.
pub fn sma(closes: &[f64], window: usize) -> Vec<f64> {
    rolling_mean(closes, window)
}

/// Latest SMA value, the streaming call shape. NaN until warm-up completes.
pub fn sma_latest(closes: &[f64], window: usize) -> f64 {
    latest(&sma(closes, window))
}
