//! Moving Average Convergence Divergence.
//!
//! All three EMAs are the recursive kind seeded with the first observation,
//! so every point is defined; there is no NaN warm-up here.

use crate::domain::indicator::ewm_span_recursive;

/// The three aligned MACD series.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// The latest point of each series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdPoint {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// MACD line (fast EMA minus slow EMA), signal line (EMA of the MACD line)
/// and histogram (line minus signal).
pub fn macd(closes: &[f64], fast: usize, slow: usize, signal_span: usize) -> MacdSeries {
    let fast_ema = ewm_span_recursive(closes, fast);
    let slow_ema = ewm_span_recursive(closes, slow);
    let line: Vec<f64> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| f - s)
        .collect();
    let signal = ewm_span_recursive(&line, signal_span);
    let histogram = line.iter().zip(&signal).map(|(m, s)| m - s).collect();
    MacdSeries {
        macd: line,
        signal,
        histogram,
    }
}

/// Latest MACD point with the conventional 12/26/9 spans. NaN fields when the
/// series is empty.
pub fn macd_latest(closes: &[f64]) -> MacdPoint {
    let series = macd(closes, 12, 26, 9);
    MacdPoint {
        macd: series.macd.last().copied().unwrap_or(f64::NAN),
        signal: series.signal.last().copied().unwrap_or(f64::NAN),
        histogram: series.histogram.last().copied().unwrap_or(f64::NAN),
    }
}
