//! Technical indicator implementations.
//!
//! Every indicator supports two call shapes: the full aligned series (batch
//! charting path) and the latest value (streaming path, a `*_latest`
//! function). Warm-up points and zero-range divisions are NaN, never a
//! panic; the whole pipeline is NaN-tolerant.

pub mod sma;
pub mod rsi;
pub mod macd;
pub mod bollinger;
pub mod stochastic;
pub mod atr;

/// Trailing mean over `window` points; NaN for the first `window - 1` and
/// whenever the window contains a NaN.
pub(crate) fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    rolling_apply(values, window, |w| w.iter().sum::<f64>() / w.len() as f64)
}

/// Trailing sample standard deviation (ddof = 1). NaN for window 1.
pub(crate) fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    rolling_apply(values, window, |w| {
        let n = w.len() as f64;
        let mean = w.iter().sum::<f64>() / n;
        let ss = w.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
        (ss / (n - 1.0)).sqrt()
    })
}

pub(crate) fn rolling_min(values: &[f64], window: usize) -> Vec<f64> {
    rolling_apply(values, window, |w| w.iter().copied().fold(f64::MAX, f64::min))
}

pub(crate) fn rolling_max(values: &[f64], window: usize) -> Vec<f64> {
    rolling_apply(values, window, |w| w.iter().copied().fold(f64::MIN, f64::max))
}

fn rolling_apply(values: &[f64], window: usize, f: impl Fn(&[f64]) -> f64) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if window == 0 {
        return out;
    }
    for i in (window - 1)..values.len() {
        let slice = &values[i + 1 - window..=i];
        if slice.iter().any(|v| v.is_nan()) {
            continue;
        }
        out[i] = f(slice);
    }
    out
}

/// Weighted ("adjust") exponential moving average with decay expressed as a
/// center of mass: alpha = 1 / (1 + com). Each output is the decay-weighted
/// mean of all observations so far; NaN until `min_periods` observations.
pub(crate) fn ewm_com_adjusted(values: &[f64], com: f64, min_periods: usize) -> Vec<f64> {
    let alpha = 1.0 / (1.0 + com);
    let decay = 1.0 - alpha;

    let mut out = vec![f64::NAN; values.len()];
    let mut num = 0.0_f64;
    let mut den = 0.0_f64;
    for (i, &value) in values.iter().enumerate() {
        num = value + decay * num;
        den = 1.0 + decay * den;
        if i + 1 >= min_periods {
            out[i] = num / den;
        }
    }
    out
}

/// Recursive ("adjust=false") exponential moving average with decay expressed
/// as a span: alpha = 2 / (span + 1). Seeded with the first observation;
/// defined from index 0.
pub(crate) fn ewm_span_recursive(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span as f64 + 1.0);

    let mut out = Vec::with_capacity(values.len());
    let mut prev = f64::NAN;
    for (i, &value) in values.iter().enumerate() {
        let ema = if i == 0 {
            value
        } else {
            alpha * value + (1.0 - alpha) * prev
        };
        out.push(ema);
        prev = ema;
    }
    out
}

/// Last element of a series, NaN when empty. The streaming call shape.
pub(crate) fn latest(series: &[f64]) -> f64 {
    series.last().copied().unwrap_or(f64::NAN)
}
