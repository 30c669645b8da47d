//! Relative Strength Index with Wilder's smoothing.
//!
//! Average gain/loss are decay-weighted means with center of mass
//! `window - 1` and `window` minimum observations, so the first defined
//! value sits at index `window` (the series needs `window + 1` prices).
//! A zero average loss saturates the RSI at 100.

use crate::domain::indicator::{ewm_com_adjusted, latest};

/// Aligned RSI series; NaN for the first `window` points.
pub fn rsi(closes: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || closes.len() < 2 {
        return vec![f64::NAN; closes.len()];
    }

    let mut gains = Vec::with_capacity(closes.len() - 1);
    let mut losses = Vec::with_capacity(closes.len() - 1);
    for pair in closes.windows(2) {
        let change = pair[1] - pair[0];
        gains.push(if change > 0.0 { change } else { 0.0 });
        losses.push(if change < 0.0 { -change } else { 0.0 });
    }

    let com = window as f64 - 1.0;
    let avg_gain = ewm_com_adjusted(&gains, com, window);
    let avg_loss = ewm_com_adjusted(&losses, com, window);

    let mut out = vec![f64::NAN; closes.len()];
    for i in 0..gains.len() {
        if avg_gain[i].is_nan() || avg_loss[i].is_nan() {
            continue;
        }
        out[i + 1] = if avg_loss[i] == 0.0 {
            100.0
        } else {
            100.0 - 100.0 / (1.0 + avg_gain[i] / avg_loss[i])
        };
    }
    out
}

/// Latest RSI value; NaN until warm-up completes.
pub fn rsi_latest(closes: &[f64], window: usize) -> f64 {
    latest(&rsi(closes, window))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn warmup_is_nan() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + (i % 5) as f64).collect();
        let out = rsi(&closes, 14);
        for v in &out[..14] {
            assert!(v.is_nan());
        }
        assert!(!out[14].is_nan());
    }

    #[test]
    fn all_gains_saturate_at_100() {
        let closes: Vec<f64> = (0..16).map(|i| 100.0 + i as f64).collect();
        let out = rsi(&closes, 14);
        assert_relative_eq!(out[15], 100.0);
    }

    #[test]
    fn all_losses_drive_to_zero() {
        let closes: Vec<f64> = (0..16).map(|i| 100.0 - i as f64).collect();
        let out = rsi(&closes, 14);
        assert_relative_eq!(out[15], 0.0);
    }

    #[test]
    fn flat_series_saturates_not_panics() {
        // Zero gains and zero losses: avg_loss == 0 wins, RSI pegs at 100.
        let closes = [100.0; 20];
        let out = rsi(&closes, 14);
        assert_relative_eq!(out[19], 100.0);
    }

    #[test]
    fn stays_in_range() {
        let closes: Vec<f64> = (0..40)
            .map(|i| 100.0 + ((i * 7) % 13) as f64 - 6.0)
            .collect();
        for v in rsi(&closes, 14) {
            if !v.is_nan() {
                assert!((0.0..=100.0).contains(&v), "RSI {v} out of range");
            }
        }
    }

    #[test]
    fn short_series_all_nan() {
        assert!(rsi(&[100.0], 14).iter().all(|v| v.is_nan()));
        assert!(rsi(&[], 14).is_empty());
    }

    #[test]
    fn zero_window_all_nan() {
        assert!(rsi(&[1.0, 2.0, 3.0], 0).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn latest_matches_series_tail() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + ((i * 3) % 7) as f64).collect();
        let series = rsi(&closes, 14);
        assert_relative_eq!(rsi_latest(&closes, 14), *series.last().unwrap());
    }
}
