//! Average True Range with Wilder's smoothing.
//!
//! The first bar has no previous close, so its true range degrades to
//! high - low. Smoothing matches the RSI averages: decay-weighted mean with
//! center of mass `window - 1`, defined once `window` bars have been seen.

use crate::domain::candle::Candle;
use crate::domain::indicator::{ewm_com_adjusted, latest};

/// Aligned ATR series; NaN for the first `window - 1` points.
pub fn atr(candles: &[Candle], window: usize) -> Vec<f64> {
    if window == 0 {
        return vec![f64::NAN; candles.len()];
    }

    let mut tr = Vec::with_capacity(candles.len());
    for (i, candle) in candles.iter().enumerate() {
        if i == 0 {
            tr.push(candle.high - candle.low);
        } else {
            tr.push(candle.true_range(candles[i - 1].close));
        }
    }

    ewm_com_adjusted(&tr, window as f64 - 1.0, window)
}

/// Latest ATR value; NaN until warm-up completes.
pub fn atr_latest(candles: &[Candle], window: usize) -> f64 {
    latest(&atr(candles, window))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};

    fn candle(i: usize, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 9, 15, 0).unwrap()
                + chrono::Duration::minutes(i as i64),
            open: close,
            high,
            low,
            close,
            volume: 1000,
            oi: None,
        }
    }

    #[test]
    fn flat_market_atr_is_zero() {
        let candles: Vec<Candle> = (0..20).map(|i| candle(i, 100.0, 100.0, 100.0)).collect();
        let out = atr(&candles, 14);
        for v in &out[13..] {
            assert_relative_eq!(*v, 0.0);
        }
    }

    #[test]
    fn constant_range_atr_is_that_range() {
        // Every bar spans 95..105 and closes at 100, so every true range is 10.
        let candles: Vec<Candle> = (0..20).map(|i| candle(i, 105.0, 95.0, 100.0)).collect();
        let out = atr(&candles, 14);
        for v in &out[13..] {
            assert_relative_eq!(*v, 10.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn warmup_is_nan() {
        let candles: Vec<Candle> = (0..20).map(|i| candle(i, 105.0, 95.0, 100.0)).collect();
        let out = atr(&candles, 14);
        for v in &out[..13] {
            assert!(v.is_nan());
        }
        assert!(!out[13].is_nan());
    }

    #[test]
    fn gap_widens_true_range() {
        // Third bar gaps down well below the prior close; the smoothed value
        // must rise above the plain high-low range.
        let mut candles: Vec<Candle> = (0..3).map(|i| candle(i, 102.0, 98.0, 100.0)).collect();
        candles.push(candle(3, 82.0, 78.0, 80.0));
        let out = atr(&candles, 3);
        assert!(out[3] > 4.0, "expected gap to lift ATR, got {}", out[3]);
    }

    #[test]
    fn atr_is_never_negative() {
        let candles: Vec<Candle> = (0..30)
            .map(|i| {
                let base = 100.0 + ((i * 7) % 11) as f64;
                candle(i, base + 2.0, base - 2.0, base)
            })
            .collect();
        for v in atr(&candles, 14) {
            if !v.is_nan() {
                assert!(v >= 0.0);
            }
        }
    }

    #[test]
    fn zero_window_all_nan() {
        let candles: Vec<Candle> = (0..5).map(|i| candle(i, 105.0, 95.0, 100.0)).collect();
        assert!(atr(&candles, 0).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn latest_matches_series_tail() {
        let candles: Vec<Candle> = (0..20)
            .map(|i| candle(i, 105.0 + (i % 3) as f64, 95.0, 100.0))
            .collect();
        let series = atr(&candles, 14);
        assert_relative_eq!(atr_latest(&candles, 14), *series.last().unwrap());
    }
}
