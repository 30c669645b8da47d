//! OHLCV candle representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One bar of market data. Immutable once produced; series are ordered by
/// strictly increasing timestamp with no duplicates per (instrument, interval).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oi: Option<i64>,
}

impl Candle {
    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }
}

/// Candle interval accepted by the venue's historical data API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interval {
    Minute,
    ThreeMinute,
    FiveMinute,
    TenMinute,
    FifteenMinute,
    ThirtyMinute,
    SixtyMinute,
    Day,
}

impl Interval {
    /// Wire name used in API paths and cache keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Minute => "minute",
            Interval::ThreeMinute => "3minute",
            Interval::FiveMinute => "5minute",
            Interval::TenMinute => "10minute",
            Interval::FifteenMinute => "15minute",
            Interval::ThirtyMinute => "30minute",
            Interval::SixtyMinute => "60minute",
            Interval::Day => "day",
        }
    }

    pub fn parse(s: &str) -> Option<Interval> {
        match s {
            "minute" => Some(Interval::Minute),
            "3minute" => Some(Interval::ThreeMinute),
            "5minute" => Some(Interval::FiveMinute),
            "10minute" => Some(Interval::TenMinute),
            "15minute" => Some(Interval::FifteenMinute),
            "30minute" => Some(Interval::ThirtyMinute),
            "60minute" => Some(Interval::SixtyMinute),
            "day" => Some(Interval::Day),
            _ => None,
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_candle() -> Candle {
        Candle {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 15, 9, 15, 0).unwrap(),
            open: 100.0,
            high: 110.0,
            low: 90.0,
            close: 105.0,
            volume: 50_000,
            oi: None,
        }
    }

    #[test]
    fn true_range_hl_dominates() {
        let candle = sample_candle();
        // high-low=20, |high-100|=10, |low-100|=10 → 20
        assert!((candle.true_range(100.0) - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_gap_up() {
        let candle = sample_candle();
        // high-low=20, |110-70|=40, |90-70|=20 → 40
        assert!((candle.true_range(70.0) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_gap_down() {
        let candle = sample_candle();
        assert!((candle.true_range(130.0) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn serde_round_trip_preserves_types() {
        let candle = Candle {
            oi: Some(12_345),
            ..sample_candle()
        };
        let json = serde_json::to_string(&candle).unwrap();
        let back: Candle = serde_json::from_str(&json).unwrap();
        assert_eq!(back, candle);
        // Integers must stay integers in the payload.
        assert!(json.contains("\"volume\":50000"));
        assert!(json.contains("\"oi\":12345"));
    }

    #[test]
    fn serde_omits_missing_oi() {
        let json = serde_json::to_string(&sample_candle()).unwrap();
        assert!(!json.contains("oi"));
    }

    #[test]
    fn interval_round_trip() {
        for interval in [
            Interval::Minute,
            Interval::ThreeMinute,
            Interval::FiveMinute,
            Interval::TenMinute,
            Interval::FifteenMinute,
            Interval::ThirtyMinute,
            Interval::SixtyMinute,
            Interval::Day,
        ] {
            assert_eq!(Interval::parse(interval.as_str()), Some(interval));
        }
        assert_eq!(Interval::parse("2minute"), None);
    }
}
