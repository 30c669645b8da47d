//! Market data port trait.

use crate::domain::candle::{Candle, Interval};
use crate::domain::error::TradecoreError;
use chrono::{DateTime, Utc};

/// Identifies one historical candle series. Also serves as the cache key:
/// lookups match on all four components exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HistoricalRequest {
    pub instrument_token: u32,
    pub interval: Interval,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

pub trait MarketDataPort {
    fn fetch_candles(&self, request: &HistoricalRequest)
        -> Result<Vec<Candle>, TradecoreError>;
}
