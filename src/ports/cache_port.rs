//! Candle cache port trait.

use crate::domain::candle::Candle;
use crate::ports::market_data_port::HistoricalRequest;

/// Durable exact-key candle cache.
///
/// Implementations log and swallow storage errors: a failed read is a miss
/// and a failed write is dropped, so the caller always falls through to the
/// network path instead of failing.
pub trait CandleCache {
    /// Exact match on all key components; no range subsumption.
    fn load(&self, request: &HistoricalRequest) -> Option<Vec<Candle>>;

    /// Upserts; last writer wins. No TTL.
    fn save(&self, request: &HistoricalRequest, candles: &[Candle]);
}
