//! Cache-or-fetch orchestration for historical candle data.

use crate::domain::candle::Candle;
use crate::domain::error::TradecoreError;
use crate::ports::cache_port::CandleCache;
use crate::ports::market_data_port::{HistoricalRequest, MarketDataPort};

/// Fetch a candle series, answering from the cache when the exact key is
/// present and upserting after a network fetch.
///
/// The key is the full (instrument, interval, from, to) tuple; a repeated
/// call with the identical range is free of network cost, while any change to
/// the range is a miss. There is no freshness check: an identical key always
/// returns the stored payload.
pub fn fetch_candles_cached(
    data_port: &dyn MarketDataPort,
    cache: &dyn CandleCache,
    request: &HistoricalRequest,
) -> Result<Vec<Candle>, TradecoreError> {
    if let Some(candles) = cache.load(request) {
        log::debug!(
            "cache hit for token {} {} ({} candles)",
            request.instrument_token,
            request.interval,
            candles.len()
        );
        return Ok(candles);
    }

    let candles = data_port.fetch_candles(request)?;
    cache.save(request, &candles);
    Ok(candles)
}
