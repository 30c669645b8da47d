#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use std::cell::RefCell;
use tradecore::domain::candle::Candle;
use tradecore::domain::error::TradecoreError;
use tradecore::domain::order::{OrderId, OrderLeg, Variety};
use tradecore::ports::market_data_port::{HistoricalRequest, MarketDataPort};
use tradecore::ports::order_port::OrderPort;

pub fn minute(i: usize) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 9, 15, 0).unwrap() + chrono::Duration::minutes(i as i64)
}

pub fn make_candle(i: usize, close: f64) -> Candle {
    Candle {
        timestamp: minute(i),
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 1000,
        oi: None,
    }
}

pub fn make_series(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_candle(i, close))
        .collect()
}

/// CSV content in the shape the candle file adapter reads.
pub fn candles_as_csv(candles: &[Candle]) -> String {
    let mut out = String::from("timestamp,open,high,low,close,volume\n");
    for c in candles {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            c.timestamp.format("%Y-%m-%d %H:%M:%S"),
            c.open,
            c.high,
            c.low,
            c.close,
            c.volume
        ));
    }
    out
}

/// Order port that records calls and fails placement at chosen indices.
pub struct MockOrderPort {
    pub places: RefCell<Vec<OrderLeg>>,
    pub cancels: RefCell<Vec<(Variety, OrderId)>>,
    pub fail_place_at: Vec<usize>,
}

impl MockOrderPort {
    pub fn new() -> Self {
        Self {
            places: RefCell::new(Vec::new()),
            cancels: RefCell::new(Vec::new()),
            fail_place_at: Vec::new(),
        }
    }

    pub fn failing_at(indices: &[usize]) -> Self {
        Self {
            fail_place_at: indices.to_vec(),
            ..Self::new()
        }
    }
}

impl OrderPort for MockOrderPort {
    fn place(&self, leg: &OrderLeg) -> Result<OrderId, TradecoreError> {
        let index = self.places.borrow().len();
        self.places.borrow_mut().push(leg.clone());
        if self.fail_place_at.contains(&index) {
            return Err(TradecoreError::OrderPlacement {
                reason: format!("{}: rejected by venue", leg.tradingsymbol),
            });
        }
        Ok(format!("order-{index}"))
    }

    fn cancel(&self, variety: Variety, order_id: &OrderId) -> Result<OrderId, TradecoreError> {
        self.cancels.borrow_mut().push((variety, order_id.clone()));
        Ok(order_id.clone())
    }
}

/// Market data port serving a fixed series and counting fetches.
pub struct FixedDataPort {
    pub candles: Vec<Candle>,
    pub fetches: RefCell<usize>,
}

impl FixedDataPort {
    pub fn new(candles: Vec<Candle>) -> Self {
        Self {
            candles,
            fetches: RefCell::new(0),
        }
    }
}

impl MarketDataPort for FixedDataPort {
    fn fetch_candles(&self, _request: &HistoricalRequest) -> Result<Vec<Candle>, TradecoreError> {
        *self.fetches.borrow_mut() += 1;
        Ok(self.candles.clone())
    }
}
