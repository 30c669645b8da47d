//! CSV candle file adapter, the offline input path for backtests.
//!
//! Expected columns: timestamp, open, high, low, close, volume, and an
//! optional oi. Timestamps accept RFC 3339 or the venue's
//! `YYYY-MM-DD HH:MM:SS` form (taken as UTC); bare dates map to midnight.

use crate::domain::candle::Candle;
use crate::domain::error::TradecoreError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

pub struct CsvCandleAdapter {
    path: PathBuf,
}

impl CsvCandleAdapter {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn load_candles(&self) -> Result<Vec<Candle>, TradecoreError> {
        let content = fs::read_to_string(&self.path).map_err(|e| TradecoreError::DataFetch {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut candles = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| TradecoreError::DataFetch {
                reason: format!("CSV parse error: {}", e),
            })?;

            let timestamp_str = record.get(0).ok_or_else(|| TradecoreError::DataFetch {
                reason: "missing timestamp column".into(),
            })?;
            let timestamp = parse_timestamp(timestamp_str)?;

            let open = parse_field(&record, 1, "open")?;
            let high = parse_field(&record, 2, "high")?;
            let low = parse_field(&record, 3, "low")?;
            let close = parse_field(&record, 4, "close")?;

            let volume: i64 = record
                .get(5)
                .ok_or_else(|| TradecoreError::DataFetch {
                    reason: "missing volume column".into(),
                })?
                .parse()
                .map_err(|e| TradecoreError::DataFetch {
                    reason: format!("invalid volume value: {}", e),
                })?;

            let oi = match record.get(6) {
                None | Some("") => None,
                Some(raw) => Some(raw.parse().map_err(|e| TradecoreError::DataFetch {
                    reason: format!("invalid oi value: {}", e),
                })?),
            };

            candles.push(Candle {
                timestamp,
                open,
                high,
                low,
                close,
                volume,
                oi,
            });
        }

        candles.sort_by_key(|c| c.timestamp);
        Ok(candles)
    }
}

fn parse_field(record: &csv::StringRecord, index: usize, name: &str) -> Result<f64, TradecoreError> {
    record
        .get(index)
        .ok_or_else(|| TradecoreError::DataFetch {
            reason: format!("missing {} column", name),
        })?
        .parse()
        .map_err(|e| TradecoreError::DataFetch {
            reason: format!("invalid {} value: {}", name, e),
        })
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, TradecoreError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(|| {
            TradecoreError::DataFetch {
                reason: format!("invalid date: {raw}"),
            }
        })?;
        return Ok(midnight.and_utc());
    }
    Err(TradecoreError::DataFetch {
        reason: format!("unrecognized timestamp format: {raw}"),
    })
}
