//! SQLite-backed historical data cache.
//!
//! One row per fetched range, keyed by the exact request tuple and holding
//! the JSON-serialized candle series. The port methods log and swallow
//! storage errors so a broken cache degrades to a miss, never a failed fetch.

use crate::domain::candle::Candle;
use crate::domain::error::TradecoreError;
use crate::ports::cache_port::CandleCache;
use crate::ports::config_port::ConfigPort;
use crate::ports::market_data_port::HistoricalRequest;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use std::path::Path;

pub struct SqliteCacheAdapter {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteCacheAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, TradecoreError> {
        let db_path =
            config
                .get_string("cache", "path")
                .ok_or_else(|| TradecoreError::ConfigMissing {
                    section: "cache".into(),
                    key: "path".into(),
                })?;

        // r2d2 asserts max_size > 0, so a misconfigured zero must not reach it.
        let pool_size = config.get_int("cache", "pool_size", 4).max(1) as u32;
        Self::open_with_pool_size(db_path, pool_size)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, TradecoreError> {
        Self::open_with_pool_size(path, 4)
    }

    fn open_with_pool_size<P: AsRef<Path>>(
        path: P,
        pool_size: u32,
    ) -> Result<Self, TradecoreError> {
        let manager = SqliteConnectionManager::file(path);
        let pool =
            Pool::builder()
                .max_size(pool_size)
                .build(manager)
                .map_err(|e: r2d2::Error| TradecoreError::Database {
                    reason: e.to_string(),
                })?;

        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, TradecoreError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| TradecoreError::Database {
                reason: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    pub fn initialize_schema(&self) -> Result<(), TradecoreError> {
        let conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| TradecoreError::Database {
                reason: e.to_string(),
            })?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS historical_data (
                instrument_token INTEGER NOT NULL,
                interval TEXT NOT NULL,
                from_ts INTEGER NOT NULL,
                to_ts INTEGER NOT NULL,
                data TEXT NOT NULL,
                PRIMARY KEY (instrument_token, interval, from_ts, to_ts)
            );
            CREATE INDEX IF NOT EXISTS idx_historical_token_interval
                ON historical_data(instrument_token, interval);",
        )
        .map_err(|e: rusqlite::Error| TradecoreError::DatabaseQuery {
            reason: e.to_string(),
        })?;

        Ok(())
    }

    fn load_entry(
        &self,
        request: &HistoricalRequest,
    ) -> Result<Option<Vec<Candle>>, TradecoreError> {
        let conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| TradecoreError::Database {
                reason: e.to_string(),
            })?;

        let query = "SELECT data FROM historical_data
                     WHERE instrument_token = ?1 AND interval = ?2
                       AND from_ts = ?3 AND to_ts = ?4";

        let payload: Option<String> = conn
            .query_row(
                query,
                params![
                    request.instrument_token,
                    request.interval.as_str(),
                    request.from.timestamp(),
                    request.to.timestamp()
                ],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(TradecoreError::DatabaseQuery {
                    reason: other.to_string(),
                }),
            })?;

        match payload {
            None => Ok(None),
            Some(json) => {
                let candles: Vec<Candle> =
                    serde_json::from_str(&json).map_err(|e| TradecoreError::DatabaseQuery {
                        reason: format!("corrupt cache payload: {e}"),
                    })?;
                Ok(Some(candles))
            }
        }
    }

    fn save_entry(
        &self,
        request: &HistoricalRequest,
        candles: &[Candle],
    ) -> Result<(), TradecoreError> {
        let conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| TradecoreError::Database {
                reason: e.to_string(),
            })?;

        let payload =
            serde_json::to_string(candles).map_err(|e| TradecoreError::DatabaseQuery {
                reason: format!("failed to serialize candles: {e}"),
            })?;

        conn.execute(
            "INSERT OR REPLACE INTO historical_data
                 (instrument_token, interval, from_ts, to_ts, data)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                request.instrument_token,
                request.interval.as_str(),
                request.from.timestamp(),
                request.to.timestamp(),
                payload
            ],
        )
        .map_err(|e: rusqlite::Error| TradecoreError::DatabaseQuery {
            reason: e.to_string(),
        })?;

        Ok(())
    }
}

impl CandleCache for SqliteCacheAdapter {
    fn load(&self, request: &HistoricalRequest) -> Option<Vec<Candle>> {
        match self.load_entry(request) {
            Ok(hit) => hit,
            Err(e) => {
                log::warn!("cache read failed, treating as miss: {e}");
                None
            }
        }
    }

    fn save(&self, request: &HistoricalRequest, candles: &[Candle]) {
        if let Err(e) = self.save_entry(request, candles) {
            log::warn!("cache write failed, entry dropped: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::candle::Interval;
    use chrono::{TimeZone, Utc};

    struct EmptyConfig;

    impl ConfigPort for EmptyConfig {
        fn get_string(&self, _section: &str, _key: &str) -> Option<String> {
            None
        }
        fn get_int(&self, _section: &str, _key: &str, default: i64) -> i64 {
            default
        }
        fn get_double(&self, _section: &str, _key: &str, default: f64) -> f64 {
            default
        }
        fn get_bool(&self, _section: &str, _key: &str, default: bool) -> bool {
            default
        }
    }

    fn request(token: u32, to_minute: u32) -> HistoricalRequest {
        HistoricalRequest {
            instrument_token: token,
            interval: Interval::FiveMinute,
            from: Utc.with_ymd_and_hms(2024, 1, 1, 9, 15, 0).unwrap(),
            to: Utc.with_ymd_and_hms(2024, 1, 1, 15, to_minute, 0).unwrap(),
        }
    }

    fn sample_candles() -> Vec<Candle> {
        vec![
            Candle {
                timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 9, 15, 0).unwrap(),
                open: 100.0,
                high: 101.0,
                low: 99.0,
                close: 100.5,
                volume: 1000,
                oi: Some(500),
            },
            Candle {
                timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 9, 20, 0).unwrap(),
                open: 100.5,
                high: 102.0,
                low: 100.0,
                close: 101.5,
                volume: 1500,
                oi: None,
            },
        ]
    }

    #[test]
    fn from_config_missing_path() {
        let result = SqliteCacheAdapter::from_config(&EmptyConfig);
        match result {
            Err(TradecoreError::ConfigMissing { section, key }) => {
                assert_eq!(section, "cache");
                assert_eq!(key, "path");
            }
            Err(other) => panic!("expected ConfigMissing, got: {other}"),
            Ok(_) => panic!("expected error, got Ok"),
        }
    }

    #[test]
    fn zero_pool_size_is_clamped_not_fatal() {
        struct ZeroPoolConfig;

        impl ConfigPort for ZeroPoolConfig {
            fn get_string(&self, _section: &str, key: &str) -> Option<String> {
                (key == "path").then(|| ":memory:".to_string())
            }
            fn get_int(&self, _section: &str, _key: &str, _default: i64) -> i64 {
                0
            }
            fn get_double(&self, _section: &str, _key: &str, default: f64) -> f64 {
                default
            }
            fn get_bool(&self, _section: &str, _key: &str, default: bool) -> bool {
                default
            }
        }

        let adapter = SqliteCacheAdapter::from_config(&ZeroPoolConfig).unwrap();
        adapter.initialize_schema().unwrap();
    }

    #[test]
    fn in_memory_initialization() {
        let adapter = SqliteCacheAdapter::in_memory().unwrap();
        adapter.initialize_schema().unwrap();
    }

    #[test]
    fn round_trip_preserves_candles() {
        let adapter = SqliteCacheAdapter::in_memory().unwrap();
        adapter.initialize_schema().unwrap();

        let req = request(256265, 30);
        let candles = sample_candles();

        assert!(adapter.load(&req).is_none());
        adapter.save(&req, &candles);
        assert_eq!(adapter.load(&req), Some(candles));
    }

    #[test]
    fn different_range_is_a_miss() {
        let adapter = SqliteCacheAdapter::in_memory().unwrap();
        adapter.initialize_schema().unwrap();

        adapter.save(&request(256265, 30), &sample_candles());
        assert!(adapter.load(&request(256265, 31)).is_none());
        assert!(adapter.load(&request(408065, 30)).is_none());
    }

    #[test]
    fn save_upserts_existing_key() {
        let adapter = SqliteCacheAdapter::in_memory().unwrap();
        adapter.initialize_schema().unwrap();

        let req = request(256265, 30);
        adapter.save(&req, &sample_candles());
        let replacement = vec![sample_candles()[0].clone()];
        adapter.save(&req, &replacement);

        assert_eq!(adapter.load(&req), Some(replacement));
    }

    #[test]
    fn empty_series_is_cached() {
        let adapter = SqliteCacheAdapter::in_memory().unwrap();
        adapter.initialize_schema().unwrap();

        let req = request(256265, 30);
        adapter.save(&req, &[]);
        assert_eq!(adapter.load(&req), Some(Vec::new()));
    }

    #[test]
    fn missing_schema_degrades_to_miss() {
        // No initialize_schema call: reads and writes fail inside, but the
        // port surface stays quiet.
        let adapter = SqliteCacheAdapter::in_memory().unwrap();
        let req = request(256265, 30);
        adapter.save(&req, &sample_candles());
        assert!(adapter.load(&req).is_none());
    }
}
