//! HTTP adapter for the brokerage REST API.
//!
//! Implements both trading (order placement and cancellation) and market
//! data (historical candles) against the venue's JSON API. Every request
//! carries the `token api_key:access_token` authorization header and the
//! API version header the venue requires.

use crate::domain::candle::Candle;
use crate::domain::error::TradecoreError;
use crate::domain::order::{OrderId, OrderLeg, Variety};
use crate::ports::config_port::ConfigPort;
use crate::ports::market_data_port::{HistoricalRequest, MarketDataPort};
use crate::ports::order_port::OrderPort;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;

const API_VERSION: &str = "3";
const DEFAULT_BASE_URL: &str = "https://api.kite.trade";
const DEFAULT_TIMEOUT_SECS: u64 = 7;

pub struct HttpBrokerAdapter {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    access_token: String,
}

/// The venue wraps every response in this envelope; `data` is present on
/// success, `message` and `error_type` on failure.
#[derive(Deserialize)]
struct Envelope<T> {
    status: String,
    data: Option<T>,
    message: Option<String>,
    error_type: Option<String>,
}

#[derive(Deserialize)]
struct OrderData {
    order_id: String,
}

#[derive(Deserialize)]
struct HistoricalData {
    candles: Vec<Vec<serde_json::Value>>,
}

impl HttpBrokerAdapter {
    pub fn new(base_url: &str, api_key: &str, access_token: &str) -> Result<Self, TradecoreError> {
        Self::with_timeout(
            base_url,
            api_key,
            access_token,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    pub fn with_timeout(
        base_url: &str,
        api_key: &str,
        access_token: &str,
        timeout: Duration,
    ) -> Result<Self, TradecoreError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TradecoreError::DataFetch {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            access_token: access_token.to_string(),
        })
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, TradecoreError> {
        let api_key =
            config
                .get_string("broker", "api_key")
                .ok_or_else(|| TradecoreError::ConfigMissing {
                    section: "broker".into(),
                    key: "api_key".into(),
                })?;
        let access_token = config.get_string("broker", "access_token").ok_or_else(|| {
            TradecoreError::ConfigMissing {
                section: "broker".into(),
                key: "access_token".into(),
            }
        })?;
        let base_url = config
            .get_string("broker", "base_url")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout = config.get_int("broker", "timeout_secs", DEFAULT_TIMEOUT_SECS as i64);

        Self::with_timeout(
            &base_url,
            &api_key,
            &access_token,
            Duration::from_secs(timeout.max(1) as u64),
        )
    }

    fn auth_header(&self) -> String {
        format!("token {}:{}", self.api_key, self.access_token)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::blocking::RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header("Authorization", self.auth_header())
            .header("X-Kite-Version", API_VERSION)
    }

    fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::blocking::Response,
        on_error: impl Fn(String) -> TradecoreError,
    ) -> Result<T, TradecoreError> {
        let http_status = response.status();
        let body = response.text().map_err(|e| on_error(e.to_string()))?;

        let envelope: Envelope<T> = serde_json::from_str(&body).map_err(|_| {
            on_error(format!(
                "unexpected response (HTTP {}): {}",
                http_status.as_u16(),
                truncate(&body, 200)
            ))
        })?;

        if envelope.status == "success" {
            return envelope
                .data
                .ok_or_else(|| on_error("success response with no data".into()));
        }

        let message = envelope
            .message
            .unwrap_or_else(|| format!("HTTP {}", http_status.as_u16()));
        Err(map_venue_error(envelope.error_type.as_deref(), message, on_error))
    }
}

/// The venue names its failure classes; bad input maps to the local invalid
/// request error, everything else to the caller-supplied operation error.
fn map_venue_error(
    error_type: Option<&str>,
    message: String,
    on_error: impl Fn(String) -> TradecoreError,
) -> TradecoreError {
    match error_type {
        Some("InputException") => TradecoreError::InvalidRequest { reason: message },
        Some(kind) => on_error(format!("{kind}: {message}")),
        None => on_error(message),
    }
}

fn truncate(s: &str, limit: usize) -> &str {
    match s.char_indices().nth(limit) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Timestamps arrive like `2024-01-15T09:15:00+0530` (no colon in the
/// offset, so not RFC 3339).
fn parse_venue_timestamp(raw: &str) -> Result<DateTime<Utc>, TradecoreError> {
    DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z")
        .map(|ts| ts.with_timezone(&Utc))
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|ts| ts.with_timezone(&Utc)))
        .map_err(|e| TradecoreError::DataFetch {
            reason: format!("invalid candle timestamp {raw}: {e}"),
        })
}

/// Candle rows are positional arrays:
/// [timestamp, open, high, low, close, volume] with an optional oi element.
fn parse_candle_row(row: &[serde_json::Value]) -> Result<Candle, TradecoreError> {
    if row.len() < 6 {
        return Err(TradecoreError::DataFetch {
            reason: format!("candle row has {} elements, expected at least 6", row.len()),
        });
    }

    let timestamp_str = row[0].as_str().ok_or_else(|| TradecoreError::DataFetch {
        reason: "candle timestamp is not a string".into(),
    })?;
    let timestamp = parse_venue_timestamp(timestamp_str)?;

    let number = |index: usize, name: &str| -> Result<f64, TradecoreError> {
        row[index].as_f64().ok_or_else(|| TradecoreError::DataFetch {
            reason: format!("candle {name} is not a number"),
        })
    };

    Ok(Candle {
        timestamp,
        open: number(1, "open")?,
        high: number(2, "high")?,
        low: number(3, "low")?,
        close: number(4, "close")?,
        volume: row[5].as_i64().ok_or_else(|| TradecoreError::DataFetch {
            reason: "candle volume is not an integer".into(),
        })?,
        oi: row.get(6).and_then(|v| v.as_i64()),
    })
}

impl OrderPort for HttpBrokerAdapter {
    fn place(&self, leg: &OrderLeg) -> Result<OrderId, TradecoreError> {
        leg.validate()?;

        let mut params: Vec<(&str, String)> = vec![
            ("tradingsymbol", leg.tradingsymbol.clone()),
            ("exchange", leg.exchange.as_str().to_string()),
            ("transaction_type", leg.transaction_type.as_str().to_string()),
            ("quantity", leg.quantity.to_string()),
            ("order_type", leg.order_type.as_str().to_string()),
            ("product", leg.product.as_str().to_string()),
        ];
        if let Some(price) = leg.price {
            params.push(("price", price.to_string()));
        }
        if let Some(trigger) = leg.trigger_price {
            params.push(("trigger_price", trigger.to_string()));
        }
        if let Some(validity) = leg.validity {
            params.push(("validity", validity.as_str().to_string()));
        }
        if let Some(disclosed) = leg.disclosed_quantity {
            params.push(("disclosed_quantity", disclosed.to_string()));
        }
        if let Some(tag) = &leg.tag {
            params.push(("tag", tag.clone()));
        }

        let response = self
            .request(
                reqwest::Method::POST,
                &format!("/orders/{}", leg.variety.as_str()),
            )
            .form(&params)
            .send()
            .map_err(|e| TradecoreError::OrderPlacement {
                reason: format!("{}: {}", leg.tradingsymbol, e),
            })?;

        let data: OrderData = Self::decode(response, |reason| TradecoreError::OrderPlacement {
            reason: format!("{}: {}", leg.tradingsymbol, reason),
        })?;

        log::info!(
            "placed {} {} x{} as order {}",
            leg.transaction_type,
            leg.tradingsymbol,
            leg.quantity,
            data.order_id
        );
        Ok(data.order_id)
    }

    fn cancel(&self, variety: Variety, order_id: &OrderId) -> Result<OrderId, TradecoreError> {
        let response = self
            .request(
                reqwest::Method::DELETE,
                &format!("/orders/{}/{}", variety.as_str(), order_id),
            )
            .send()
            .map_err(|e| TradecoreError::OrderPlacement {
                reason: format!("cancel {order_id}: {e}"),
            })?;

        let data: OrderData = Self::decode(response, |reason| TradecoreError::OrderPlacement {
            reason: format!("cancel {order_id}: {reason}"),
        })?;

        log::info!("cancelled order {}", data.order_id);
        Ok(data.order_id)
    }
}

impl MarketDataPort for HttpBrokerAdapter {
    fn fetch_candles(&self, request: &HistoricalRequest) -> Result<Vec<Candle>, TradecoreError> {
        let path = format!(
            "/instruments/historical/{}/{}",
            request.instrument_token, request.interval
        );
        let from = request.from.format("%Y-%m-%d %H:%M:%S").to_string();
        let to = request.to.format("%Y-%m-%d %H:%M:%S").to_string();

        let response = self
            .request(reqwest::Method::GET, &path)
            .query(&[("from", from.as_str()), ("to", to.as_str()), ("oi", "1")])
            .send()
            .map_err(|e| TradecoreError::DataFetch {
                reason: e.to_string(),
            })?;

        let data: HistoricalData = Self::decode(response, |reason| TradecoreError::DataFetch {
            reason,
        })?;

        data.candles
            .iter()
            .map(|row| parse_candle_row(row))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn venue_timestamp_offset_without_colon() {
        let ts = parse_venue_timestamp("2024-01-15T09:15:00+0530").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 1, 15, 3, 45, 0).unwrap());
    }

    #[test]
    fn venue_timestamp_rfc3339_also_accepted() {
        let ts = parse_venue_timestamp("2024-01-15T09:15:00+05:30").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 1, 15, 3, 45, 0).unwrap());
    }

    #[test]
    fn candle_row_with_oi() {
        let row = vec![
            json!("2024-01-15T09:15:00+0530"),
            json!(100.0),
            json!(110.0),
            json!(90.0),
            json!(105.0),
            json!(50000),
            json!(1200),
        ];
        let candle = parse_candle_row(&row).unwrap();
        assert_eq!(candle.open, 100.0);
        assert_eq!(candle.volume, 50000);
        assert_eq!(candle.oi, Some(1200));
    }

    #[test]
    fn candle_row_without_oi() {
        let row = vec![
            json!("2024-01-15T09:15:00+0530"),
            json!(100.0),
            json!(110.0),
            json!(90.0),
            json!(105.0),
            json!(50000),
        ];
        let candle = parse_candle_row(&row).unwrap();
        assert_eq!(candle.oi, None);
    }

    #[test]
    fn short_candle_row_rejected() {
        let row = vec![json!("2024-01-15T09:15:00+0530"), json!(100.0)];
        assert!(matches!(
            parse_candle_row(&row),
            Err(TradecoreError::DataFetch { .. })
        ));
    }

    #[test]
    fn input_exception_maps_to_invalid_request() {
        let err = map_venue_error(
            Some("InputException"),
            "Invalid order type".into(),
            |reason| TradecoreError::OrderPlacement { reason },
        );
        assert!(matches!(err, TradecoreError::InvalidRequest { .. }));
    }

    #[test]
    fn other_exceptions_keep_operation_error() {
        let err = map_venue_error(
            Some("OrderException"),
            "Insufficient margin".into(),
            |reason| TradecoreError::OrderPlacement { reason },
        );
        match err {
            TradecoreError::OrderPlacement { reason } => {
                assert!(reason.contains("OrderException"));
                assert!(reason.contains("Insufficient margin"));
            }
            other => panic!("expected OrderPlacement, got {other:?}"),
        }
    }

    #[test]
    fn invalid_placement_fails_before_any_request() {
        // Unroutable base URL: a network call would error differently, but
        // validation rejects the leg first.
        let adapter = HttpBrokerAdapter::new("http://127.0.0.1:0", "key", "token").unwrap();
        let leg = OrderLeg::market(
            "",
            crate::domain::order::Exchange::Nse,
            crate::domain::order::TransactionType::Buy,
            1,
            crate::domain::order::Product::Cnc,
        );
        assert!(matches!(
            adapter.place(&leg),
            Err(TradecoreError::InvalidRequest { .. })
        ));
    }

    #[test]
    fn auth_header_shape() {
        let adapter = HttpBrokerAdapter::new("https://api.kite.trade/", "key", "token").unwrap();
        assert_eq!(adapter.auth_header(), "token key:token");
        assert_eq!(adapter.base_url, "https://api.kite.trade");
    }
}
