// =============================================================================
// Bybit REST API Client - public V5 market data
// =============================================================================
//
// Only the unauthenticated kline endpoint is used, so no request signing is
// needed.  Bybit returns klines newest-first as arrays of strings:
//
//   [startTime(ms), open, high, low, close, volume, turnover]
//
// Malformed entries are skipped with a warning instead of failing the batch.
// =============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, instrument, warn};

use crate::market_data::align_to_candle_time;
use crate::types::Candle;

const CLIENT_USER_AGENT: &str = "ohlcv-collector/1.0";

/// Interval lengths (minutes) accepted by `/v5/market/kline`.
const MINUTE_INTERVALS: &[u32] = &[1, 3, 5, 15, 30, 60, 120, 240, 360, 720];

/// Bybit public market-data client.
#[derive(Clone)]
pub struct BybitClient {
    base_url: String,
    category: String,
    client: reqwest::Client,
}

impl BybitClient {
    /// Create a new client for `base_url` (e.g. `https://api.bybit.com`) and
    /// product `category` (`linear`, `spot`, `inverse`).
    pub fn new(
        base_url: impl Into<String>,
        category: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .timeout(timeout)
            .build()
            .context("failed to build reqwest client")?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(base_url = %base_url, "BybitClient initialised");

        Ok(Self {
            base_url,
            category: category.into(),
            client,
        })
    }

    /// GET /v5/market/kline.
    ///
    /// Returns candles sorted oldest-first, unique by `candle_time`. An empty
    /// result list is not an error.
    #[instrument(skip(self), name = "bybit::get_klines")]
    pub async fn get_klines(
        &self,
        symbol: &str,
        interval_minutes: u32,
        limit: u32,
    ) -> Result<Vec<Candle>> {
        let interval = interval_param(interval_minutes)?;
        let url = format!(
            "{}/v5/market/kline?category={}&symbol={}&interval={}&limit={}",
            self.base_url, self.category, symbol, interval, limit
        );

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context("GET /v5/market/kline request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Bybit GET /v5/market/kline returned {}: {}", status, text);
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse kline response")?;

        let candles = parse_kline_response(symbol, &body, interval_minutes)?;
        debug!(symbol, interval_minutes, count = candles.len(), "klines fetched");
        Ok(candles)
    }
}

impl std::fmt::Debug for BybitClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BybitClient")
            .field("base_url", &self.base_url)
            .field("category", &self.category)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Response parsing
// -----------------------------------------------------------------------------

/// Map an interval in minutes to Bybit's `interval` query value.
pub fn interval_param(minutes: u32) -> Result<String> {
    match minutes {
        m if MINUTE_INTERVALS.contains(&m) => Ok(m.to_string()),
        1440 => Ok("D".to_string()),
        10080 => Ok("W".to_string()),
        m => anyhow::bail!("unsupported Bybit kline interval: {m} minutes"),
    }
}

/// Turn a `/v5/market/kline` JSON body into ascending candles for `symbol`.
pub fn parse_kline_response(
    symbol: &str,
    body: &serde_json::Value,
    interval_minutes: u32,
) -> Result<Vec<Candle>> {
    let ret_code = body["retCode"].as_i64().unwrap_or(0);
    if ret_code != 0 {
        anyhow::bail!(
            "Bybit kline request rejected (retCode {}): {}",
            ret_code,
            body["retMsg"].as_str().unwrap_or("")
        );
    }

    let Some(raw) = body["result"]["list"].as_array().filter(|l| !l.is_empty()) else {
        debug!(symbol, "kline response has no data");
        return Ok(Vec::new());
    };

    let align_hours = (interval_minutes >= 60 && interval_minutes % 60 == 0)
        .then_some(interval_minutes / 60);

    let mut candles = Vec::with_capacity(raw.len());
    for entry in raw {
        match parse_kline_entry(symbol, entry, align_hours) {
            Ok(candle) => candles.push(candle),
            Err(e) => warn!(symbol, error = %e, "skipping malformed kline entry"),
        }
    }

    candles.sort_by_key(|c| c.candle_time);
    candles.dedup_by_key(|c| c.candle_time);

    if candles.is_empty() {
        debug!(symbol, "all kline entries were filtered out");
    }
    Ok(candles)
}

fn parse_kline_entry(
    symbol: &str,
    entry: &serde_json::Value,
    align_hours: Option<u32>,
) -> Result<Candle> {
    let arr = entry.as_array().context("kline entry is not an array")?;
    if arr.len() < 6 {
        anyhow::bail!("kline entry has {} elements, expected at least 6", arr.len());
    }

    let start_ms = parse_str_i64(&arr[0])?;
    let start: DateTime<Utc> = DateTime::from_timestamp_millis(start_ms)
        .with_context(|| format!("timestamp {start_ms} is out of range"))?;
    let candle_time = match align_hours {
        Some(hours) => align_to_candle_time(start, hours),
        None => start,
    };

    Ok(Candle {
        ticker: symbol.to_string(),
        candle_time,
        open: parse_str_f64(&arr[1])?,
        high: parse_str_f64(&arr[2])?,
        low: parse_str_f64(&arr[3])?,
        close: parse_str_f64(&arr[4])?,
        volume: parse_str_f64(&arr[5])?,
    })
}

/// Parse a JSON value that may be either a string or a number into `f64`.
fn parse_str_f64(val: &serde_json::Value) -> Result<f64> {
    if let Some(s) = val.as_str() {
        s.parse::<f64>()
            .with_context(|| format!("failed to parse '{s}' as f64"))
    } else if let Some(n) = val.as_f64() {
        Ok(n)
    } else {
        anyhow::bail!("expected string or number, got: {val}")
    }
}

/// Parse a JSON value that may be either a string or a number into `i64`.
fn parse_str_i64(val: &serde_json::Value) -> Result<i64> {
    if let Some(s) = val.as_str() {
        s.parse::<i64>()
            .with_context(|| format!("failed to parse '{s}' as i64"))
    } else if let Some(n) = val.as_i64() {
        Ok(n)
    } else {
        anyhow::bail!("expected string or integer, got: {val}")
    }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
