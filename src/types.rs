// =============================================================================
// Shared types used across the OHLCV collector
// =============================================================================
//
// Input flows in as a loosely-typed `RawFrame` (values may be strings, numbers
// or null), is normalised into a `CandleSeries`, and leaves as a `SignalFrame`
// whose rows carry indicators, flags and the raw OHLCV values.
// =============================================================================

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Price/volume columns every input frame must carry.
pub const REQUIRED_COLUMNS: [&str; 5] = ["open", "high", "low", "close", "volume"];

/// Indicator columns in output order.
pub const INDICATOR_COLUMNS: [&str; 15] = [
    "ema12",
    "ema26",
    "macd_line",
    "macd_signal",
    "macd_hist",
    "sma50",
    "rsi14",
    "atr14",
    "roc9",
    "volume_pct_change_1",
    "sma20",
    "std20",
    "bb_upper",
    "bb_lower",
    "vwap",
];

/// Flag columns in output order.
pub const FLAG_COLUMNS: [&str; 11] = [
    "ema12_cross_ema26_up",
    "ema12_cross_ema26_down",
    "close_cross_sma50_up",
    "close_cross_sma50_down",
    "macd_cross_signal_up",
    "macd_cross_signal_down",
    "close_cross_upper_bb",
    "close_cross_lower_bb",
    "rsi_overbought",
    "rsi_oversold",
    "strong_trend",
];

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A single OHLCV candle for one ticker and one aligned time bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub ticker: String,
    pub candle_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Column-oriented input table for one ticker.
///
/// Price columns are kept as JSON values because upstream sources hand them
/// over as strings, numbers or nulls; the normaliser decides what is numeric.
#[derive(Debug, Clone, Default)]
pub struct RawFrame {
    pub ticker: Option<String>,
    pub candle_time: Option<Vec<DateTime<Utc>>>,
    pub columns: BTreeMap<String, Vec<Value>>,
}

impl RawFrame {
    /// Build a frame from already-typed candles. The ticker of the first
    /// candle is used for the whole frame.
    pub fn from_candles(candles: &[Candle]) -> Self {
        let mut columns: BTreeMap<String, Vec<Value>> = REQUIRED_COLUMNS
            .iter()
            .map(|name| (name.to_string(), Vec::with_capacity(candles.len())))
            .collect();

        for c in candles {
            for (name, value) in [
                ("open", c.open),
                ("high", c.high),
                ("low", c.low),
                ("close", c.close),
                ("volume", c.volume),
            ] {
                if let Some(col) = columns.get_mut(name) {
                    col.push(float_value(value));
                }
            }
        }

        Self {
            ticker: candles.first().map(|c| c.ticker.clone()),
            candle_time: Some(candles.iter().map(|c| c.candle_time).collect()),
            columns,
        }
    }

    /// Builder helper: set (or replace) a raw column.
    #[cfg(test)]
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<Value>) -> Self {
        self.columns.insert(name.into(), values);
        self
    }
}

/// JSON has no NaN, so non-finite floats travel as null.
fn float_value(v: f64) -> Value {
    serde_json::Number::from_f64(v)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Normalised, numeric candle series for one ticker (oldest first).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandleSeries {
    pub ticker: Option<String>,
    pub candle_time: Option<Vec<DateTime<Utc>>>,
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
    pub volume: Vec<f64>,
}

impl CandleSeries {
    pub fn len(&self) -> usize {
        self.close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Derived indicators for one row. `NaN` means "not defined yet".
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorRow {
    pub ema12: f64,
    pub ema26: f64,
    pub macd_line: f64,
    pub macd_signal: f64,
    pub macd_hist: f64,
    pub sma50: f64,
    pub rsi14: f64,
    pub atr14: f64,
    pub roc9: f64,
    pub volume_pct_change_1: f64,
    pub sma20: f64,
    pub std20: f64,
    pub bb_upper: f64,
    pub bb_lower: f64,
    pub vwap: f64,
}

impl IndicatorRow {
    /// Values in `INDICATOR_COLUMNS` order.
    pub fn values(&self) -> [f64; 15] {
        [
            self.ema12,
            self.ema26,
            self.macd_line,
            self.macd_signal,
            self.macd_hist,
            self.sma50,
            self.rsi14,
            self.atr14,
            self.roc9,
            self.volume_pct_change_1,
            self.sma20,
            self.std20,
            self.bb_upper,
            self.bb_lower,
            self.vwap,
        ]
    }
}

/// Binary trading flags for one row, each `0` or `1`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FlagRow {
    pub ema12_cross_ema26_up: u8,
    pub ema12_cross_ema26_down: u8,
    pub close_cross_sma50_up: u8,
    pub close_cross_sma50_down: u8,
    pub macd_cross_signal_up: u8,
    pub macd_cross_signal_down: u8,
    pub close_cross_upper_bb: u8,
    pub close_cross_lower_bb: u8,
    pub rsi_overbought: u8,
    pub rsi_oversold: u8,
    pub strong_trend: u8,
}

impl FlagRow {
    /// Values in `FLAG_COLUMNS` order.
    pub fn values(&self) -> [u8; 11] {
        [
            self.ema12_cross_ema26_up,
            self.ema12_cross_ema26_down,
            self.close_cross_sma50_up,
            self.close_cross_sma50_down,
            self.macd_cross_signal_up,
            self.macd_cross_signal_down,
            self.close_cross_upper_bb,
            self.close_cross_lower_bb,
            self.rsi_overbought,
            self.rsi_oversold,
            self.strong_trend,
        ]
    }
}

/// One fully composed output row: keys, indicators, flags, raw OHLCV.
///
/// Serialises in column order; `NaN` becomes JSON `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candle_time: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub indicators: IndicatorRow,
    #[serde(flatten)]
    pub flags: FlagRow,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// The engine's result for one ticker: one row per input row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalFrame {
    pub columns: Vec<&'static str>,
    pub rows: Vec<SignalRow>,
}

impl SignalFrame {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| *c == name)
    }
}
