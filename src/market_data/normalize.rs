// =============================================================================
// Series Normaliser
// =============================================================================
//
// Coerces the raw OHLCV columns of a `RawFrame` into `f64`.  Anything that is
// not a number (or a string holding one) becomes NaN instead of being dropped,
// so every row stays aligned with its `candle_time`.
// =============================================================================

use serde_json::Value;

use crate::error::EngineError;
use crate::types::{CandleSeries, RawFrame, REQUIRED_COLUMNS};

/// Produce a numeric copy of `frame`. The input is never modified.
///
/// # Errors
/// - `MissingColumn` when any of `open/high/low/close/volume` is absent.
/// - `ColumnLengthMismatch` when a required column (or `candle_time`) does not
///   have the same number of rows as `open`.
pub fn normalize(frame: &RawFrame) -> Result<CandleSeries, EngineError> {
    let mut numeric: Vec<Vec<f64>> = Vec::with_capacity(REQUIRED_COLUMNS.len());
    let mut expected: Option<usize> = None;

    for column in REQUIRED_COLUMNS {
        let raw = frame
            .columns
            .get(column)
            .ok_or(EngineError::MissingColumn { column })?;

        let len = *expected.get_or_insert(raw.len());
        if raw.len() != len {
            return Err(EngineError::ColumnLengthMismatch {
                column,
                expected: len,
                found: raw.len(),
            });
        }

        numeric.push(raw.iter().map(coerce_f64).collect());
    }

    let len = expected.unwrap_or(0);
    if let Some(times) = &frame.candle_time {
        if times.len() != len {
            return Err(EngineError::ColumnLengthMismatch {
                column: "candle_time",
                expected: len,
                found: times.len(),
            });
        }
    }

    let mut cols = numeric.into_iter();
    let mut next = || cols.next().unwrap_or_default();

    Ok(CandleSeries {
        ticker: frame.ticker.clone(),
        candle_time: frame.candle_time.clone(),
        open: next(),
        high: next(),
        low: next(),
        close: next(),
        volume: next(),
    })
}

/// Lenient numeric coercion: numbers pass through, numeric strings are
/// parsed, everything else is NaN.
pub fn coerce_f64(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}
