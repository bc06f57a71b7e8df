//! Per-candle VWAP proxy.
//!
//! This is the typical price of a single candle, `(high + low + close) / 3`,
//! reported only when the candle traded. It is not a cumulative session VWAP.

/// Typical price per candle; NaN where volume is zero or missing.
pub fn candle_vwap(high: &[f64], low: &[f64], close: &[f64], volume: &[f64]) -> Vec<f64> {
    high.iter()
        .zip(low)
        .zip(close)
        .zip(volume)
        .map(|(((h, l), c), v)| {
            if *v == 0.0 || v.is_nan() {
                f64::NAN
            } else {
                (h + l + c) / 3.0
            }
        })
        .collect()
}
