// =============================================================================
// Average True Range (ATR) - Wilder's Smoothing Method
// =============================================================================
//
// True Range (TR) for each bar:
//   TR = max(|H - L|, |H - prevClose|, |L - prevClose|)
//
// The first bar has no previous close, so its TR is just |H - L|.
//
// ATR is the Wilder-smoothed TR (alpha = 1/period), seeded at the first TR:
//   ATR_0 = TR_0
//   ATR_t = ATR_{t-1} + (TR_t - ATR_{t-1}) / period
//
// Default period: 14
// =============================================================================

use super::ema::wilder_series;

/// True range per bar. Any NaN operand makes that bar's TR NaN.
pub fn true_range(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    let n = high.len().min(low.len()).min(close.len());
    let mut tr = Vec::with_capacity(n);

    for i in 0..n {
        let hl = (high[i] - low[i]).abs();
        if i == 0 {
            tr.push(hl);
            continue;
        }

        let prev_close = close[i - 1];
        let hc = (high[i] - prev_close).abs();
        let lc = (low[i] - prev_close).abs();

        // f64::max ignores NaN operands, which would hide missing data.
        if hl.is_nan() || hc.is_nan() || lc.is_nan() {
            tr.push(f64::NAN);
        } else {
            tr.push(hl.max(hc).max(lc));
        }
    }

    tr
}

/// ATR series, one value per bar (oldest first).
pub fn calculate_atr(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    wilder_series(&true_range(high, low, close), period)
}
