// =============================================================================
// Relative Strength Index (RSI) - Wilder's Smoothing
// =============================================================================
//
// Step 1 - delta_t = close_t - close_{t-1}  (undefined on the first row)
// Step 2 - up = max(delta, 0), down = max(-delta, 0)
// Step 3 - smooth both with Wilder's recurrence (alpha = 1/period), seeded at
//          the first delta rather than an SMA of the first `period` deltas
// Step 4 - RS  = avg_up / avg_down
//          RSI = 100 - 100 / (1 + RS)
//
// avg_down == 0 with avg_up > 0 gives RS = +inf and RSI = 100.
// avg_down == avg_up == 0 gives RS = 0/0, so RSI is NaN.
// =============================================================================

use super::ema::wilder_series;

/// RSI overbought threshold.
pub const RSI_OVERBOUGHT: f64 = 70.0;
/// RSI oversold threshold.
pub const RSI_OVERSOLD: f64 = 30.0;
/// Midline used by the trend heuristic.
pub const RSI_MIDLINE: f64 = 50.0;

/// Full RSI series, one value per close. The first row is always NaN.
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<f64> {
    if closes.is_empty() {
        return Vec::new();
    }

    let (ups, downs): (Vec<f64>, Vec<f64>) = closes
        .windows(2)
        .map(|w| {
            let delta = w[1] - w[0];
            // f64::max would swallow a NaN delta
            if delta.is_nan() {
                (f64::NAN, f64::NAN)
            } else {
                (delta.max(0.0), (-delta).max(0.0))
            }
        })
        .unzip();

    let avg_up = wilder_series(&ups, period);
    let avg_down = wilder_series(&downs, period);

    let mut result = Vec::with_capacity(closes.len());
    result.push(f64::NAN);
    result.extend(
        avg_up
            .iter()
            .zip(&avg_down)
            .map(|(&up, &down)| rsi_from_averages(up, down)),
    );
    result
}

/// Convert average gain / average loss into an RSI value.
fn rsi_from_averages(avg_up: f64, avg_down: f64) -> f64 {
    let rs = avg_up / avg_down;
    100.0 - 100.0 / (1.0 + rs)
}
