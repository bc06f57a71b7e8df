// =============================================================================
// Exponential Moving Average (EMA) and Wilder smoothing
// =============================================================================
//
// Both are the same first-order recurrence with a different smoothing factor:
//
//   EMA(span):  alpha = 2 / (span + 1)
//   Wilder(n):  alpha = 1 / n
//
//   y_0 = x_0
//   y_t = y_{t-1} + alpha * (x_t - y_{t-1})
//
// The series is seeded with its first value, not with an SMA warm-up, and the
// output has exactly one value per input.  A NaN input poisons every value
// from that row on, since each value feeds the next.
// =============================================================================

/// Span of the fast MACD average.
pub const EMA_FAST_SPAN: usize = 12;
/// Span of the slow MACD average.
pub const EMA_SLOW_SPAN: usize = 26;
/// Period used by RSI and ATR.
pub const WILDER_PERIOD: usize = 14;

/// Smoothing factor for an EMA of the given span.
pub fn span_alpha(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

/// Exponentially weighted mean seeded at `values[0]`.
///
/// Writing the update as `prev + alpha * (x - prev)` keeps a constant input
/// exactly constant in floating point.
pub fn ewm_series(values: &[f64], alpha: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let mut iter = values.iter();

    let Some(&first) = iter.next() else {
        return out;
    };
    out.push(first);

    let mut prev = first;
    for &x in iter {
        let next = prev + alpha * (x - prev);
        out.push(next);
        prev = next;
    }

    out
}

/// EMA of `values` for the given `span`.
pub fn ema_series(values: &[f64], span: usize) -> Vec<f64> {
    ewm_series(values, span_alpha(span))
}

/// Wilder's smoothing (`alpha = 1 / period`).
pub fn wilder_series(values: &[f64], period: usize) -> Vec<f64> {
    ewm_series(values, 1.0 / period as f64)
}
