// =============================================================================
// Moving Average Convergence Divergence (MACD)
// =============================================================================
//
//   line      = EMA12(close) - EMA26(close)
//   signal    = EMA9(line)
//   histogram = line - signal
// =============================================================================

use super::ema::ema_series;

/// Span of the signal-line EMA.
pub const MACD_SIGNAL_SPAN: usize = 9;

/// MACD line, signal and histogram, one value per input row.
#[derive(Debug, Clone, Default)]
pub struct MacdSeries {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// Build the MACD series from precomputed fast and slow EMAs.
pub fn calculate_macd(ema_fast: &[f64], ema_slow: &[f64]) -> MacdSeries {
    let line: Vec<f64> = ema_fast
        .iter()
        .zip(ema_slow)
        .map(|(fast, slow)| fast - slow)
        .collect();
    let signal = ema_series(&line, MACD_SIGNAL_SPAN);
    let histogram = line.iter().zip(&signal).map(|(l, s)| l - s).collect();

    MacdSeries {
        line,
        signal,
        histogram,
    }
}
