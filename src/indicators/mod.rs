// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, causal, whole-series implementations: every function takes the full
// oldest-first history and returns one value per input row, where the value
// at row `t` depends only on rows `0..=t`.  Undefined values are NaN; no
// indicator ever substitutes a default for missing history.

pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod roc;
pub mod rsi;
pub mod sma;
pub mod vwap;

use crate::types::{CandleSeries, IndicatorRow};

use self::bollinger::BOLLINGER_NUM_STD;
use self::ema::{EMA_FAST_SPAN, EMA_SLOW_SPAN, WILDER_PERIOD};
use self::roc::ROC_PERIOD;
use self::sma::{SMA_LONG_WINDOW, SMA_SHORT_WINDOW};

/// Compute every indicator for a normalised series.
pub fn compute_indicators(series: &CandleSeries) -> Vec<IndicatorRow> {
    if series.is_empty() {
        return Vec::new();
    }
    let close = &series.close;

    let ema12 = ema::ema_series(close, EMA_FAST_SPAN);
    let ema26 = ema::ema_series(close, EMA_SLOW_SPAN);
    let macd = macd::calculate_macd(&ema12, &ema26);

    let sma50 = sma::rolling_mean(close, SMA_LONG_WINDOW);
    let sma20 = sma::rolling_mean(close, SMA_SHORT_WINDOW);
    let std20 = sma::rolling_std(close, SMA_SHORT_WINDOW);
    let bands = bollinger::calculate_bollinger(&sma20, &std20, BOLLINGER_NUM_STD);

    let rsi14 = rsi::calculate_rsi(close, WILDER_PERIOD);
    let atr14 = atr::calculate_atr(&series.high, &series.low, close, WILDER_PERIOD);
    let roc9 = roc::calculate_roc(close, ROC_PERIOD);
    let volume_change = roc::pct_change(&series.volume, 1);
    let vwap = vwap::candle_vwap(&series.high, &series.low, close, &series.volume);

    (0..series.len())
        .map(|i| IndicatorRow {
            ema12: ema12[i],
            ema26: ema26[i],
            macd_line: macd.line[i],
            macd_signal: macd.signal[i],
            macd_hist: macd.histogram[i],
            sma50: sma50[i],
            rsi14: rsi14[i],
            atr14: atr14[i],
            roc9: roc9[i],
            volume_pct_change_1: volume_change[i],
            sma20: sma20[i],
            std20: std20[i],
            bb_upper: bands.upper[i],
            bb_lower: bands.lower[i],
            vwap: vwap[i],
        })
        .collect()
}
