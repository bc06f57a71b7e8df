// =============================================================================
// Flag Generator
// =============================================================================
//
// Turns indicators and crossovers into 0/1 flags.  Flags have no "undefined"
// state: a NaN operand simply fails the comparison and the flag is 0.
// =============================================================================

use crate::indicators::rsi::{RSI_MIDLINE, RSI_OVERBOUGHT, RSI_OVERSOLD};
use crate::types::{CandleSeries, FlagRow, IndicatorRow};

use super::cross::detect_cross;

/// Derive one `FlagRow` per row of `series`.
pub fn generate_flags(series: &CandleSeries, indicators: &[IndicatorRow]) -> Vec<FlagRow> {
    let close = &series.close;
    let column = |f: fn(&IndicatorRow) -> f64| indicators.iter().map(f).collect::<Vec<f64>>();

    let ema12 = column(|r| r.ema12);
    let ema26 = column(|r| r.ema26);
    let sma50 = column(|r| r.sma50);
    let macd_line = column(|r| r.macd_line);
    let macd_signal = column(|r| r.macd_signal);
    let bb_upper = column(|r| r.bb_upper);
    let bb_lower = column(|r| r.bb_lower);

    let ema_cross = detect_cross(&ema12, &ema26);
    let sma_cross = detect_cross(close, &sma50);
    let macd_cross = detect_cross(&macd_line, &macd_signal);
    let upper_cross = detect_cross(close, &bb_upper);
    let lower_cross = detect_cross(close, &bb_lower);

    indicators
        .iter()
        .zip(close)
        .enumerate()
        .map(|(i, (row, &c))| FlagRow {
            ema12_cross_ema26_up: u8::from(ema_cross.up[i]),
            ema12_cross_ema26_down: u8::from(ema_cross.down[i]),
            close_cross_sma50_up: u8::from(sma_cross.up[i]),
            close_cross_sma50_down: u8::from(sma_cross.down[i]),
            macd_cross_signal_up: u8::from(macd_cross.up[i]),
            macd_cross_signal_down: u8::from(macd_cross.down[i]),
            close_cross_upper_bb: u8::from(upper_cross.up[i]),
            close_cross_lower_bb: u8::from(lower_cross.down[i]),
            rsi_overbought: u8::from(row.rsi14 > RSI_OVERBOUGHT),
            rsi_oversold: u8::from(row.rsi14 < RSI_OVERSOLD),
            strong_trend: u8::from(is_strong_trend(row, c)),
        })
        .collect()
}

/// Bullish or bearish agreement of MACD histogram, RSI and price vs SMA50.
fn is_strong_trend(row: &IndicatorRow, close: f64) -> bool {
    let bullish = row.macd_hist > 0.0 && row.rsi14 > RSI_MIDLINE && close > row.sma50;
    let bearish = row.macd_hist < 0.0 && row.rsi14 < RSI_MIDLINE && close < row.sma50;
    bullish || bearish
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::compute_indicators;

    fn series(closes: &[f64]) -> CandleSeries {
        CandleSeries {
            ticker: None,
            candle_time: None,
            open: closes.to_vec(),
            high: closes.iter().map(|c| c + 0.5).collect(),
            low: closes.iter().map(|c| c - 0.5).collect(),
            close: closes.to_vec(),
            volume: vec![1.0; closes.len()],
        }
    }

    fn flags_for(closes: &[f64]) -> Vec<FlagRow> {
        let s = series(closes);
        let ind = compute_indicators(&s);
        generate_flags(&s, &ind)
    }

    fn row(macd_hist: f64, rsi14: f64, sma50: f64) -> IndicatorRow {
        IndicatorRow {
            ema12: f64::NAN,
            ema26: f64::NAN,
            macd_line: f64::NAN,
            macd_signal: f64::NAN,
            macd_hist,
            sma50,
            rsi14,
            atr14: f64::NAN,
            roc9: f64::NAN,
            volume_pct_change_1: f64::NAN,
            sma20: f64::NAN,
            std20: f64::NAN,
            bb_upper: f64::NAN,
            bb_lower: f64::NAN,
            vwap: f64::NAN,
        }
    }

    #[test]
    fn single_row_has_no_flags() {
        assert_eq!(flags_for(&[100.0]), vec![FlagRow::default()]);
    }

    #[test]
    fn constant_series_raises_nothing() {
        let flags = flags_for(&[100.0; 100]);
        assert!(flags.iter().all(|f| *f == FlagRow::default()));
    }

    #[test]
    fn rally_after_flat_crosses_up() {
        let mut closes = vec![100.0; 30];
        closes.extend((1..=10).map(|x| 100.0 + x as f64 * 2.0));
        let flags = flags_for(&closes);

        // first rising bar: close jumps above SMA50, EMA12 above EMA26,
        // MACD above its signal, and above the upper band
        let f = flags[30];
        assert_eq!(f.close_cross_sma50_up, 1);
        assert_eq!(f.ema12_cross_ema26_up, 1);
        assert_eq!(f.macd_cross_signal_up, 1);
        assert_eq!(f.close_cross_upper_bb, 1);
        assert_eq!(f.close_cross_lower_bb, 0);
        assert_eq!(f.rsi_overbought, 1);
        assert_eq!(f.strong_trend, 1);
    }

    #[test]
    fn selloff_after_flat_crosses_down() {
        let mut closes = vec![100.0; 30];
        closes.extend((1..=10).map(|x| 100.0 - x as f64 * 2.0));
        let flags = flags_for(&closes);

        let f = flags[30];
        assert_eq!(f.close_cross_sma50_down, 1);
        assert_eq!(f.ema12_cross_ema26_down, 1);
        assert_eq!(f.macd_cross_signal_down, 1);
        assert_eq!(f.close_cross_lower_bb, 1);
        assert_eq!(f.close_cross_upper_bb, 0);
        assert_eq!(f.rsi_oversold, 1);
        assert_eq!(f.strong_trend, 1);
    }

    #[test]
    fn strong_trend_requires_agreement() {
        assert!(is_strong_trend(&row(1.0, 60.0, 90.0), 100.0));
        assert!(is_strong_trend(&row(-1.0, 40.0, 110.0), 100.0));
        assert!(!is_strong_trend(&row(1.0, 40.0, 90.0), 100.0));
        assert!(!is_strong_trend(&row(1.0, 60.0, 110.0), 100.0));
        assert!(!is_strong_trend(&row(0.0, 60.0, 90.0), 100.0));
    }

    #[test]
    fn nan_operands_give_zero() {
        assert!(!is_strong_trend(&row(f64::NAN, 60.0, 90.0), 100.0));
        assert!(!is_strong_trend(&row(1.0, f64::NAN, 90.0), 100.0));
        assert!(!is_strong_trend(&row(1.0, 60.0, 90.0), f64::NAN));
    }

    #[test]
    fn nan_close_clears_flags_on_that_row() {
        let mut closes: Vec<f64> = (0..20).map(|x| 100.0 + (x as f64 * 0.9).sin() * 5.0).collect();
        closes[5] = f64::NAN;
        let flags = flags_for(&closes);
        assert_eq!(flags[5], FlagRow::default());
    }
}
