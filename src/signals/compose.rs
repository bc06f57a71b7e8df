// =============================================================================
// Output Composer
// =============================================================================
//
// Joins keys, indicators, flags and raw OHLCV into one row per input row.
// Key columns appear only if the input carried them.
// =============================================================================

use crate::types::{
    CandleSeries, FlagRow, IndicatorRow, SignalFrame, SignalRow, FLAG_COLUMNS, INDICATOR_COLUMNS,
    REQUIRED_COLUMNS,
};

/// Ordered output column names for a series.
pub fn output_columns(series: &CandleSeries) -> Vec<&'static str> {
    let mut columns = Vec::with_capacity(2 + INDICATOR_COLUMNS.len() + FLAG_COLUMNS.len() + 5);
    if series.ticker.is_some() {
        columns.push("ticker");
    }
    if series.candle_time.is_some() {
        columns.push("candle_time");
    }
    columns.extend(INDICATOR_COLUMNS);
    columns.extend(FLAG_COLUMNS);
    columns.extend(REQUIRED_COLUMNS);
    columns
}

/// Assemble the final frame. Row order and count follow `series`.
pub fn compose(series: &CandleSeries, indicators: &[IndicatorRow], flags: &[FlagRow]) -> SignalFrame {
    let rows = indicators
        .iter()
        .zip(flags)
        .enumerate()
        .map(|(i, (ind, flag))| SignalRow {
            ticker: series.ticker.clone(),
            candle_time: series
                .candle_time
                .as_ref()
                .and_then(|times| times.get(i).copied()),
            indicators: *ind,
            flags: *flag,
            open: series.open[i],
            high: series.high[i],
            low: series.low[i],
            close: series.close[i],
            volume: series.volume[i],
        })
        .collect();

    SignalFrame {
        columns: output_columns(series),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::compute_indicators;
    use crate::signals::flags::generate_flags;
    use chrono::{Duration, TimeZone, Utc};

    fn series(n: usize, keyed: bool) -> CandleSeries {
        let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let closes: Vec<f64> = (0..n).map(|i| 10.0 + i as f64).collect();
        CandleSeries {
            ticker: keyed.then(|| "ETHUSDT".to_string()),
            candle_time: keyed.then(|| (0..n).map(|i| t0 + Duration::hours(i as i64)).collect()),
            open: closes.clone(),
            high: closes.iter().map(|c| c + 1.0).collect(),
            low: closes.iter().map(|c| c - 1.0).collect(),
            close: closes,
            volume: vec![5.0; n],
        }
    }

    fn run(s: &CandleSeries) -> SignalFrame {
        let ind = compute_indicators(s);
        let flags = generate_flags(s, &ind);
        compose(s, &ind, &flags)
    }

    #[test]
    fn keyed_frame_has_full_schema() {
        let frame = run(&series(5, true));
        assert_eq!(frame.len(), 5);
        assert_eq!(frame.columns.len(), 2 + 15 + 11 + 5);
        assert_eq!(&frame.columns[..3], &["ticker", "candle_time", "ema12"]);
        assert_eq!(frame.columns.last(), Some(&"volume"));
        assert_eq!(frame.rows[4].close, 14.0);
        assert_eq!(frame.rows[4].ticker.as_deref(), Some("ETHUSDT"));
        assert_eq!(frame.rows[4].candle_time, Some(Utc.with_ymd_and_hms(2024, 3, 1, 4, 0, 0).unwrap()));
    }

    #[test]
    fn unkeyed_frame_omits_key_columns() {
        let frame = run(&series(3, false));
        assert!(!frame.has_column("ticker"));
        assert!(!frame.has_column("candle_time"));
        assert_eq!(frame.columns.len(), 31);
        assert!(frame.rows.iter().all(|r| r.ticker.is_none()));
    }

    #[test]
    fn serialised_row_has_every_column() {
        let frame = run(&series(2, true));
        let json = serde_json::to_value(&frame.rows[1]).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), frame.columns.len());
        for col in &frame.columns {
            assert!(obj.contains_key(*col), "missing {col}");
        }
        // NaN indicators serialise as null
        assert!(obj["roc9"].is_null());
    }

    #[test]
    fn empty_series_keeps_schema() {
        let frame = run(&series(0, true));
        assert!(frame.is_empty());
        assert_eq!(frame.columns.len(), 33);
    }
}
