// =============================================================================
// Rate of Change (ROC) - Momentum Indicator
// =============================================================================
//
// Fractional change over a look-back of `lag` rows:
//   change_t = (x_t - x_{t-lag}) / x_{t-lag}
//
// Rows without a lagged value, and rows whose lagged value is zero, are NaN.
// The same helper gives the 1-row volume change.

/// Look-back for ROC9.
pub const ROC_PERIOD: usize = 9;

/// Fractional change of `values` over `lag` rows.
pub fn pct_change(values: &[f64], lag: usize) -> Vec<f64> {
    (0..values.len())
        .map(|i| {
            if lag == 0 || i < lag {
                return f64::NAN;
            }
            let prev = values[i - lag];
            if prev == 0.0 {
                f64::NAN
            } else {
                (values[i] - prev) / prev
            }
        })
        .collect()
}

/// ROC of closing prices over `period` rows, one value per close.
pub fn calculate_roc(closes: &[f64], period: usize) -> Vec<f64> {
    pct_change(closes, period)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roc_basic() {
        let closes: Vec<f64> = (1..=20).map(|x| x as f64).collect();
        let roc = calculate_roc(&closes, ROC_PERIOD);
        assert_eq!(roc.len(), 20);
        assert!(roc[..9].iter().all(|v| v.is_nan()));
        // from 1 to 10
        assert!((roc[9] - 9.0).abs() < 1e-12);
    }

    #[test]
    fn roc_short_series_is_all_nan() {
        let roc = calculate_roc(&[1.0, 2.0, 3.0], ROC_PERIOD);
        assert_eq!(roc.len(), 3);
        assert!(roc.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn zero_base_is_nan_not_infinite() {
        let change = pct_change(&[0.0, 5.0, 10.0], 1);
        assert!(change[1].is_nan());
        assert!((change[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn volume_change_one_lag() {
        let change = pct_change(&[100.0, 150.0, 75.0], 1);
        assert!(change[0].is_nan());
        assert!((change[1] - 0.5).abs() < 1e-12);
        assert!((change[2] + 0.5).abs() < 1e-12);
    }
}
