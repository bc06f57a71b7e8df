// =============================================================================
// Simple Moving Average (SMA) and rolling standard deviation
// =============================================================================
//
// Trailing windows that shrink at the start of the series: row `t` covers
// rows `max(0, t + 1 - window) ..= t`, so the first row is a window of one.
//
// Each window is summed directly rather than with a running total, so a NaN
// only affects the windows that actually contain it.  Sums are taken relative
// to the window's first element, which keeps a run of identical values exact.
// =============================================================================

/// Long trend window.
pub const SMA_LONG_WINDOW: usize = 50;
/// Window shared by SMA20, STD20 and the Bollinger bands.
pub const SMA_SHORT_WINDOW: usize = 20;

fn window_bounds(i: usize, window: usize) -> std::ops::Range<usize> {
    let len = window.max(1).min(i + 1);
    (i + 1 - len)..(i + 1)
}

fn mean(window: &[f64]) -> f64 {
    let Some(&anchor) = window.first() else {
        return f64::NAN;
    };
    anchor + window.iter().map(|x| x - anchor).sum::<f64>() / window.len() as f64
}

/// Rolling mean with a shrinking warm-up window.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    (0..values.len())
        .map(|i| mean(&values[window_bounds(i, window)]))
        .collect()
}

/// Rolling population standard deviation (divisor N) with the same windows
/// as [`rolling_mean`].
pub fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    (0..values.len())
        .map(|i| {
            let w = &values[window_bounds(i, window)];
            let m = mean(w);
            let variance = w.iter().map(|x| (x - m).powi(2)).sum::<f64>() / w.len() as f64;
            variance.sqrt()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shrinking_window_at_start() {
        let sma = rolling_mean(&[2.0, 4.0, 6.0, 8.0], 3);
        assert_eq!(sma, vec![2.0, 3.0, 4.0, 6.0]);
    }

    #[test]
    fn full_window_sma50() {
        let closes: Vec<f64> = (1..=60).map(|x| x as f64).collect();
        let sma = rolling_mean(&closes, SMA_LONG_WINDOW);
        // rows 10..=59 hold 11..=60, mean 35.5
        assert!((sma[59] - 35.5).abs() < 1e-12);
        // first row is just the first close
        assert_eq!(sma[0], 1.0);
    }

    #[test]
    fn population_std() {
        // window [2, 4, 4, 4, 5, 5, 7, 9] has population std exactly 2
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let std = rolling_std(&values, 8);
        assert!((std[7] - 2.0).abs() < 1e-12);
        assert_eq!(std[0], 0.0);
    }

    #[test]
    fn constant_series_has_zero_std() {
        let std = rolling_std(&[100.0; 30], SMA_SHORT_WINDOW);
        assert!(std.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn constant_inexact_values_stay_exact() {
        for c in [0.1, 0.3, 1.1, 37020.17] {
            let values = vec![c; 100];
            let sma50 = rolling_mean(&values, SMA_LONG_WINDOW);
            let sma20 = rolling_mean(&values, SMA_SHORT_WINDOW);
            let std20 = rolling_std(&values, SMA_SHORT_WINDOW);
            assert!(sma50.iter().all(|&v| v == c), "sma50 drifted for {c}");
            assert!(sma20.iter().all(|&v| v == c), "sma20 drifted for {c}");
            assert!(std20.iter().all(|&v| v == 0.0), "std20 nonzero for {c}");
        }
    }

    #[test]
    fn nan_only_touches_windows_that_contain_it() {
        let mut values = vec![1.0; 10];
        values[2] = f64::NAN;
        let sma = rolling_mean(&values, 3);
        assert_eq!(sma[1], 1.0);
        assert!(sma[2].is_nan() && sma[3].is_nan() && sma[4].is_nan());
        assert_eq!(sma[5], 1.0);

        let std = rolling_std(&values, 3);
        assert!(std[4].is_nan());
        assert_eq!(std[5], 0.0);
    }

    #[test]
    fn empty_input() {
        assert!(rolling_mean(&[], 20).is_empty());
        assert!(rolling_std(&[], 20).is_empty());
    }
}
