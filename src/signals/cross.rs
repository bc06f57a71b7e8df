// =============================================================================
// Crossover Detector
// =============================================================================
//
//   cross_up[t]   = a[t] > b[t] && a[t-1] <= b[t-1]
//   cross_down[t] = a[t] < b[t] && a[t-1] >= b[t-1]
//
// Row 0 has no predecessor and is always false.  Any comparison involving NaN
// is false, so undefined inputs never produce a cross.
// =============================================================================

/// Cross-up and cross-down signals, one per row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrossSeries {
    pub up: Vec<bool>,
    pub down: Vec<bool>,
}

/// Detect where `a` crosses above or below `b`.
///
/// Both inputs are expected to be the same length; extra trailing rows on the
/// longer side are ignored.
pub fn detect_cross(a: &[f64], b: &[f64]) -> CrossSeries {
    let n = a.len().min(b.len());
    let mut up = Vec::with_capacity(n);
    let mut down = Vec::with_capacity(n);

    for t in 0..n {
        if t == 0 {
            up.push(false);
            down.push(false);
            continue;
        }
        let (cur_a, cur_b) = (a[t], b[t]);
        let (prev_a, prev_b) = (a[t - 1], b[t - 1]);
        up.push(cur_a > cur_b && prev_a <= prev_b);
        down.push(cur_a < cur_b && prev_a >= prev_b);
    }

    CrossSeries { up, down }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_example() {
        let cross = detect_cross(&[1.0, 2.0, 3.0, 2.0, 1.0], &[2.0; 5]);
        assert_eq!(cross.up, vec![false, false, true, false, false]);
        assert_eq!(cross.down, vec![false, false, false, false, true]);
    }

    #[test]
    fn first_row_is_never_a_cross() {
        let cross = detect_cross(&[5.0], &[1.0]);
        assert_eq!(cross.up, vec![false]);
        assert_eq!(cross.down, vec![false]);
    }

    #[test]
    fn equal_series_never_cross() {
        let cross = detect_cross(&[3.0; 10], &[3.0; 10]);
        assert!(cross.up.iter().all(|&x| !x));
        assert!(cross.down.iter().all(|&x| !x));
    }

    #[test]
    fn touching_then_leaving_counts() {
        // equal at t=1, above at t=2
        let cross = detect_cross(&[1.0, 2.0, 3.0], &[2.0, 2.0, 2.0]);
        assert_eq!(cross.up, vec![false, false, true]);
    }

    #[test]
    fn nan_never_crosses() {
        let a = [1.0, f64::NAN, 3.0, 1.0];
        let b = [2.0, 2.0, 2.0, 2.0];
        let cross = detect_cross(&a, &b);
        // t=1: current NaN; t=2: previous NaN
        assert_eq!(cross.up, vec![false, false, false, false]);
        assert_eq!(cross.down, vec![false, false, false, true]);
    }

    #[test]
    fn empty_input() {
        assert_eq!(detect_cross(&[], &[]), CrossSeries::default());
    }
}
