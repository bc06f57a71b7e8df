// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Upper and lower bands sit `k` population standard deviations above and
// below the 20-row SMA (k = 2):
//
//   upper = SMA20 + k * STD20
//   lower = SMA20 - k * STD20

/// Band width in standard deviations.
pub const BOLLINGER_NUM_STD: f64 = 2.0;

/// Upper and lower bands, one value per input row.
#[derive(Debug, Clone, Default)]
pub struct BollingerSeries {
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
}

/// Build bands from a middle line and its rolling standard deviation.
pub fn calculate_bollinger(middle: &[f64], std_dev: &[f64], num_std: f64) -> BollingerSeries {
    let (upper, lower) = middle
        .iter()
        .zip(std_dev)
        .map(|(m, s)| (m + num_std * s, m - num_std * s))
        .unzip();

    BollingerSeries { upper, lower }
}
