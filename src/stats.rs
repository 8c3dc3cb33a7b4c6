/// Whiskers reach the furthest sample within this many IQRs of the box.
const WHISKER_IQR_FACTOR: f64 = 1.5;

/// Arithmetic mean, `None` for an empty slice.
///
/// Finite inputs always give a finite mean, even when their sum overflows.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let sum = values.iter().sum::<f64>();
    if sum.is_finite() {
        Some(sum / n)
    } else {
        Some(values.iter().map(|v| v / n).sum())
    }
}

/// Linearly interpolated percentile of already sorted samples.
///
/// `pct` is in `[0, 100]`. Panics if `sorted` is empty.
pub fn percentile_of_sorted(sorted: &[f64], pct: f64) -> f64 {
    assert!(!sorted.is_empty(), "percentile of empty sample");
    let rank = pct / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (rank - lower as f64)
}

/// Five-number summary plus whiskers and outliers, as drawn by a box plot.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub whisker_low: f64,
    pub whisker_high: f64,
    /// Samples outside the whiskers, ascending.
    pub outliers: Vec<f64>,
}

impl BoxStats {
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);

        let q1 = percentile_of_sorted(&sorted, 25.0);
        let median = percentile_of_sorted(&sorted, 50.0);
        let q3 = percentile_of_sorted(&sorted, 75.0);
        let iqr = q3 - q1;
        let low_fence = q1 - WHISKER_IQR_FACTOR * iqr;
        let high_fence = q3 + WHISKER_IQR_FACTOR * iqr;

        // Both fences bracket the median, so at least one sample lies within
        let whisker_low = sorted
            .iter()
            .copied()
            .find(|&v| v >= low_fence)
            .unwrap_or(q1);
        let whisker_high = sorted
            .iter()
            .rev()
            .copied()
            .find(|&v| v <= high_fence)
            .unwrap_or(q3);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|&v| v < whisker_low || v > whisker_high)
            .collect();

        Some(Self {
            min: sorted[0],
            q1,
            median,
            q3,
            max: sorted[sorted.len() - 1],
            whisker_low,
            whisker_high,
            outliers,
        })
    }
}
