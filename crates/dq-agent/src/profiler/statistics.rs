//! Statistical functions for numeric column profiling.

use crate::types::{NumericStats, OutlierBounds};

/// Quantile of an ascending slice by linear interpolation between the two
/// closest ranks (`pos = (n - 1) * p`).
///
/// Returns `None` for an empty slice.
pub(crate) fn quantile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }

    let pos = (sorted.len() - 1) as f64 * p.clamp(0.0, 1.0);
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let fraction = pos - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Sample standard deviation (n - 1 denominator), 0 for fewer than two values.
pub(crate) fn sample_std(values: &[f64], mean: f64) -> f64 {
    let n = values.len();
    if n <= 1 {
        return 0.0;
    }

    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    variance.sqrt()
}

/// Compute min, max, mean, std and quartiles of finite values.
pub(crate) fn compute_numeric_stats(values: &[f64]) -> Option<NumericStats> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mean = sorted.iter().sum::<f64>() / sorted.len() as f64;
    let q1 = quantile(&sorted, 0.25)?;
    let q3 = quantile(&sorted, 0.75)?;

    Some(NumericStats {
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        mean,
        std: sample_std(&sorted, mean),
        q1,
        q3,
        iqr: q3 - q1,
    })
}

/// Fences `[q1 - k * iqr, q3 + k * iqr]`.
pub(crate) fn outlier_bounds(stats: &NumericStats, multiplier: f64) -> OutlierBounds {
    OutlierBounds {
        lower: stats.q1 - multiplier * stats.iqr,
        upper: stats.q3 + multiplier * stats.iqr,
    }
}

/// Count values strictly outside the fences.
pub(crate) fn count_outliers(values: &[f64], bounds: &OutlierBounds) -> usize {
    values
        .iter()
        .filter(|&&v| v < bounds.lower || v > bounds.upper)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== quantile tests ====================

    #[test]
    fn test_quantile_linear_interpolation() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert!((quantile(&sorted, 0.25).unwrap() - 1.75).abs() < 1e-12);
        assert!((quantile(&sorted, 0.5).unwrap() - 2.5).abs() < 1e-12);
        assert!((quantile(&sorted, 0.75).unwrap() - 3.25).abs() < 1e-12);
    }

    #[test]
    fn test_quantile_bounds_and_single_value() {
        let sorted = [3.0, 7.0, 9.0];
        assert_eq!(quantile(&sorted, 0.0), Some(3.0));
        assert_eq!(quantile(&sorted, 1.0), Some(9.0));
        assert_eq!(quantile(&[5.0], 0.25), Some(5.0));
        assert_eq!(quantile(&[], 0.5), None);
    }

    // ==================== sample_std tests ====================

    #[test]
    fn test_sample_std_basic() {
        // Variance = 10 / 4 = 2.5
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((sample_std(&values, 3.0) - 2.5f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_sample_std_single_value() {
        assert_eq!(sample_std(&[5.0], 5.0), 0.0);
        assert_eq!(sample_std(&[], 0.0), 0.0);
    }

    // ==================== compute_numeric_stats tests ====================

    #[test]
    fn test_numeric_stats_unsorted_input() {
        let stats = compute_numeric_stats(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 4.0);
        assert_eq!(stats.mean, 2.5);
        assert!((stats.q1 - 1.75).abs() < 1e-12);
        assert!((stats.q3 - 3.25).abs() < 1e-12);
        assert!((stats.iqr - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_numeric_stats_empty() {
        assert!(compute_numeric_stats(&[]).is_none());
    }

    // ==================== count_outliers tests ====================

    #[test]
    fn test_count_outliers_with_outlier() {
        // q1 = 3.25, q3 = 7.75, iqr = 4.5 -> fences [-3.5, 14.5]
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 100.0];
        let stats = compute_numeric_stats(&values).unwrap();
        let bounds = outlier_bounds(&stats, 1.5);
        assert!((bounds.lower - -3.5).abs() < 1e-12);
        assert!((bounds.upper - 14.5).abs() < 1e-12);
        assert_eq!(count_outliers(&values, &bounds), 1);
    }

    #[test]
    fn test_count_outliers_none() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
        let stats = compute_numeric_stats(&values).unwrap();
        assert_eq!(count_outliers(&values, &outlier_bounds(&stats, 1.5)), 0);
    }

    #[test]
    fn test_count_outliers_zero_iqr() {
        // All values identical except one: iqr = 0 so any other value is outside.
        let values = [5.0, 5.0, 5.0, 5.0, 5.0, 6.0];
        let stats = compute_numeric_stats(&values).unwrap();
        assert_eq!(stats.iqr, 0.0);
        assert_eq!(count_outliers(&values, &outlier_bounds(&stats, 1.5)), 1);
    }
}
