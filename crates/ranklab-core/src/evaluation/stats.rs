//! Summary statistics over per-query metric values.
//!
//! Aggregate reports reduce each (model, metric) group to mean, median, and
//! population standard deviation. Population (not sample) variance is used
//! because the group is the full set of evaluated queries, not a sample
//! from a larger run; it also gives the defined value 0.0 for single-query
//! groups where sample variance would divide by zero.

/// Arithmetic mean; 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median; 0.0 for an empty slice. Even-length input averages the two
/// middle values.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

/// Population standard deviation; 0.0 for empty and single-element slices.
pub fn std_pop(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[0.5]), 0.5);
        assert!((mean(&[0.2, 0.4, 0.6]) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_median_odd_even() {
        assert_eq!(median(&[]), 0.0);
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), 2.5);
    }

    #[test]
    fn test_std_pop() {
        // Single element is defined as 0, not NaN
        assert_eq!(std_pop(&[0.7]), 0.0);
        assert_eq!(std_pop(&[]), 0.0);

        // Population std of {1, 3} is 1 (mean 2, deviations ±1)
        assert!((std_pop(&[1.0, 3.0]) - 1.0).abs() < 1e-12);

        // Constant values have zero spread
        assert_eq!(std_pop(&[0.5, 0.5, 0.5]), 0.0);
    }
}
