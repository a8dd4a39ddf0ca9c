//! Descriptive statistics used by the outlier cappers.

use std::cmp::Ordering;

/// Calculate the mean of a slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Calculate the variance of a slice (sample variance with n-1 denominator).
pub fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|x| (x - m).powi(2)).sum();
    sum_sq / (values.len() - 1) as f64
}

/// Calculate the standard deviation of a slice.
pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Empirical quantile using nearest-rank selection.
///
/// Picks the order statistic at index `round(q * (n - 1))`, so the result is
/// always one of the observed values. For integral counts this keeps the
/// quartiles integral as well.
///
/// Returns NaN for an empty slice or `q` outside `[0, 1]`.
///
/// # Example
/// ```
/// use cafe_forecast::utils::stats::quantile_nearest;
///
/// let values = [4.0, 1.0, 3.0, 2.0, 5.0];
/// assert_eq!(quantile_nearest(&values, 0.5), 3.0);
/// assert_eq!(quantile_nearest(&values, 0.0), 1.0);
/// ```
pub fn quantile_nearest(values: &[f64], q: f64) -> f64 {
    if values.is_empty() || !(0.0..=1.0).contains(&q) {
        return f64::NAN;
    }
    let sorted = sorted_copy(values);
    let idx = ((sorted.len() - 1) as f64 * q).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    sorted
}
