//! Shared numeric utilities for trend fitting.

/// Sum of a slice. Returns 0.0 for an empty slice.
pub fn sum(data: &[f64]) -> f64 {
    data.iter().sum()
}

/// Arithmetic mean of a slice. Returns 0.0 for an empty slice.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    sum(data) / data.len() as f64
}

/// Sum of products of deviations from the respective means.
///
/// `co_deviation(x, x)` is the sum of squared deviations of `x`.
/// Both slices must have the same length; extra elements are ignored.
pub fn co_deviation(x: &[f64], y: &[f64]) -> f64 {
    let mx = mean(x);
    let my = mean(y);
    x.iter()
        .zip(y.iter())
        .map(|(xi, yi)| (xi - mx) * (yi - my))
        .sum()
}
