//! Ordinary least-squares fitting of one response against one predictor.

use crate::math::{co_deviation, mean};

/// Result of a univariate least-squares fit `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination. 0.0 when the response has no variance.
    pub r_squared: f64,
    pub observations: usize,
}

/// Fit `y` against `x` by ordinary least squares.
///
/// Returns `None` when the slices are empty or of different lengths.
/// When every `x` is identical, or every `y` is, the slope is exactly 0.0
/// and the intercept is the mean of `y`. A constant response never picks up
/// a rounding-noise slope from an inexact mean.
pub fn fit_least_squares(x: &[f64], y: &[f64]) -> Option<LinearFit> {
    if x.is_empty() || x.len() != y.len() {
        return None;
    }

    let sxx = co_deviation(x, x);
    let sxy = co_deviation(x, y);
    let syy = co_deviation(y, y);
    let mx = mean(x);
    let my = mean(y);

    let flat_response = y.iter().all(|v| *v == y[0]);
    let slope = if flat_response || sxx.abs() < f64::EPSILON {
        0.0
    } else {
        sxy / sxx
    };
    let intercept = my - slope * mx;

    let r_squared = if flat_response || sxx.abs() < f64::EPSILON || syy.abs() < f64::EPSILON {
        0.0
    } else {
        ((sxy * sxy) / (sxx * syy)).clamp(0.0, 1.0)
    };

    Some(LinearFit {
        slope,
        intercept,
        r_squared,
        observations: x.len(),
    })
}
