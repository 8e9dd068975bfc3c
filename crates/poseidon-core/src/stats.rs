//! Descriptive statistics shared by the analysis stages

use statrs::statistics::{Data, OrderStatistics, Statistics};

/// Arithmetic mean, `None` for empty input
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().mean())
}

/// Population variance, `None` for empty input
pub fn population_variance(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().population_variance())
}

/// Population standard deviation, `None` for empty input
pub fn population_std_dev(values: &[f64]) -> Option<f64> {
    population_variance(values).map(f64::sqrt)
}

/// Root mean square, `None` for empty input
pub fn rms(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().quadratic_mean())
}

/// Quantile at `tau` in `[0, 1]`, `None` for empty input
pub fn quantile(values: &[f64], tau: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut data = Data::new(values.to_vec());
    Some(data.quantile(tau.clamp(0.0, 1.0)))
}

/// Median, `None` for empty input
pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// Largest value, `None` for empty input
pub fn max(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().copied().fold(f64::NEG_INFINITY, f64::max))
}
