//! Sample statistics for replicate trials.
//!
//! Confidence intervals use the normal approximation to the sampling
//! distribution of the mean, which is what a handful of independent
//! replicate runs supports.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::error::StatsError;

/// A two-sided confidence interval around a sample mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub mean: f64,
    pub upper: f64,
}

impl ConfidenceInterval {
    /// Half the interval width, which is what an error bar extends above
    /// and below the mean.
    #[must_use]
    pub fn half_width(&self) -> f64 {
        (self.upper - self.lower) / 2.0
    }
}

/// Arithmetic mean of `samples`.
pub fn mean(samples: &[f64]) -> Result<f64, StatsError> {
    if samples.is_empty() {
        return Err(StatsError::Empty);
    }
    Ok(samples.iter().sum::<f64>() / samples.len() as f64)
}

/// Unbiased sample standard deviation, with the n - 1 denominator.
pub fn sample_std(samples: &[f64]) -> Result<f64, StatsError> {
    if samples.len() < 2 {
        return Err(StatsError::Insufficient { n: samples.len() });
    }
    let m = samples.iter().sum::<f64>() / samples.len() as f64;
    let variance = samples.iter().map(|x| (x - m).powi(2)).sum::<f64>()
        / (samples.len() - 1) as f64;
    Ok(variance.sqrt())
}

/// Standard-normal z value for a two-sided significance level:
/// the quantile at `1 - error_rate / 2`.
pub fn two_sided_z(error_rate: f64) -> Result<f64, StatsError> {
    if !(error_rate > 0.0 && error_rate < 1.0) {
        return Err(StatsError::InvalidErrorRate(error_rate));
    }
    let standard =
        Normal::new(0.0, 1.0).map_err(|_| StatsError::InvalidErrorRate(error_rate))?;
    Ok(standard.inverse_cdf(1.0 - error_rate / 2.0))
}

/// Two-sided `1 - error_rate` confidence interval for the mean of `samples`.
///
/// The margin is `z * s / sqrt(n)` with `s` the unbiased sample standard
/// deviation. At least two samples are required.
pub fn confidence_interval(
    samples: &[f64],
    error_rate: f64,
) -> Result<ConfidenceInterval, StatsError> {
    if !(error_rate > 0.0 && error_rate < 1.0) {
        return Err(StatsError::InvalidErrorRate(error_rate));
    }
    if samples.is_empty() {
        return Err(StatsError::Empty);
    }
    let m = mean(samples)?;
    let sd = sample_std(samples)?;
    let z = two_sided_z(error_rate)?;
    let margin = z * sd / (samples.len() as f64).sqrt();
    Ok(ConfidenceInterval {
        lower: m - margin,
        mean: m,
        upper: m + margin,
    })
}
