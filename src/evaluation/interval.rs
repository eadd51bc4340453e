//! Confidence interval helpers: normal quantiles and the Wilson score interval.

use statrs::distribution::{ContinuousCDF, Normal};

use crate::common::error::{DiagError, DiagResult};

use super::domain::MetricResult;

/// Reject confidence levels outside the open interval (0, 1).
pub fn check_confidence(level: f64) -> DiagResult<f64> {
    if level > 0.0 && level < 1.0 {
        Ok(level)
    } else {
        Err(DiagError::invalid(
            "confidence_level",
            format!("must lie strictly between 0 and 1, got {level}"),
        ))
    }
}

/// Two-sided critical value of the standard normal for `level`.
pub fn z_for_confidence(level: f64) -> DiagResult<f64> {
    let level = check_confidence(level)?;
    let normal = Normal::new(0.0, 1.0).map_err(|e| DiagError::internal(e.to_string()))?;
    Ok(normal.inverse_cdf(1.0 - (1.0 - level) / 2.0))
}

/// Wilson score interval for `successes` out of `trials` at critical value `z`.
///
/// Zero trials yield [`MetricResult::UNDEFINED`].
pub fn wilson(successes: u64, trials: u64, z: f64) -> MetricResult {
    if trials == 0 {
        return MetricResult::UNDEFINED;
    }
    let n = trials as f64;
    let p = successes as f64 / n;
    let z2 = z * z;

    let denom = 1.0 + z2 / n;
    let centre = (p + z2 / (2.0 * n)) / denom;
    let margin = z * (p * (1.0 - p) / n + z2 / (4.0 * n * n)).sqrt() / denom;

    // Rounding can push a bound past p when p is 0 or 1.
    MetricResult {
        value: p,
        ci_lower: (centre - margin).clamp(0.0, 1.0).min(p),
        ci_upper: (centre + margin).clamp(0.0, 1.0).max(p),
        undefined: false,
    }
}
