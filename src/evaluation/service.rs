//! Metric calculator turning a confusion count into diagnostic accuracy metrics.

use tracing::debug;

use crate::common::error::{DiagError, DiagResult};

use super::domain::{ConfusionCount, DiagnosticMetrics, MetricBundle, MetricResult};
use super::interval::{wilson, z_for_confidence};

/// Compute sensitivity, specificity, PPV, NPV, accuracy and prevalence.
///
/// Every proportion carries a Wilson interval over its own denominator. A
/// metric whose denominator is zero is reported as [`MetricResult::UNDEFINED`].
pub fn evaluate(count: &ConfusionCount, confidence_level: f64) -> DiagResult<DiagnosticMetrics> {
    let z = z_for_confidence(confidence_level)?;
    let total = count.total()?;
    if total == 0 {
        return Err(DiagError::invalid(
            "confusion_matrix",
            "total sample size must be at least 1",
        ));
    }

    let metric = |name: &str, successes: u64, trials: u64| -> MetricResult {
        let result = wilson(successes, trials, z);
        if result.undefined {
            debug!(metric = name, "zero denominator, reporting 0");
        }
        result
    };

    let metrics = MetricBundle {
        sensitivity: metric("sensitivity", count.true_positives, count.condition_positive()),
        specificity: metric("specificity", count.true_negatives, count.condition_negative()),
        ppv: metric("ppv", count.true_positives, count.test_positive()),
        npv: metric("npv", count.true_negatives, count.test_negative()),
        accuracy: metric("accuracy", count.correct(), total),
    };

    Ok(DiagnosticMetrics {
        metrics,
        prevalence: count.condition_positive() as f64 / total as f64,
    })
}
