//! Comparator selecting the best technique per metric.

use std::collections::HashSet;

use tracing::info;

use crate::common::error::{DiagError, DiagResult};
use crate::evaluation::domain::MetricName;
use crate::experiment::domain::{Experiment, ExperimentId};
use crate::experiment::service::ExperimentStore;

use super::domain::{Best, ComparisonResult, ComparisonSummary, TechniqueMetrics};

/// Minimum number of distinct experiments a comparison needs.
pub const MIN_SELECTION: usize = 2;

/// Compare the stored experiments named by `ids`.
///
/// Duplicate ids collapse onto their first occurrence. Ties on a metric go to
/// the experiment that appears first in `ids`.
pub fn compare(store: &ExperimentStore, ids: &[ExperimentId]) -> DiagResult<ComparisonResult> {
    let mut seen = HashSet::new();
    let distinct: Vec<ExperimentId> = ids
        .iter()
        .filter(|id| seen.insert(*id))
        .cloned()
        .collect();

    if distinct.len() < MIN_SELECTION {
        return Err(DiagError::InsufficientSelection {
            required: MIN_SELECTION,
            actual: distinct.len(),
        });
    }

    let experiments = store.get_many(&distinct)?;
    let result = rank(&experiments)?;
    info!(count = experiments.len(), "comparison computed");
    Ok(result)
}

/// Build the comparison over experiments already in request order.
// TODO: report every tied technique in the summary, not only the earliest.
pub fn rank(experiments: &[Experiment]) -> DiagResult<ComparisonResult> {
    if experiments.len() < MIN_SELECTION {
        return Err(DiagError::InsufficientSelection {
            required: MIN_SELECTION,
            actual: experiments.len(),
        });
    }

    let best = |name: MetricName| -> Best {
        let mut winner = &experiments[0];
        for candidate in &experiments[1..] {
            if candidate.metrics.get(name).value > winner.metrics.get(name).value {
                winner = candidate;
            }
        }
        Best {
            technique: winner.technique_name.clone(),
            value: winner.metrics.get(name).value,
        }
    };

    let summary = ComparisonSummary {
        best_sensitivity: best(MetricName::Sensitivity),
        best_specificity: best(MetricName::Specificity),
        best_ppv: best(MetricName::Ppv),
        best_npv: best(MetricName::Npv),
        best_accuracy: best(MetricName::Accuracy),
    };

    let techniques = experiments
        .iter()
        .map(|e| TechniqueMetrics {
            experiment_id: e.experiment_id.clone(),
            technique_name: e.technique_name.clone(),
            metrics: e.metrics,
        })
        .collect();

    Ok(ComparisonResult {
        techniques,
        summary,
    })
}
