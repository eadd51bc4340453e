//! Comparison results assembled from stored experiments.

use serde::{Deserialize, Serialize};

use crate::evaluation::domain::{MetricBundle, MetricName};
use crate::experiment::domain::ExperimentId;

/// One technique's metrics as listed in a comparison.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TechniqueMetrics {
    pub experiment_id: ExperimentId,
    pub technique_name: String,
    pub metrics: MetricBundle,
}

/// Winner for a single metric.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Best {
    pub technique: String,
    pub value: f64,
}

/// Per-metric winners.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub best_sensitivity: Best,
    pub best_specificity: Best,
    pub best_ppv: Best,
    pub best_npv: Best,
    pub best_accuracy: Best,
}

impl ComparisonSummary {
    pub fn get(&self, name: MetricName) -> &Best {
        match name {
            MetricName::Sensitivity => &self.best_sensitivity,
            MetricName::Specificity => &self.best_specificity,
            MetricName::Ppv => &self.best_ppv,
            MetricName::Npv => &self.best_npv,
            MetricName::Accuracy => &self.best_accuracy,
        }
    }
}

/// Side-by-side view of the selected techniques, in request order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub techniques: Vec<TechniqueMetrics>,
    pub summary: ComparisonSummary,
}
