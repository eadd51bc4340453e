//! Experiment records and the repository contract that stores them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::error::DiagResult;
use crate::evaluation::domain::{ConfusionCount, MetricBundle};

/// Opaque identifier assigned to an experiment at creation.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExperimentId(String);

impl ExperimentId {
    /// Fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn new<S: Into<String>>(value: S) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ExperimentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExperimentId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// One evaluated technique. Immutable once created.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    pub experiment_id: ExperimentId,
    pub technique_name: String,
    pub confusion_matrix: ConfusionCount,
    pub confidence_level: f64,
    #[serde(flatten)]
    pub metrics: MetricBundle,
    pub prevalence: f64,
    pub created_at: DateTime<Utc>,
}

/// Repository contract for experiment persistence.
///
/// Implementations must keep insertion order for [`ExperimentRepo::list`] and
/// refuse to overwrite an existing id.
pub trait ExperimentRepo: Send + Sync {
    fn insert(&self, experiment: &Experiment) -> DiagResult<()>;
    fn list(&self) -> DiagResult<Vec<Experiment>>;
    fn get(&self, id: &ExperimentId) -> DiagResult<Option<Experiment>>;
    /// Returns whether a record was removed.
    fn remove(&self, id: &ExperimentId) -> DiagResult<bool>;

    /// Look up several ids at once, one slot per requested id.
    fn get_many(&self, ids: &[ExperimentId]) -> DiagResult<Vec<Option<Experiment>>> {
        ids.iter().map(|id| self.get(id)).collect()
    }
}

/// One already-decoded row of a bulk upload.
#[derive(Clone, Debug, PartialEq)]
pub struct IngestRow {
    pub technique_name: String,
    pub true_positives: i64,
    pub true_negatives: i64,
    pub false_positives: i64,
    pub false_negatives: i64,
    pub confidence_level: Option<f64>,
}

/// Failure attributed to one row of a bulk upload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    /// Zero-based position of the row in the submitted batch.
    pub row_index: usize,
    pub code: u32,
    pub message: String,
}

/// Outcome of a bulk upload: created experiments plus per-row failures.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestReport {
    pub results: Vec<Experiment>,
    pub errors: Vec<RowError>,
}
