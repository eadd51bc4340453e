//! Experiment domain: creation, persistence and lookup of evaluated techniques.

pub mod domain;
pub mod repo_fs;
pub mod repo_mem;
pub mod service;

pub use domain::{Experiment, ExperimentId, ExperimentRepo, IngestReport, IngestRow, RowError};
pub use repo_fs::FsExperimentRepo;
pub use repo_mem::MemExperimentRepo;
pub use service::ExperimentStore;

#[cfg(test)]
pub(crate) mod testing {
    use super::domain::{Experiment, ExperimentId};
    use crate::common::time;
    use crate::evaluation::domain::ConfusionCount;
    use crate::evaluation::service::evaluate;

    /// Evaluated record with a fresh id, built without going through a store.
    pub fn sample(technique: &str) -> Experiment {
        let count = ConfusionCount::new(45, 38, 2, 5);
        let evaluated = evaluate(&count, 0.95).expect("reference count evaluates");
        Experiment {
            experiment_id: ExperimentId::generate(),
            technique_name: technique.to_string(),
            confusion_matrix: count,
            confidence_level: 0.95,
            metrics: evaluated.metrics,
            prevalence: evaluated.prevalence,
            created_at: time::now(),
        }
    }
}
