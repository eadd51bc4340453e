//! Experiment store: evaluates confusion counts and persists the results.

use tracing::{info, warn};

use crate::common::config::{AppCfg, DEFAULT_CONFIDENCE};
use crate::common::error::{DiagError, DiagResult};
use crate::common::time;
use crate::evaluation::domain::ConfusionCount;
use crate::evaluation::service::evaluate;

use super::domain::{
    Experiment, ExperimentId, ExperimentRepo, IngestReport, IngestRow, RowError,
};
use super::repo_fs::FsExperimentRepo;
use super::repo_mem::MemExperimentRepo;

/// Store operations over an injected repository.
pub struct ExperimentStore {
    repo: Box<dyn ExperimentRepo>,
    default_confidence: f64,
}

impl ExperimentStore {
    pub fn new(repo: Box<dyn ExperimentRepo>) -> Self {
        Self {
            repo,
            default_confidence: DEFAULT_CONFIDENCE,
        }
    }

    /// Store backed by a fresh in-memory repository.
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemExperimentRepo::new()))
    }

    /// Filesystem store when `data_root` is configured, in-memory otherwise.
    pub fn from_cfg(cfg: &AppCfg) -> Self {
        let repo: Box<dyn ExperimentRepo> = match &cfg.data_root {
            Some(root) => Box::new(FsExperimentRepo::new(root)),
            None => Box::new(MemExperimentRepo::new()),
        };
        Self::new(repo).with_default_confidence(cfg.default_confidence)
    }

    /// Confidence level used for upload rows that omit one.
    pub fn with_default_confidence(mut self, level: f64) -> Self {
        self.default_confidence = level;
        self
    }

    pub fn default_confidence(&self) -> f64 {
        self.default_confidence
    }

    /// Evaluate `count` and persist it under a fresh id.
    pub fn create(
        &self,
        count: ConfusionCount,
        technique_name: &str,
        confidence_level: f64,
    ) -> DiagResult<Experiment> {
        let technique_name = technique_name.trim();
        if technique_name.is_empty() {
            return Err(DiagError::invalid("technique_name", "must not be empty"));
        }
        let evaluated = evaluate(&count, confidence_level)?;

        let experiment = Experiment {
            experiment_id: ExperimentId::generate(),
            technique_name: technique_name.to_string(),
            confusion_matrix: count,
            confidence_level,
            metrics: evaluated.metrics,
            prevalence: evaluated.prevalence,
            created_at: time::now(),
        };
        self.repo.insert(&experiment)?;

        info!(
            experiment_id = %experiment.experiment_id,
            technique = %experiment.technique_name,
            confidence_level,
            "experiment created"
        );
        Ok(experiment)
    }

    /// All experiments in insertion order.
    pub fn list(&self) -> DiagResult<Vec<Experiment>> {
        self.repo.list()
    }

    pub fn get(&self, id: &ExperimentId) -> DiagResult<Experiment> {
        self.repo
            .get(id)?
            .ok_or_else(|| DiagError::not_found(id.as_str()))
    }

    /// Fetch every id in order; fails naming all ids that are absent.
    pub fn get_many(&self, ids: &[ExperimentId]) -> DiagResult<Vec<Experiment>> {
        let found = self.repo.get_many(ids)?;
        let missing: Vec<String> = ids
            .iter()
            .zip(&found)
            .filter(|(_, slot)| slot.is_none())
            .map(|(id, _)| id.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(DiagError::NotFound { ids: missing });
        }
        Ok(found.into_iter().flatten().collect())
    }

    /// Remove an experiment; absent ids are a no-op.
    pub fn delete(&self, id: &ExperimentId) -> DiagResult<()> {
        if self.repo.remove(id)? {
            info!(experiment_id = %id, "experiment deleted");
        }
        Ok(())
    }

    /// Create one experiment per row, collecting failures instead of stopping.
    ///
    /// Rows that failed to decode upstream are passed in as errors and are
    /// reported at their position like any validation failure.
    pub fn ingest<I>(&self, rows: I) -> IngestReport
    where
        I: IntoIterator<Item = DiagResult<IngestRow>>,
    {
        let mut report = IngestReport::default();
        for (row_index, row) in rows.into_iter().enumerate() {
            match row.and_then(|row| self.create_from_row(&row)) {
                Ok(experiment) => report.results.push(experiment),
                Err(err) => {
                    let code = err.code() as u32;
                    warn!(row_index, code, error = %err, "upload row rejected");
                    report.errors.push(RowError {
                        row_index,
                        code,
                        message: err.to_string(),
                    });
                }
            }
        }
        info!(
            accepted = report.results.len(),
            rejected = report.errors.len(),
            "bulk ingest finished"
        );
        report
    }

    fn create_from_row(&self, row: &IngestRow) -> DiagResult<Experiment> {
        let count = ConfusionCount::from_signed(
            row.true_positives,
            row.true_negatives,
            row.false_positives,
            row.false_negatives,
        )?;
        self.create(
            count,
            &row.technique_name,
            row.confidence_level.unwrap_or(self.default_confidence),
        )
    }
}
