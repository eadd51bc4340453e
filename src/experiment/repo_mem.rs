//! In-memory experiment repository guarded by a read-write lock.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::common::error::{DiagError, DiagResult};

use super::domain::{Experiment, ExperimentId, ExperimentRepo};

#[derive(Default)]
struct State {
    order: Vec<ExperimentId>,
    records: HashMap<ExperimentId, Experiment>,
}

/// Process-local repository; contents are lost on drop.
#[derive(Default)]
pub struct MemExperimentRepo {
    state: RwLock<State>,
}

impl MemExperimentRepo {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> DiagResult<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|_| DiagError::Storage("experiment lock poisoned".into()))
    }

    fn write(&self) -> DiagResult<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|_| DiagError::Storage("experiment lock poisoned".into()))
    }
}

impl ExperimentRepo for MemExperimentRepo {
    fn insert(&self, experiment: &Experiment) -> DiagResult<()> {
        let mut state = self.write()?;
        if state.records.contains_key(&experiment.experiment_id) {
            return Err(DiagError::Storage(format!(
                "duplicate experiment id {}",
                experiment.experiment_id
            )));
        }
        state.order.push(experiment.experiment_id.clone());
        state
            .records
            .insert(experiment.experiment_id.clone(), experiment.clone());
        Ok(())
    }

    fn list(&self) -> DiagResult<Vec<Experiment>> {
        let state = self.read()?;
        Ok(state
            .order
            .iter()
            .filter_map(|id| state.records.get(id))
            .cloned()
            .collect())
    }

    fn get(&self, id: &ExperimentId) -> DiagResult<Option<Experiment>> {
        Ok(self.read()?.records.get(id).cloned())
    }

    fn remove(&self, id: &ExperimentId) -> DiagResult<bool> {
        let mut state = self.write()?;
        if state.records.remove(id).is_none() {
            return Ok(false);
        }
        state.order.retain(|existing| existing != id);
        Ok(true)
    }

    fn get_many(&self, ids: &[ExperimentId]) -> DiagResult<Vec<Option<Experiment>>> {
        let state = self.read()?;
        Ok(ids.iter().map(|id| state.records.get(id).cloned()).collect())
    }
}
