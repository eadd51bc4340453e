//! Filesystem-backed repository for experiment records.
//!
//! Layout under `<data_root>/experiments`: one `<id>.json` document per
//! experiment and an `index` file listing ids in insertion order.
//!
//! TODO: fsync the record and the index before acknowledging an insert.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::warn;

use crate::common::error::{DiagError, DiagResult};

use super::domain::{Experiment, ExperimentId, ExperimentRepo};

const INDEX_FILE: &str = "index";

/// Filesystem repository rooted at `<data_root>/experiments`.
pub struct FsExperimentRepo {
    root: PathBuf,
    // Serialises index mutations across threads of this process.
    write_lock: Mutex<()>,
}

impl FsExperimentRepo {
    pub fn new(data_root: impl AsRef<Path>) -> Self {
        Self {
            root: data_root.as_ref().join("experiments"),
            write_lock: Mutex::new(()),
        }
    }

    fn record_path(&self, id: &ExperimentId) -> Option<PathBuf> {
        // Ids come from callers; anything that is not a plain token cannot name a record.
        let safe = !id.as_str().is_empty()
            && id
                .as_str()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        safe.then(|| self.root.join(format!("{}.json", id.as_str())))
    }

    fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }

    fn ensure_dirs(&self) -> io::Result<()> {
        fs::create_dir_all(&self.root)
    }

    fn read_index(&self) -> DiagResult<Vec<ExperimentId>> {
        let file = match File::open(self.index_path()) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let mut ids = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            let line = line.trim();
            if !line.is_empty() {
                ids.push(ExperimentId::new(line));
            }
        }
        Ok(ids)
    }

    fn write_index(&self, ids: &[ExperimentId]) -> DiagResult<()> {
        let tmp = self.root.join(format!("{INDEX_FILE}.tmp"));
        {
            let mut out = BufWriter::new(File::create(&tmp)?);
            for id in ids {
                writeln!(out, "{id}")?;
            }
            out.flush()?;
        }
        fs::rename(tmp, self.index_path())?;
        Ok(())
    }

    fn write_record(&self, file: File, experiment: &Experiment) -> DiagResult<()> {
        let mut out = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut out, experiment)?;
        out.flush()?;
        Ok(())
    }

    fn append_index(&self, id: &ExperimentId) -> DiagResult<()> {
        let mut index = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.index_path())?;
        writeln!(index, "{id}")?;
        Ok(())
    }

    fn load(&self, path: &Path) -> DiagResult<Option<Experiment>> {
        match File::open(path) {
            Ok(file) => Ok(Some(serde_json::from_reader(BufReader::new(file))?)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn lock(&self) -> DiagResult<std::sync::MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| DiagError::Storage("experiment write lock poisoned".into()))
    }
}

impl ExperimentRepo for FsExperimentRepo {
    fn insert(&self, experiment: &Experiment) -> DiagResult<()> {
        let path = self.record_path(&experiment.experiment_id).ok_or_else(|| {
            DiagError::Storage(format!(
                "experiment id {} is not a valid file name",
                experiment.experiment_id
            ))
        })?;

        let _guard = self.lock()?;
        self.ensure_dirs()?;
        let file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                return Err(DiagError::Storage(format!(
                    "duplicate experiment id {}",
                    experiment.experiment_id
                )));
            }
            Err(err) => return Err(err.into()),
        };
        let written = self
            .write_record(file, experiment)
            .and_then(|()| self.append_index(&experiment.experiment_id));
        if let Err(err) = written {
            // A record never stays on disk without its index entry.
            if let Err(cleanup) = fs::remove_file(&path) {
                warn!(experiment_id = %experiment.experiment_id, error = %cleanup, "could not remove partial record");
            }
            return Err(err);
        }
        Ok(())
    }

    // TODO: page through the index once stores outgrow a single read.
    fn list(&self) -> DiagResult<Vec<Experiment>> {
        let mut out = Vec::new();
        for id in self.read_index()? {
            match self.get(&id)? {
                Some(experiment) => out.push(experiment),
                None => warn!(experiment_id = %id, "index entry without record, skipping"),
            }
        }
        Ok(out)
    }

    fn get(&self, id: &ExperimentId) -> DiagResult<Option<Experiment>> {
        match self.record_path(id) {
            Some(path) => self.load(&path),
            None => Ok(None),
        }
    }

    fn remove(&self, id: &ExperimentId) -> DiagResult<bool> {
        let Some(path) = self.record_path(id) else {
            return Ok(false);
        };

        let _guard = self.lock()?;
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(err) => return Err(err.into()),
        }
        // TODO: append tombstones instead of rewriting the index once stores grow past a few thousand records.
        let remaining: Vec<ExperimentId> = self
            .read_index()?
            .into_iter()
            .filter(|existing| existing != id)
            .collect();
        self.write_index(&remaining)?;
        Ok(true)
    }
}
