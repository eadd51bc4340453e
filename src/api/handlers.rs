//! Engine facade: one JSON-in/JSON-out handler per client operation.

use std::time::Instant;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::common::config::AppCfg;
use crate::common::error::{DiagError, DiagResult};
use crate::common::time;
use crate::comparison::service::compare;
use crate::evaluation::agreement::cohens_kappa;
use crate::experiment::domain::ExperimentId;
use crate::experiment::service::ExperimentStore;

use super::wire::{
    decode_row, parse_body, CompareRequest, CreateExperimentRequest, KappaRequest, UploadRequest,
};

/// Version of the request/response contract.
pub const API_VERSION: u32 = 1;

/// Status plus JSON body, mirroring an HTTP response.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Response {
    pub status: u16,
    pub body: Value,
}

impl Response {
    fn ok<T: Serialize>(body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(body) => Self { status: 200, body },
            Err(err) => Self::error(&DiagError::from(err)),
        }
    }

    pub(crate) fn error(err: &DiagError) -> Self {
        Self {
            status: err.status(),
            body: json!({ "detail": err.to_string(), "code": err.code() as u32 }),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Envelope `{"status": .., "body": ..}` as a JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"status":500,"body":{"detail":"response serialization failed","code":8}}"#
                .to_string()
        })
    }
}

/// Request handling entry point owning the experiment store.
pub struct Engine {
    store: ExperimentStore,
}

impl Engine {
    pub fn new(store: ExperimentStore) -> Self {
        Self { store }
    }

    pub fn from_cfg(cfg: &AppCfg) -> Self {
        Self::new(ExperimentStore::from_cfg(cfg))
    }

    pub fn store(&self) -> &ExperimentStore {
        &self.store
    }

    /// Service banner.
    pub fn root(&self) -> Response {
        Response::ok(&json!({
            "message": "Diagnostic statistics engine",
            "version": API_VERSION,
        }))
    }

    pub fn create_experiment(&self, payload: &str) -> Response {
        respond("create_experiment", || {
            let req: CreateExperimentRequest = parse_body(payload)?;
            let count = req.confusion_count()?;
            let level = req
                .confidence_level
                .unwrap_or(self.store.default_confidence());
            self.store.create(count, &req.technique_name, level)
        })
    }

    pub fn list_experiments(&self) -> Response {
        respond("list_experiments", || self.store.list())
    }

    pub fn get_experiment(&self, id: &str) -> Response {
        respond("get_experiment", || self.store.get(&ExperimentId::new(id)))
    }

    pub fn delete_experiment(&self, id: &str) -> Response {
        respond("delete_experiment", || {
            self.store.delete(&ExperimentId::new(id))?;
            Ok(json!({ "experiment_id": id }))
        })
    }

    /// Bulk create from decoded upload rows; bad rows are reported, not fatal.
    pub fn upload_rows(&self, payload: &str) -> Response {
        respond("upload_rows", || {
            let req: UploadRequest = parse_body(payload)?;
            Ok(self.store.ingest(req.rows.iter().map(decode_row)))
        })
    }

    pub fn kappa(&self, payload: &str) -> Response {
        respond("kappa", || {
            let req: KappaRequest = parse_body(payload)?;
            cohens_kappa(&req.into_input(self.store.default_confidence())?)
        })
    }

    pub fn compare(&self, payload: &str) -> Response {
        respond("compare", || {
            let req: CompareRequest = parse_body(payload)?;
            compare(&self.store, &req.ids())
        })
    }
}

fn respond<T, F>(op: &'static str, handler: F) -> Response
where
    T: Serialize,
    F: FnOnce() -> DiagResult<T>,
{
    let start = Instant::now();
    let response = match handler() {
        Ok(body) => Response::ok(&body),
        Err(err) => {
            let code = err.code() as u32;
            let dur_ms = time::elapsed_ms(start);
            warn!(op, code, status = err.status(), dur_ms, error = %err, "request failed");
            Response::error(&err)
        }
    };
    let dur_ms = time::elapsed_ms(start);
    debug!(op, status = response.status, dur_ms, "request handled");
    response
}
