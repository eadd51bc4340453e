// lib.rs - centrale orchestrator
pub mod common;
pub mod evaluation;
pub mod experiment;
pub mod comparison;
pub mod api;

pub use api::{Engine, Response};
pub use common::{AppCfg, DiagCode, DiagError, DiagResult};
pub use comparison::{compare, ComparisonResult};
pub use evaluation::{cohens_kappa, evaluate, ConfusionCount, KappaInput, KappaResult};
pub use experiment::{Experiment, ExperimentId, ExperimentRepo, ExperimentStore};
