//! Diagnostic accuracy metrics and inter-rater agreement.
//!
//! Both calculators are pure functions of their inputs and safe to call from
//! any number of threads.

pub mod agreement;
pub mod domain;
pub mod interval;
pub mod service;

pub use agreement::cohens_kappa;
pub use domain::{
    ConfusionCount, DiagnosticMetrics, Interpretation, KappaInput, KappaResult, MetricBundle,
    MetricName, MetricResult,
};
pub use service::evaluate;
