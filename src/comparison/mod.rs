//! Cross-technique ranking of stored experiments.

pub mod domain;
pub mod service;

pub use domain::{Best, ComparisonResult, ComparisonSummary, TechniqueMetrics};
pub use service::compare;
