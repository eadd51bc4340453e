//! Runtime configuration loaded from the process environment.

use std::env;
use std::path::PathBuf;

use super::error::{DiagError, DiagResult};

/// Confidence level applied when a request or upload row omits one.
pub const DEFAULT_CONFIDENCE: f64 = 0.95;

/// Output format of the log subscriber.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Snapshot of configuration values consumed by the engine.
#[derive(Clone, Debug)]
pub struct AppCfg {
    /// Root for filesystem persistence; `None` keeps experiments in memory.
    pub data_root: Option<PathBuf>,
    pub default_confidence: f64,
    pub log_filter: String,
    pub log_format: LogFormat,
}

impl Default for AppCfg {
    fn default() -> Self {
        Self {
            data_root: None,
            default_confidence: DEFAULT_CONFIDENCE,
            log_filter: "info".to_string(),
            log_format: LogFormat::Json,
        }
    }
}

impl AppCfg {
    /// Create a configuration snapshot from the process environment.
    pub fn load() -> DiagResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a snapshot from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> DiagResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let data_root = lookup("DIAGSTAT_DATA_ROOT")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let raw_confidence = env_or("DIAGSTAT_DEFAULT_CONFIDENCE", "0.95");
        let default_confidence: f64 = raw_confidence.trim().parse().map_err(|_| {
            DiagError::invalid(
                "DIAGSTAT_DEFAULT_CONFIDENCE",
                format!("not a number: {raw_confidence:?}"),
            )
        })?;
        if !(default_confidence > 0.0 && default_confidence < 1.0) {
            return Err(DiagError::invalid(
                "DIAGSTAT_DEFAULT_CONFIDENCE",
                format!("must lie strictly between 0 and 1, got {default_confidence}"),
            ));
        }

        let log_format = match env_or("DIAGSTAT_LOG_FORMAT", "json").to_ascii_lowercase().as_str() {
            "pretty" | "text" => LogFormat::Pretty,
            _ => LogFormat::Json,
        };

        Ok(Self {
            data_root,
            default_confidence,
            log_filter: env_or("DIAGSTAT_LOG", "info"),
            log_format,
        })
    }
}
