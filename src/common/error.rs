//! Error handling primitives shared across the engine.
//!
//! Every failure is a caller-input problem or a storage fault; nothing here is
//! retried. `DiagCode` is the stable numeric form that crosses the FFI boundary.

use thiserror::Error;

/// Stable error codes that cross the FFI boundary.
#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DiagCode {
    /// Success code used as a sentinel.
    Ok = 0,
    /// Counts, confidence level or technique name failed validation.
    InvalidInput = 1,
    /// Rater sequences differ in length.
    LengthMismatch = 2,
    /// Rater sequences are empty.
    EmptyInput = 3,
    /// Chance agreement is 1, kappa has no denominator.
    DegenerateAgreement = 4,
    /// One or more experiment ids are unknown.
    NotFound = 5,
    /// Fewer than two experiments selected for comparison.
    InsufficientSelection = 6,
    /// Repository could not read or write a record.
    Storage = 7,
    /// Catch-all for bugs.
    Internal = 8,
}

/// Canonical error type for the engine.
#[derive(Debug, Error)]
pub enum DiagError {
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("rater sequences differ in length: rater1 has {rater1}, rater2 has {rater2}")]
    LengthMismatch { rater1: usize, rater2: usize },

    #[error("rater sequences are empty")]
    EmptyInput,

    #[error("both raters only used category {category:?}; chance agreement is 1 and kappa is undefined")]
    DegenerateAgreement { category: String },

    #[error("experiment not found: {}", .ids.join(", "))]
    NotFound { ids: Vec<String> },

    #[error("comparison needs at least {required} experiments, got {actual}")]
    InsufficientSelection { required: usize, actual: usize },

    #[error("storage error: {0}")]
    Storage(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Result alias used throughout the crate.
pub type DiagResult<T> = Result<T, DiagError>;

impl DiagError {
    /// Validation helper.
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    /// Not-found helper for a single id.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            ids: vec![id.into()],
        }
    }

    /// Internal error helper.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Machine parsable code for this error.
    pub fn code(&self) -> DiagCode {
        match self {
            Self::InvalidInput { .. } => DiagCode::InvalidInput,
            Self::LengthMismatch { .. } => DiagCode::LengthMismatch,
            Self::EmptyInput => DiagCode::EmptyInput,
            Self::DegenerateAgreement { .. } => DiagCode::DegenerateAgreement,
            Self::NotFound { .. } => DiagCode::NotFound,
            Self::InsufficientSelection { .. } => DiagCode::InsufficientSelection,
            Self::Storage(_) | Self::Io(_) | Self::Serde(_) => DiagCode::Storage,
            Self::Internal(_) => DiagCode::Internal,
        }
    }

    /// HTTP-style status the API facade reports for this error.
    pub fn status(&self) -> u16 {
        match self {
            Self::InvalidInput { .. } => 422,
            Self::LengthMismatch { .. }
            | Self::EmptyInput
            | Self::DegenerateAgreement { .. }
            | Self::InsufficientSelection { .. } => 400,
            Self::NotFound { .. } => 404,
            Self::Storage(_) | Self::Io(_) | Self::Serde(_) | Self::Internal(_) => 500,
        }
    }
}
