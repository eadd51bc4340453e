//! Clock helpers used by multiple services.

use std::time::Instant;

use chrono::{DateTime, Utc};

/// Current wall-clock time in UTC, used for record timestamps.
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Milliseconds elapsed since `start`, for latency fields in log events.
pub fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
