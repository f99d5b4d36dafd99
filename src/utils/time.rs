// src/utils/time.rs

use chrono::{DateTime, Utc};

/// Clock handle for operations anchored at "now" (lookback windows,
/// forecast histories). Kept behind a struct so call sites stay mockable.
#[derive(Debug, Clone)]
pub struct TimeService;

impl TimeService {
    pub fn new() -> Self {
        TimeService
    }

    /// Current UTC date and time.
    pub fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl Default for TimeService {
    fn default() -> Self {
        Self::new()
    }
}
