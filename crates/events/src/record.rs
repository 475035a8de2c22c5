//! EventRecord - journal envelope around a loan event

use chrono::{DateTime, Utc};
use peerlend_engine::LoanEvent;
use serde::{Deserialize, Serialize};

/// One journal line
///
/// `sequence` starts at 1 and is gap-free; the reader refuses journals that
/// skip or repeat numbers. `correlation_id` ties the record to the request
/// that caused it (a uuid v4 at the CLI edge).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub correlation_id: String,
    pub event: LoanEvent,
}

impl EventRecord {
    /// Wrap an event, stamping the current time
    pub fn new(sequence: u64, correlation_id: impl Into<String>, event: LoanEvent) -> Self {
        Self {
            sequence,
            timestamp: Utc::now(),
            correlation_id: correlation_id.into(),
            event,
        }
    }
}
