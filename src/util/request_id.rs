//! Timestamp-derived request identifiers.
//!
//! Identifiers look like `req_20250101120000123456`: a fixed prefix, the
//! local wall-clock time to the second, then six microsecond digits. Each
//! HTTP call gets one and it doubles as the conversation key, so the
//! generator never hands out the same value twice within a process, even when
//! two calls land in the same microsecond.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Local, Utc};

pub const REQUEST_ID_PREFIX: &str = "req_";

/// Issues strictly increasing timestamp identifiers.
#[derive(Debug)]
pub struct RequestIdGenerator {
    prefix: String,
    last_micros: AtomicI64,
}

impl Default for RequestIdGenerator {
    fn default() -> Self {
        Self::new(REQUEST_ID_PREFIX)
    }
}

impl RequestIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            last_micros: AtomicI64::new(i64::MIN),
        }
    }

    /// Mint the next identifier from the current time.
    pub fn next_id(&self) -> String {
        self.next_id_at(Utc::now())
    }

    /// Mint an identifier for `now`, bumped past the previous one if needed.
    pub fn next_id_at(&self, now: DateTime<Utc>) -> String {
        let wanted = now.timestamp_micros();
        let previous = self
            .last_micros
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(wanted.max(last.saturating_add(1)))
            })
            .unwrap_or_else(|last| last);
        let issued = wanted.max(previous.saturating_add(1));

        let stamp = DateTime::from_timestamp_micros(issued)
            .unwrap_or(now)
            .with_timezone(&Local);
        format!("{}{}", self.prefix, stamp.format("%Y%m%d%H%M%S%6f"))
    }
}
