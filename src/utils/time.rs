// src/utils/time.rs
//! Time providers and timestamp formatting

use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Time provider trait for dependency injection and testing
pub trait TimeProvider: Send + Sync {
    /// Current time in microseconds since the Unix epoch
    fn now_micros(&self) -> u64;

    /// Current time in whole seconds since the Unix epoch
    fn now_secs(&self) -> u64 {
        self.now_micros() / 1_000_000
    }
}

/// System time provider using the actual system clock
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now_micros(&self) -> u64 {
        current_timestamp_micros()
    }
}

/// Mock time provider for deterministic testing
pub struct MockTimeProvider {
    current_time: AtomicU64,
}

impl MockTimeProvider {
    /// Create a provider starting at the given microsecond timestamp
    pub fn new(initial_time_micros: u64) -> Self {
        Self {
            current_time: AtomicU64::new(initial_time_micros),
        }
    }

    /// Advance the mock clock
    pub fn advance_by(&self, micros: u64) {
        self.current_time.fetch_add(micros, Ordering::Relaxed);
    }

    /// Set the mock clock to an absolute value
    pub fn set_time(&self, micros: u64) {
        self.current_time.store(micros, Ordering::Relaxed);
    }
}

impl TimeProvider for MockTimeProvider {
    fn now_micros(&self) -> u64 {
        self.current_time.load(Ordering::Relaxed)
    }
}

/// Current system time in microseconds since the Unix epoch
pub fn current_timestamp_micros() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros() as u64
}

/// Format a microsecond timestamp as an ISO-8601 string (UTC, second precision)
pub fn iso8601_timestamp(timestamp_us: u64) -> String {
    let secs = (timestamp_us / 1_000_000) as i64;
    DateTime::<Utc>::from_timestamp(secs, 0)
        .unwrap_or_else(|| DateTime::<Utc>::from_timestamp(0, 0).expect("epoch is valid"))
        .to_rfc3339_opts(SecondsFormat::Secs, true)
}
