// src/telemetry/mod.rs
//! Telemetry aggregation and delivery
//!
//! Derived metrics from the classification and feature stages are kept in
//! sliding windows, folded into one of two JSON wire schemas, and delivered
//! through the transport capability with bounded retries.

pub mod aggregator;
pub mod history;
pub mod payload;

pub use aggregator::{TelemetryAggregator, TelemetryStats};
pub use history::HistoryWindow;
pub use payload::{CompactPayload, FullPayload, SessionEvent};
