//! Neuro-Core: Real-time EEG cognitive-state pipeline for haptic wearables
//!
//! This library is the device core of a two-channel EEG wearable. It moves
//! raw samples through a fixed-priority stage pipeline synchronized by binary
//! signals, drives a bilateral haptic actuator in timed, interruptible
//! intervention patterns, and aggregates derived metrics into telemetry
//! payloads delivered off-device with bounded retries. It features:
//!
//! - Hardware abstraction traits for acquisition, actuation and transport
//! - Overwrite-on-full ring buffering tuned for bounded-latency acquisition
//! - A steppable haptic intervention engine with fade transitions
//! - Sliding-window telemetry aggregation with a derived data-quality score
//! - Comprehensive configuration management
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use neuro_core::config::SystemConfig;
//! use neuro_core::hal::simulator::{SineSampleSource, RecordingActuator,
//!     LoopbackTransport, StaticClassifier, StaticFeatureSource, FixedStats};
//! use neuro_core::pipeline::{Capabilities, PipelineScheduler};
//! use std::sync::Arc;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SystemConfig::default();
//!     let caps = Capabilities {
//!         source: Box::new(SineSampleSource::new(config.system.sampling_rate_hz)),
//!         features: Box::new(StaticFeatureSource::default()),
//!         classifier: Box::new(StaticClassifier::default()),
//!         stats: Arc::new(FixedStats::default()),
//!         transport: Box::new(LoopbackTransport::new()),
//!         actuator: Box::new(RecordingActuator::new()),
//!     };
//!
//!     let scheduler = PipelineScheduler::start(config, caps)?;
//!     std::thread::sleep(std::time::Duration::from_secs(5));
//!     scheduler.shutdown();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod acquisition;
pub mod config;
pub mod error;
pub mod hal;
pub mod haptic;
pub mod pipeline;
pub mod telemetry;
pub mod utils;

// Re-export commonly used types for convenience
pub use error::{NeuroError, NeuroResult};
pub use hal::{
    Classification, CognitiveState, EegSample, FeatureVector, HapticActuator,
    ProcessingStats, SampleSource, Transport,
};
pub use haptic::{HapticEngine, HapticStats};
pub use telemetry::{TelemetryAggregator, TelemetryStats};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
