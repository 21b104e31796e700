// src/pipeline/context.rs
//! Explicitly owned shared state passed to every stage
//!
//! The firmware heritage of this design kept its ring buffer, history arrays
//! and semaphore IDs in module-level statics; here they live in one
//! [`PipelineContext`] handed to each stage at construction.

use crate::acquisition::ring_buffer::SampleRingBuffer;
use crate::config::SystemConfig;
use crate::hal::types::{Classification, FeatureVector};
use crate::pipeline::signal::{ShutdownFlag, StageSignal};
use crate::utils::time::TimeProvider;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Latest classification and feature vector, guarded as one region
///
/// These two records are the only genuinely shared mutable resource in the
/// pipeline: the classifier stage writes them, the haptic and telemetry
/// stages read them. A single mutex guards both.
#[derive(Default)]
pub struct SharedLatest {
    inner: Mutex<Latest>,
}

#[derive(Default)]
struct Latest {
    classification: Option<Classification>,
    features: Option<FeatureVector>,
}

impl SharedLatest {
    /// Publish a new classification record
    pub fn set_classification(&self, classification: Classification) {
        self.inner.lock().classification = Some(classification);
    }

    /// Publish a new feature vector
    pub fn set_features(&self, features: FeatureVector) {
        self.inner.lock().features = Some(features);
    }

    /// Snapshot of the latest classification, if one has been published
    pub fn classification(&self) -> Option<Classification> {
        self.inner.lock().classification
    }

    /// Snapshot of the latest feature vector, if one has been published
    pub fn features(&self) -> Option<FeatureVector> {
        self.inner.lock().features
    }
}

/// Inter-stage wake signals, one per hand-off arrow
pub struct StageSignals {
    /// Raised by the sample clock (hardware DRDY stand-in)
    pub sample_ready: StageSignal,
    /// Raised by acquisition after every tick
    pub preprocessing: StageSignal,
    /// Raised by preprocessing after draining its window
    pub feature_extraction: StageSignal,
    /// Raised by feature extraction after publishing a vector
    pub classification: StageSignal,
    /// Raised by classification after publishing a record
    pub haptic: StageSignal,
}

impl StageSignals {
    fn new() -> Self {
        Self {
            sample_ready: StageSignal::new(),
            preprocessing: StageSignal::new(),
            feature_extraction: StageSignal::new(),
            classification: StageSignal::new(),
            haptic: StageSignal::new(),
        }
    }

    /// Raise every signal, releasing any stage parked on a wait-forever
    pub fn raise_all(&self) {
        self.sample_ready.raise();
        self.preprocessing.raise();
        self.feature_extraction.raise();
        self.classification.raise();
        self.haptic.raise();
    }
}

/// Owned context shared by all pipeline stages
pub struct PipelineContext {
    /// System configuration snapshot taken at startup
    pub config: SystemConfig,
    /// Raw sample ring buffer (acquisition writes, preprocessing reads)
    pub sample_buffer: Mutex<SampleRingBuffer>,
    /// Latest classification and features
    pub latest: Arc<SharedLatest>,
    /// Inter-stage wake signals
    pub signals: StageSignals,
    /// Process-wide shutdown latch, shared with the telemetry retry delay
    pub shutdown: Arc<ShutdownFlag>,
    /// Time source for timestamps and session accounting
    pub time: Arc<dyn TimeProvider>,
    /// Sample reads skipped because the front-end returned an error
    pub dropped_reads: AtomicU64,
}

impl PipelineContext {
    /// Build a context from a validated configuration
    pub fn new(config: SystemConfig, time: Arc<dyn TimeProvider>) -> Self {
        let buffer = SampleRingBuffer::new(config.system.buffer_size_samples);
        Self {
            config,
            sample_buffer: Mutex::new(buffer),
            latest: Arc::new(SharedLatest::default()),
            signals: StageSignals::new(),
            shutdown: Arc::new(ShutdownFlag::new()),
            time,
            dropped_reads: AtomicU64::new(0),
        }
    }

    /// Record one skipped sample read
    pub fn count_dropped_read(&self) {
        self.dropped_reads.fetch_add(1, Ordering::Relaxed);
    }

    /// Total sample reads skipped so far
    pub fn dropped_reads(&self) -> u64 {
        self.dropped_reads.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::types::CognitiveState;
    use crate::utils::time::MockTimeProvider;

    fn context() -> PipelineContext {
        PipelineContext::new(
            SystemConfig::default(),
            Arc::new(MockTimeProvider::new(0)),
        )
    }

    #[test]
    fn test_latest_starts_empty() {
        let ctx = context();
        assert!(ctx.latest.classification().is_none());
        assert!(ctx.latest.features().is_none());
    }

    #[test]
    fn test_latest_roundtrip() {
        let ctx = context();
        let mut record = Classification::default();
        record.dominant_state = CognitiveState::Stress;
        record.wellness_score = 0.4;
        ctx.latest.set_classification(record);

        let read = ctx.latest.classification().unwrap();
        assert_eq!(read.dominant_state, CognitiveState::Stress);
    }

    #[test]
    fn test_dropped_read_counter() {
        let ctx = context();
        ctx.count_dropped_read();
        ctx.count_dropped_read();
        assert_eq!(ctx.dropped_reads(), 2);
    }
}
