// src/hal/simulator.rs
//! Simulator implementations of the capability traits
//!
//! These stand in for real hardware in demos and tests: a sinusoidal sample
//! source, static feature/classifier producers, recording and failing
//! transports, and an actuator that records every intensity write.

use crate::error::{NeuroError, NeuroResult};
use crate::hal::traits::{
    ClassifierSource, FeatureSource, HapticActuator, SampleSource, StatsSource, Transport,
};
use crate::hal::types::{
    Classification, CognitiveState, EegSample, FeatureVector, ProcessingStats, STATE_COUNT,
};
use parking_lot::Mutex;
use std::f64::consts::TAU;
use std::sync::Arc;

/// Sinusoidal two-channel sample source
///
/// Generates a 10 Hz alpha-band tone on both channels with a slight
/// right-channel attenuation, amplitude scaled to a realistic 24-bit range.
pub struct SineSampleSource {
    sampling_rate_hz: u32,
    tone_hz: f64,
    amplitude: f64,
    tick: u64,
}

impl SineSampleSource {
    /// Create a source running at the given sampling rate
    pub fn new(sampling_rate_hz: u32) -> Self {
        Self {
            sampling_rate_hz: sampling_rate_hz.max(1),
            tone_hz: 10.0,
            amplitude: 100_000.0,
            tick: 0,
        }
    }

    /// Override the tone frequency
    pub fn with_tone_hz(mut self, tone_hz: f64) -> Self {
        self.tone_hz = tone_hz;
        self
    }
}

impl SampleSource for SineSampleSource {
    fn read_sample(&mut self) -> NeuroResult<EegSample> {
        let t = self.tick as f64 / self.sampling_rate_hz as f64;
        let value = (TAU * self.tone_hz * t).sin() * self.amplitude;
        let sample = EegSample {
            left: value as i32,
            right: (value * 0.9) as i32,
            timestamp_us: self.tick * 1_000_000 / self.sampling_rate_hz as u64,
        };
        self.tick += 1;
        Ok(sample)
    }
}

/// Sample source that fails every `n`-th read
///
/// Exercises the acquisition stage's skip-and-continue path.
pub struct FlakySampleSource<S> {
    inner: S,
    fail_every: u64,
    reads: u64,
}

impl<S: SampleSource> FlakySampleSource<S> {
    /// Wrap a source, failing every `fail_every`-th read (1-based)
    pub fn new(inner: S, fail_every: u64) -> Self {
        Self {
            inner,
            fail_every: fail_every.max(1),
            reads: 0,
        }
    }
}

impl<S: SampleSource> SampleSource for FlakySampleSource<S> {
    fn read_sample(&mut self) -> NeuroResult<EegSample> {
        self.reads += 1;
        if self.reads % self.fail_every == 0 {
            return Err(NeuroError::Acquisition("simulated DRDY miss".to_string()));
        }
        self.inner.read_sample()
    }
}

/// Feature source returning a fixed, settable vector
#[derive(Clone, Default)]
pub struct StaticFeatureSource {
    features: Arc<Mutex<FeatureVector>>,
}

impl StaticFeatureSource {
    /// Create a source pre-loaded with the given vector
    pub fn with_features(features: FeatureVector) -> Self {
        Self {
            features: Arc::new(Mutex::new(features)),
        }
    }

    /// Replace the vector returned from now on
    pub fn set(&self, features: FeatureVector) {
        *self.features.lock() = features;
    }
}

impl FeatureSource for StaticFeatureSource {
    fn feature_vector(&mut self) -> NeuroResult<FeatureVector> {
        Ok(*self.features.lock())
    }
}

/// Classifier source returning a fixed, settable record
#[derive(Clone)]
pub struct StaticClassifier {
    result: Arc<Mutex<Classification>>,
}

impl Default for StaticClassifier {
    fn default() -> Self {
        let mut confidence = [0.0; STATE_COUNT];
        confidence[CognitiveState::Calm.index()] = 0.8;
        Self::with_result(Classification {
            dominant_state: CognitiveState::Calm,
            confidence,
            wellness_score: 0.8,
            intervention_needed: false,
        })
    }
}

impl StaticClassifier {
    /// Create a classifier pre-loaded with the given record
    pub fn with_result(result: Classification) -> Self {
        Self {
            result: Arc::new(Mutex::new(result)),
        }
    }

    /// Replace the record returned from now on
    pub fn set(&self, result: Classification) {
        *self.result.lock() = result;
    }
}

impl ClassifierSource for StaticClassifier {
    fn classification(&mut self) -> NeuroResult<Classification> {
        Ok(*self.result.lock())
    }
}

/// Fixed processing statistics snapshot
#[derive(Debug, Default)]
pub struct FixedStats {
    stats: Mutex<ProcessingStats>,
}

impl FixedStats {
    /// Create with the given counters
    pub fn new(total_samples: u64, artifact_count: u64) -> Self {
        Self {
            stats: Mutex::new(ProcessingStats {
                total_samples,
                artifact_count,
                ready: true,
            }),
        }
    }

    /// Replace the snapshot returned from now on
    pub fn set(&self, stats: ProcessingStats) {
        *self.stats.lock() = stats;
    }
}

impl StatsSource for FixedStats {
    fn processing_stats(&self) -> ProcessingStats {
        *self.stats.lock()
    }
}

/// Transport that records every payload it is asked to send
#[derive(Clone, Default)]
pub struct LoopbackTransport {
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl LoopbackTransport {
    /// Create an empty loopback transport
    pub fn new() -> Self {
        Self::default()
    }

    /// Payloads captured so far, in send order
    pub fn payloads(&self) -> Vec<Vec<u8>> {
        self.sent.lock().clone()
    }

    /// Number of successful sends
    pub fn send_count(&self) -> usize {
        self.sent.lock().len()
    }
}

impl Transport for LoopbackTransport {
    fn send(&mut self, payload: &[u8]) -> NeuroResult<()> {
        self.sent.lock().push(payload.to_vec());
        Ok(())
    }
}

/// Transport that fails the first `fail_count` sends, then succeeds
#[derive(Clone, Default)]
pub struct FailingTransport {
    fail_count: Arc<Mutex<u32>>,
    attempts: Arc<Mutex<u32>>,
}

impl FailingTransport {
    /// Fail the first `fail_count` attempts; `u32::MAX` fails forever
    pub fn failing(fail_count: u32) -> Self {
        Self {
            fail_count: Arc::new(Mutex::new(fail_count)),
            attempts: Arc::new(Mutex::new(0)),
        }
    }

    /// Transport that never succeeds
    pub fn always_failing() -> Self {
        Self::failing(u32::MAX)
    }

    /// Total send attempts observed
    pub fn attempts(&self) -> u32 {
        *self.attempts.lock()
    }
}

impl Transport for FailingTransport {
    fn send(&mut self, _payload: &[u8]) -> NeuroResult<()> {
        *self.attempts.lock() += 1;
        let mut remaining = self.fail_count.lock();
        if *remaining > 0 {
            if *remaining != u32::MAX {
                *remaining -= 1;
            }
            return Err(NeuroError::Transport {
                attempts: 1,
                reason: "simulated link failure".to_string(),
            });
        }
        Ok(())
    }
}

/// Actuator that records every intensity write
#[derive(Clone, Default)]
pub struct RecordingActuator {
    writes: Arc<Mutex<Vec<(u8, u8)>>>,
    init_ok: bool,
}

impl RecordingActuator {
    /// Create an actuator whose `init` succeeds
    pub fn new() -> Self {
        Self {
            writes: Arc::new(Mutex::new(Vec::new())),
            init_ok: true,
        }
    }

    /// Create an actuator whose `init` fails, for park-loop testing
    pub fn broken() -> Self {
        Self {
            writes: Arc::new(Mutex::new(Vec::new())),
            init_ok: false,
        }
    }

    /// All `(left, right)` writes observed, in order
    pub fn writes(&self) -> Vec<(u8, u8)> {
        self.writes.lock().clone()
    }

    /// Most recent write, if any
    pub fn last_write(&self) -> Option<(u8, u8)> {
        self.writes.lock().last().copied()
    }
}

impl HapticActuator for RecordingActuator {
    fn init(&mut self) -> NeuroResult<()> {
        if self.init_ok {
            Ok(())
        } else {
            Err(NeuroError::NotInitialized("actuator hardware"))
        }
    }

    fn set_intensity(&mut self, left: u8, right: u8) -> NeuroResult<()> {
        self.writes.lock().push((left, right));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sine_source_produces_monotonic_timestamps() {
        let mut source = SineSampleSource::new(500);
        let a = source.read_sample().unwrap();
        let b = source.read_sample().unwrap();
        assert!(b.timestamp_us > a.timestamp_us || a.timestamp_us == 0);
    }

    #[test]
    fn test_flaky_source_fails_periodically() {
        let mut source = FlakySampleSource::new(SineSampleSource::new(500), 3);
        assert!(source.read_sample().is_ok());
        assert!(source.read_sample().is_ok());
        assert!(source.read_sample().is_err());
        assert!(source.read_sample().is_ok());
    }

    #[test]
    fn test_failing_transport_recovers() {
        let mut transport = FailingTransport::failing(2);
        assert!(transport.send(b"x").is_err());
        assert!(transport.send(b"x").is_err());
        assert!(transport.send(b"x").is_ok());
        assert_eq!(transport.attempts(), 3);
    }

    #[test]
    fn test_recording_actuator_captures_writes() {
        let mut actuator = RecordingActuator::new();
        actuator.init().unwrap();
        actuator.set_intensity(30, 40).unwrap();
        assert_eq!(actuator.last_write(), Some((30, 40)));
    }
}
