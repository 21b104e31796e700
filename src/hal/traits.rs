// src/hal/traits.rs
//! Capability traits at the boundary of the core
//!
//! Each trait reproduces the usage contract of an external collaborator: the
//! acquisition front-end, the signal-processing chain, the classifier, the
//! actuator driver and the byte transport. The pipeline owns boxed instances
//! and never looks behind the trait.

use crate::error::NeuroResult;
use crate::hal::types::{Classification, EegSample, FeatureVector, ProcessingStats};

/// Acquisition capability, invoked once per timer tick
pub trait SampleSource: Send {
    /// Read the next two-channel sample from the front-end
    fn read_sample(&mut self) -> NeuroResult<EegSample>;
}

/// Feature producer exposed by the external extraction stage
pub trait FeatureSource: Send {
    /// Latest computed feature vector
    fn feature_vector(&mut self) -> NeuroResult<FeatureVector>;
}

/// Classification producer exposed by the external classifier stage
pub trait ClassifierSource: Send {
    /// Latest classification record
    fn classification(&mut self) -> NeuroResult<Classification>;
}

/// Read-only view of the external processing stage's global statistics
pub trait StatsSource: Send + Sync {
    /// Snapshot of sample/artifact counters
    fn processing_stats(&self) -> ProcessingStats;
}

/// Byte-oriented transport with an implicit timeout
pub trait Transport: Send {
    /// Send one serialized payload; a failed send is retried by the caller
    fn send(&mut self, payload: &[u8]) -> NeuroResult<()>;
}

/// Bilateral vibration actuator
pub trait HapticActuator: Send {
    /// Bring up the actuator hardware; failure parks the haptic stage
    fn init(&mut self) -> NeuroResult<()>;

    /// Drive both channels; intensities are percent duty cycle in 0..=100
    fn set_intensity(&mut self, left: u8, right: u8) -> NeuroResult<()>;
}
