// src/hal/mod.rs
//! Hardware abstraction layer for the EEG pipeline
//!
//! The core never programs ADC registers, computes features, classifies
//! states, or frames transport bytes itself. Those concerns live behind the
//! capability traits in [`traits`], and the simulator implementations in
//! [`simulator`] stand in for real hardware in demos and tests.

pub mod simulator;
pub mod traits;
pub mod types;

pub use traits::{
    ClassifierSource, FeatureSource, HapticActuator, SampleSource, StatsSource, Transport,
};
pub use types::{
    Classification, CognitiveState, EegSample, FeatureVector, ProcessingStats,
};
