// src/haptic/mod.rs
//! Haptic intervention engine
//!
//! Consumes classification events and drives two actuator channels through
//! timed, interruptible vibration patterns with fade transitions, scoring
//! each intervention's effectiveness after the fact.

pub mod engine;
pub mod patterns;

pub use engine::{EngineState, HapticEngine, HapticStats, TickOutcome};
pub use patterns::{HapticPattern, HapticStep, PatternTable};
