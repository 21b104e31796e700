// src/pipeline/mod.rs
//! Fixed-priority stage pipeline
//!
//! The pipeline runs one thread per stage, synchronized by binary wake
//! signals so each stage runs exactly once per upstream event. Stage
//! priorities are nominal on a hosted OS; they document the firmware
//! ordering and show up in logs and thread names.

pub mod context;
pub mod scheduler;
pub mod signal;

pub use context::{PipelineContext, SharedLatest, StageSignals};
pub use scheduler::{Capabilities, PipelineScheduler};
pub use signal::{ShutdownFlag, StageSignal};

/// Nominal stage priorities, lower value runs first under contention
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StagePriority {
    /// Sample acquisition, released by the sample clock
    Acquisition,
    /// Ring buffer draining and windowing
    Preprocessing,
    /// Feature vector publication
    FeatureExtraction,
    /// Classification record publication
    Classification,
    /// Haptic intervention engine
    Haptic,
    /// Telemetry aggregation and delivery
    Telemetry,
}

impl StagePriority {
    /// Numeric priority inherited from the firmware task table
    pub const fn value(self) -> u8 {
        match self {
            StagePriority::Acquisition => 10,
            StagePriority::Preprocessing => 15,
            StagePriority::FeatureExtraction => 20,
            StagePriority::Classification => 25,
            StagePriority::Haptic => 30,
            StagePriority::Telemetry => 35,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priorities_are_strictly_ordered() {
        let priorities = [
            StagePriority::Acquisition,
            StagePriority::Preprocessing,
            StagePriority::FeatureExtraction,
            StagePriority::Classification,
            StagePriority::Haptic,
            StagePriority::Telemetry,
        ];
        for pair in priorities.windows(2) {
            assert!(pair[0].value() < pair[1].value());
        }
    }
}
