// src/config/constants.rs
//! System-wide constants grouped by subsystem

/// Signal acquisition constants
pub mod signal {
    /// Default EEG sampling rate in Hz
    pub const DEFAULT_SAMPLING_RATE_HZ: u32 = 500;

    /// Default ring buffer capacity (4 seconds at 500 Hz)
    pub const DEFAULT_BUFFER_SIZE_SAMPLES: usize = 2048;

    /// Samples handed downstream per preprocessing wake
    pub const DEFAULT_PROCESSING_WINDOW: usize = 1024;
}

/// Haptic engine constants
pub mod haptic {
    /// Pattern step resolution in milliseconds (20 Hz tick)
    pub const PATTERN_RESOLUTION_MS: u32 = 50;

    /// Maximum actuator intensity in percent duty cycle
    pub const MAX_INTENSITY: u8 = 100;

    /// Upper bound on steps per pattern
    pub const MAX_PATTERN_STEPS: usize = 32;

    /// Effectiveness score recorded for an effective intervention
    pub const EFFECTIVE_SCORE: f32 = 0.8;

    /// Effectiveness score recorded for an ineffective intervention
    pub const INEFFECTIVE_SCORE: f32 = 0.3;
}

/// Telemetry aggregation constants
pub mod telemetry {
    /// Interval between aggregator wakes in seconds
    pub const DEFAULT_INTERVAL_S: u32 = 30;

    /// Classification history window (3 minutes at 30 s wakes)
    pub const AGGREGATION_WINDOW_SIZE: usize = 6;

    /// Feature vector history window
    pub const FEATURE_HISTORY_SIZE: usize = 10;

    /// Maximum delivery attempts per payload
    pub const MAX_RETRIES: u32 = 3;

    /// Fixed delay between retry attempts in milliseconds
    pub const RETRY_DELAY_MS: u64 = 1000;
}

/// Pipeline scheduling constants
pub mod pipeline {
    /// Delay between iterations of a parked stage's idle loop, in milliseconds
    pub const PARK_DELAY_MS: u64 = 1000;
}
