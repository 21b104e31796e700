// src/config/mod.rs
//! Configuration management
//!
//! A single [`SystemConfig`] tree with per-field serde defaults, TOML
//! loading, and consistency validation. Historic firmware builds hard-coded
//! two payload schemas behind compile-time symbols; here the schema is a
//! plain configuration value ([`PayloadSchema`]).

pub mod constants;

pub use constants::*;

use crate::error::{NeuroError, NeuroResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete system configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct SystemConfig {
    /// Acquisition and buffering settings
    #[serde(default)]
    pub system: SystemSettings,
    /// Haptic engine settings
    #[serde(default)]
    pub haptic: HapticConfig,
    /// Telemetry aggregation and delivery settings
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Acquisition and buffering settings
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SystemSettings {
    /// Sampling rate of the acquisition front-end
    #[serde(default = "defaults::sampling_rate_hz")]
    pub sampling_rate_hz: u32,

    /// Capacity of the raw sample ring buffer
    #[serde(default = "defaults::buffer_size_samples")]
    pub buffer_size_samples: usize,

    /// Samples drained per preprocessing wake
    #[serde(default = "defaults::processing_window")]
    pub processing_window: usize,
}

/// Haptic engine settings
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HapticConfig {
    /// Pattern step resolution in milliseconds
    #[serde(default = "defaults::tick_resolution_ms")]
    pub tick_resolution_ms: u32,
}

/// Telemetry payload schema selection
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PayloadSchema {
    /// Nested aggregate schema (cognitive/signal/frequency/behavioral blocks)
    Full,
    /// Flat per-state schema with 0-10 scaled cognitive scores
    Compact,
}

/// Telemetry aggregation and delivery settings
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TelemetryConfig {
    /// Device identifier stamped into every payload
    #[serde(default = "defaults::device_id")]
    pub device_id: String,

    /// User identifier (compact schema only)
    #[serde(default = "defaults::user_id")]
    pub user_id: String,

    /// Seconds between aggregator wakes
    #[serde(default = "defaults::interval_s")]
    pub interval_s: u32,

    /// Wakes per transmission super-cycle
    #[serde(default = "defaults::wakes_per_transmission")]
    pub wakes_per_transmission: u32,

    /// Classification history window size
    #[serde(default = "defaults::aggregation_window")]
    pub aggregation_window: usize,

    /// Feature history window size
    #[serde(default = "defaults::feature_history")]
    pub feature_history: usize,

    /// Maximum delivery attempts per payload
    #[serde(default = "defaults::max_retries")]
    pub max_retries: u32,

    /// Fixed delay between retry attempts in milliseconds
    #[serde(default = "defaults::retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Which wire schema to emit
    #[serde(default = "defaults::schema")]
    pub schema: PayloadSchema,
}

/// Default value providers using constants
mod defaults {
    use super::PayloadSchema;
    use crate::config::constants::*;

    pub fn sampling_rate_hz() -> u32 { signal::DEFAULT_SAMPLING_RATE_HZ }
    pub fn buffer_size_samples() -> usize { signal::DEFAULT_BUFFER_SIZE_SAMPLES }
    pub fn processing_window() -> usize { signal::DEFAULT_PROCESSING_WINDOW }

    pub fn tick_resolution_ms() -> u32 { haptic::PATTERN_RESOLUTION_MS }

    pub fn device_id() -> String { "NEURO_001".to_string() }
    pub fn user_id() -> String { "neuro_user_001".to_string() }
    pub fn interval_s() -> u32 { telemetry::DEFAULT_INTERVAL_S }
    pub fn wakes_per_transmission() -> u32 { telemetry::AGGREGATION_WINDOW_SIZE as u32 }
    pub fn aggregation_window() -> usize { telemetry::AGGREGATION_WINDOW_SIZE }
    pub fn feature_history() -> usize { telemetry::FEATURE_HISTORY_SIZE }
    pub fn max_retries() -> u32 { telemetry::MAX_RETRIES }
    pub fn retry_delay_ms() -> u64 { telemetry::RETRY_DELAY_MS }
    pub fn schema() -> PayloadSchema { PayloadSchema::Full }
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            sampling_rate_hz: defaults::sampling_rate_hz(),
            buffer_size_samples: defaults::buffer_size_samples(),
            processing_window: defaults::processing_window(),
        }
    }
}

impl Default for HapticConfig {
    fn default() -> Self {
        Self {
            tick_resolution_ms: defaults::tick_resolution_ms(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            device_id: defaults::device_id(),
            user_id: defaults::user_id(),
            interval_s: defaults::interval_s(),
            wakes_per_transmission: defaults::wakes_per_transmission(),
            aggregation_window: defaults::aggregation_window(),
            feature_history: defaults::feature_history(),
            max_retries: defaults::max_retries(),
            retry_delay_ms: defaults::retry_delay_ms(),
            schema: defaults::schema(),
        }
    }
}

impl SystemConfig {
    /// Load and validate a configuration from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> NeuroResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: SystemConfig =
            toml::from_str(&raw).map_err(|e| NeuroError::Configuration {
                component: "config",
                reason: e.to_string(),
            })?;
        config.validate_consistency()?;
        Ok(config)
    }

    /// Validate configuration consistency
    pub fn validate_consistency(&self) -> NeuroResult<()> {
        if self.system.sampling_rate_hz == 0 {
            return Err(NeuroError::Configuration {
                component: "system",
                reason: "sampling_rate_hz must be non-zero".to_string(),
            });
        }
        if self.system.buffer_size_samples == 0 {
            return Err(NeuroError::Configuration {
                component: "system",
                reason: "buffer_size_samples must be non-zero".to_string(),
            });
        }
        if self.system.processing_window > self.system.buffer_size_samples {
            return Err(NeuroError::Configuration {
                component: "system",
                reason: format!(
                    "processing_window ({}) exceeds buffer capacity ({})",
                    self.system.processing_window, self.system.buffer_size_samples
                ),
            });
        }
        if self.haptic.tick_resolution_ms == 0 {
            return Err(NeuroError::Configuration {
                component: "haptic",
                reason: "tick_resolution_ms must be non-zero".to_string(),
            });
        }
        if self.telemetry.max_retries == 0 {
            return Err(NeuroError::Configuration {
                component: "telemetry",
                reason: "max_retries must be at least 1".to_string(),
            });
        }
        if self.telemetry.wakes_per_transmission == 0
            || self.telemetry.aggregation_window == 0
            || self.telemetry.feature_history == 0
        {
            return Err(NeuroError::Configuration {
                component: "telemetry",
                reason: "window sizes must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}
