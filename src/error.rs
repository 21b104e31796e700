// src/error.rs
//! Unified error handling for the neuro-core pipeline
//!
//! Transient hardware and transport failures are recovered locally by the
//! stages that encounter them; the variants here are what crosses component
//! boundaries. Statistics counters remain the only externally observable
//! trace of recovered transients.

use thiserror::Error;

/// Unified error type for the pipeline core
#[derive(Debug, Error)]
pub enum NeuroError {
    /// Sample read failed at the acquisition capability
    #[error("acquisition error: {0}")]
    Acquisition(String),

    /// Transport send failed; `attempts` is how many tries were made
    #[error("transport error after {attempts} attempt(s): {reason}")]
    Transport {
        /// Number of attempts made before giving up
        attempts: u32,
        /// Underlying failure description
        reason: String,
    },

    /// Configuration was rejected before the affected component started
    #[error("configuration error in {component}: {reason}")]
    Configuration {
        /// Component whose configuration failed validation
        component: &'static str,
        /// Human-readable rejection reason
        reason: String,
    },

    /// Operation invoked before the owning subsystem finished `init`
    #[error("{0} not initialized")]
    NotInitialized(&'static str),

    /// Input rejected without state mutation
    #[error("invalid {what}: {reason}")]
    InvalidData {
        /// What kind of input was rejected
        what: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// Payload serialization failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Underlying I/O failure (config loading)
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for core operations
pub type NeuroResult<T> = Result<T, NeuroError>;
