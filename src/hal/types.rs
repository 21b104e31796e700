// src/hal/types.rs
//! Core types shared across the acquisition, haptic and telemetry stages

use serde::{Deserialize, Serialize};

/// Number of cognitive states the classifier distinguishes
pub const STATE_COUNT: usize = 6;

/// Single two-channel EEG sample
///
/// ADC values are 24-bit, sign-extended into 32 bits at read time. Samples
/// are immutable once captured; the ring buffer owns them until the consumer
/// stage copies them out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EegSample {
    /// Left electrode channel, sign-extended 24-bit value
    pub left: i32,
    /// Right electrode channel, sign-extended 24-bit value
    pub right: i32,
    /// Capture timestamp in microseconds
    pub timestamp_us: u64,
}

/// Sign-extend a raw 24-bit ADC word into an `i32`.
///
/// Drivers assemble three data bytes into the low 24 bits and call this once
/// per channel.
pub fn sign_extend_24(raw: u32) -> i32 {
    if raw & 0x80_0000 != 0 {
        (raw | 0xFF00_0000) as i32
    } else {
        (raw & 0x00FF_FFFF) as i32
    }
}

/// Cognitive state tags produced by the external classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CognitiveState {
    /// Sustained attention
    Focus,
    /// Acute stress response
    Stress,
    /// Anxious arousal
    Anxiety,
    /// Mental fatigue
    Fatigue,
    /// Relaxed baseline
    Calm,
    /// Under-stimulation
    Boredom,
}

impl CognitiveState {
    /// All states in confidence-array order
    pub const ALL: [CognitiveState; STATE_COUNT] = [
        CognitiveState::Focus,
        CognitiveState::Stress,
        CognitiveState::Anxiety,
        CognitiveState::Fatigue,
        CognitiveState::Calm,
        CognitiveState::Boredom,
    ];

    /// Index of this state into a confidence array
    pub fn index(self) -> usize {
        match self {
            CognitiveState::Focus => 0,
            CognitiveState::Stress => 1,
            CognitiveState::Anxiety => 2,
            CognitiveState::Fatigue => 3,
            CognitiveState::Calm => 4,
            CognitiveState::Boredom => 5,
        }
    }

    /// Wire name used in telemetry payloads
    pub fn name(self) -> &'static str {
        match self {
            CognitiveState::Focus => "focus",
            CognitiveState::Stress => "stress",
            CognitiveState::Anxiety => "anxiety",
            CognitiveState::Fatigue => "fatigue",
            CognitiveState::Calm => "calm",
            CognitiveState::Boredom => "boredom",
        }
    }
}

/// Classification record produced once per pipeline cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    /// State with the highest confidence
    pub dominant_state: CognitiveState,
    /// Per-state confidence, indexed by [`CognitiveState::index`]
    pub confidence: [f32; STATE_COUNT],
    /// Overall wellness estimate; values <= 0 mark the record invalid
    pub wellness_score: f32,
    /// Whether the classifier requests a haptic intervention
    pub intervention_needed: bool,
}

impl Classification {
    /// Confidence of a specific state
    pub fn confidence_for(&self, state: CognitiveState) -> f32 {
        self.confidence[state.index()]
    }

    /// Confidence of the dominant state itself
    pub fn dominant_confidence(&self) -> f32 {
        self.confidence_for(self.dominant_state)
    }

    /// Valid records carry a positive wellness score
    pub fn is_valid(&self) -> bool {
        self.wellness_score > 0.0
    }
}

impl Default for Classification {
    fn default() -> Self {
        Self {
            dominant_state: CognitiveState::Calm,
            confidence: [0.0; STATE_COUNT],
            wellness_score: 0.0,
            intervention_needed: false,
        }
    }
}

/// Feature vector computed by the external extraction stage
///
/// The core treats this as an opaque value type: it only aggregates and
/// forwards it. Power and SNR fields at or below zero are treated as absent
/// when averaging.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FeatureVector {
    // Frequency domain
    /// Delta band power (0.5-4 Hz)
    pub delta_power: f32,
    /// Theta band power (4-8 Hz)
    pub theta_power: f32,
    /// Alpha band power (8-13 Hz)
    pub alpha_power: f32,
    /// Beta band power (13-30 Hz)
    pub beta_power: f32,
    /// Gamma band power (30-100 Hz)
    pub gamma_power: f32,
    /// Alpha/beta power ratio
    pub alpha_beta_ratio: f32,
    /// Theta/alpha power ratio
    pub theta_alpha_ratio: f32,
    /// Spectral entropy
    pub spectral_entropy: f32,
    /// Peak frequency in Hz
    pub peak_frequency: f32,
    /// Spectral centroid in Hz
    pub spectral_centroid: f32,

    // Time domain
    /// Mean amplitude
    pub mean_amplitude: f32,
    /// RMS amplitude
    pub rms_amplitude: f32,
    /// Signal variance
    pub variance: f32,
    /// Amplitude distribution skewness
    pub skewness: f32,
    /// Amplitude distribution kurtosis
    pub kurtosis: f32,
    /// Zero crossing rate
    pub zero_crossing_rate: f32,
    /// Hjorth activity parameter
    pub hjorth_activity: f32,
    /// Hjorth mobility parameter
    pub hjorth_mobility: f32,

    // Inter-channel coherence
    /// Left/right cross correlation
    pub cross_correlation: f32,
    /// Coherence in the alpha band
    pub coherence_alpha: f32,
    /// Coherence in the beta band
    pub coherence_beta: f32,
    /// Phase lag index
    pub phase_lag_index: f32,

    // Signal quality
    /// SNR estimate in dB; values <= 0 mark the record invalid
    pub snr_estimate: f32,
    /// Signal stability in [0, 1]
    pub signal_stability: f32,
}

impl FeatureVector {
    /// Valid records carry a positive SNR estimate
    pub fn is_valid(&self) -> bool {
        self.snr_estimate > 0.0
    }
}

/// Global processing statistics published by the external processing stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProcessingStats {
    /// Samples processed since session start
    pub total_samples: u64,
    /// Artifact-rejected windows since session start
    pub artifact_count: u64,
    /// Whether the processing stage has completed warm-up
    pub ready: bool,
}

impl ProcessingStats {
    /// Fraction of samples rejected as artifacts, in [0, 1]
    pub fn artifact_rate(&self) -> f32 {
        if self.total_samples == 0 {
            0.0
        } else {
            (self.artifact_count as f32 / self.total_samples as f32).clamp(0.0, 1.0)
        }
    }
}
