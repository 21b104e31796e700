// src/telemetry/payload.rs
//! Wire payload schemas
//!
//! Two JSON schemas share the same aggregate inputs. The full schema nests
//! the aggregates into topical blocks for the analytics backend; the compact
//! schema flattens everything and scales cognitive scores to 0-10 for the
//! mobile companion. Which one goes over the wire is a configuration choice,
//! [`crate::config::PayloadSchema`].

use serde::Serialize;

/// Round to 3 decimal places for wire stability
pub(crate) fn round3(value: f32) -> f64 {
    (value as f64 * 1000.0).round() / 1000.0
}

/// Round to 1 decimal place, used by the compact 0-10 scores
pub(crate) fn round1(value: f32) -> f64 {
    (value as f64 * 10.0).round() / 10.0
}

/// Full nested aggregate payload
#[derive(Debug, Serialize)]
pub struct FullPayload {
    /// ISO-8601 UTC timestamp of payload assembly
    pub timestamp: String,
    /// Device identifier
    pub device_id: String,
    /// Minutes since session start
    pub session_duration_min: f64,
    /// Cognitive aggregates over the classification window
    pub cognitive_summary: CognitiveSummary,
    /// Signal quality aggregates over the feature window
    pub signal_quality: SignalQuality,
    /// Band power aggregates over the feature window
    pub frequency_analysis: FrequencyAnalysis,
    /// Derived behavioral indicators
    pub behavioral_insights: BehavioralInsights,
}

/// Cognitive aggregates block of the full schema
#[derive(Debug, Serialize)]
pub struct CognitiveSummary {
    /// Mean wellness score over valid window entries
    pub avg_wellness_score: f64,
    /// Latest valid dominant state, wire name
    pub dominant_state: &'static str,
    /// That record's own confidence in the dominant state
    pub dominant_state_confidence: f64,
    /// Window entries that requested an intervention
    pub intervention_count: u32,
    /// Effectiveness score of the last completed intervention
    pub intervention_effectiveness: f64,
    /// Dominant-state changes between consecutive window entries
    pub state_transitions: u32,
}

/// Signal quality block of the full schema
#[derive(Debug, Serialize)]
pub struct SignalQuality {
    /// Mean SNR over valid window entries, dB
    pub avg_snr_db: f64,
    /// Mean signal stability over valid window entries
    pub signal_stability: f64,
    /// Artifact-rejected windows since session start
    pub artifact_count: u64,
    /// Derived data-quality score in [0, 1]
    pub electrode_quality: f64,
}

/// Band power block of the full schema
#[derive(Debug, Serialize)]
pub struct FrequencyAnalysis {
    /// Mean delta band power
    pub delta_avg: f64,
    /// Mean theta band power
    pub theta_avg: f64,
    /// Mean alpha band power
    pub alpha_avg: f64,
    /// Mean beta band power
    pub beta_avg: f64,
    /// Mean gamma band power
    pub gamma_avg: f64,
    /// Mean alpha/beta ratio
    pub alpha_beta_ratio: f64,
    /// Mean spectral entropy
    pub spectral_entropy: f64,
}

/// Behavioral indicators block of the full schema
#[derive(Debug, Serialize)]
pub struct BehavioralInsights {
    /// High-confidence stress entries extrapolated to episodes per hour
    pub stress_episodes_per_hour: f64,
    /// Estimated average focus bout length in minutes
    pub focus_duration_avg_min: f64,
    /// Mean anxiety confidence across the whole window
    pub anxiety_severity_avg: f64,
    /// Highest-priority stressor label
    pub primary_stressor: &'static str,
}

/// Compact flat payload with 0-10 scaled cognitive scores
#[derive(Debug, Serialize)]
pub struct CompactPayload {
    /// User identifier
    pub userid: String,
    /// Session identifier (device id plus session start epoch)
    pub sessionid: String,
    /// Device identifier
    pub deviceid: String,
    /// ISO-8601 UTC timestamp of payload assembly
    pub timestamp: String,
    /// Per-state scores scaled to 0-10
    pub cognitive_states: CompactCognitiveStates,
    /// Raw band power averages
    pub frequency_analysis: CompactFrequencyAnalysis,
    /// SNR and artifact flag
    pub signal_quality: CompactSignalQuality,
    /// Acquisition sampling rate in Hz
    pub sampling_rate: u32,
}

/// Scaled cognitive scores of the compact schema, from the latest record
#[derive(Debug, Serialize)]
pub struct CompactCognitiveStates {
    /// Focus score, 0-10
    pub focus: f64,
    /// Stress score, 0-10
    pub stress: f64,
    /// Anxiety score, 0-10
    pub anxiety: f64,
    /// Fatigue score, 0-10
    pub fatigue: f64,
    /// Calm score, 0-10
    pub calm: f64,
    /// Mean of focus and calm scores, 0-10
    pub flowstate: f64,
}

/// Band power averages of the compact schema
#[derive(Debug, Serialize)]
pub struct CompactFrequencyAnalysis {
    /// Mean delta band power
    pub delta_power: f64,
    /// Mean theta band power
    pub theta_power: f64,
    /// Mean alpha band power
    pub alpha_power: f64,
    /// Mean beta band power
    pub beta_power: f64,
    /// Mean gamma band power
    pub gamma_power: f64,
}

/// Signal quality block of the compact schema
#[derive(Debug, Serialize)]
pub struct CompactSignalQuality {
    /// Mean SNR over valid window entries, dB
    pub snr_db: f64,
    /// Set when mean signal stability drops below 0.7
    pub artifact_detected: bool,
}

/// Session lifecycle event, sent outside the aggregation super-cycle
#[derive(Debug, Serialize)]
pub struct SessionEvent {
    /// Event name, `session_started` or `session_ended`
    pub event_type: &'static str,
    /// Device identifier
    pub deviceid: String,
    /// ISO-8601 UTC timestamp of the event
    pub timestamp: String,
    /// Session identifier
    pub sessionid: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounding_helpers() {
        assert_eq!(round3(0.123_456), 0.123);
        assert_eq!(round1(7.26), 7.3);
        assert_eq!(round3(0.0), 0.0);
    }

    #[test]
    fn test_full_payload_field_names() {
        let payload = FullPayload {
            timestamp: "2026-01-01T00:00:00Z".to_string(),
            device_id: "NEURO_001".to_string(),
            session_duration_min: 1.5,
            cognitive_summary: CognitiveSummary {
                avg_wellness_score: 0.8,
                dominant_state: "calm",
                dominant_state_confidence: 0.9,
                intervention_count: 2,
                intervention_effectiveness: 0.8,
                state_transitions: 1,
            },
            signal_quality: SignalQuality {
                avg_snr_db: 18.0,
                signal_stability: 0.95,
                artifact_count: 4,
                electrode_quality: 0.93,
            },
            frequency_analysis: FrequencyAnalysis {
                delta_avg: 0.1,
                theta_avg: 0.2,
                alpha_avg: 0.3,
                beta_avg: 0.2,
                gamma_avg: 0.1,
                alpha_beta_ratio: 1.5,
                spectral_entropy: 0.7,
            },
            behavioral_insights: BehavioralInsights {
                stress_episodes_per_hour: 0.0,
                focus_duration_avg_min: 2.0,
                anxiety_severity_avg: 0.1,
                primary_stressor: "none_detected",
            },
        };

        let json: serde_json::Value = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["device_id"], "NEURO_001");
        assert_eq!(json["cognitive_summary"]["dominant_state"], "calm");
        assert_eq!(json["signal_quality"]["electrode_quality"], 0.93);
        assert_eq!(json["behavioral_insights"]["primary_stressor"], "none_detected");
    }

    #[test]
    fn test_compact_payload_is_flat_and_scaled() {
        let payload = CompactPayload {
            userid: "neuro_user_001".to_string(),
            sessionid: "NEURO_001-1700000000".to_string(),
            deviceid: "NEURO_001".to_string(),
            timestamp: "2026-01-01T00:00:00Z".to_string(),
            cognitive_states: CompactCognitiveStates {
                focus: 8.0,
                stress: 1.0,
                anxiety: 0.5,
                fatigue: 0.5,
                calm: 6.0,
                flowstate: 7.0,
            },
            frequency_analysis: CompactFrequencyAnalysis {
                delta_power: 0.1,
                theta_power: 0.2,
                alpha_power: 0.3,
                beta_power: 0.2,
                gamma_power: 0.1,
            },
            signal_quality: CompactSignalQuality {
                snr_db: 18.0,
                artifact_detected: false,
            },
            sampling_rate: 500,
        };

        let json: serde_json::Value = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["cognitive_states"]["flowstate"], 7.0);
        assert_eq!(json["signal_quality"]["artifact_detected"], false);
        assert_eq!(json["sampling_rate"], 500);
        assert!(json.get("cognitive_summary").is_none());
    }
}
