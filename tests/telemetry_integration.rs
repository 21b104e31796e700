// tests/telemetry_integration.rs
//! Aggregator behavior driven through its public wake interface

use neuro_core::config::{PayloadSchema, SystemConfig};
use neuro_core::hal::simulator::{
    FailingTransport, FixedStats, LoopbackTransport, RecordingActuator,
};
use neuro_core::hal::types::{
    Classification, CognitiveState, FeatureVector, STATE_COUNT,
};
use neuro_core::hal::Transport;
use neuro_core::haptic::{HapticEngine, PatternTable};
use neuro_core::pipeline::{SharedLatest, ShutdownFlag};
use neuro_core::telemetry::TelemetryAggregator;
use neuro_core::utils::{MockTimeProvider, TimeProvider};
use parking_lot::Mutex;
use proptest::prelude::*;
use std::sync::Arc;

fn classification(dominant: CognitiveState, confidence: f32) -> Classification {
    let mut scores = [0.0; STATE_COUNT];
    scores[dominant.index()] = confidence;
    Classification {
        dominant_state: dominant,
        confidence: scores,
        wellness_score: 0.7,
        intervention_needed: false,
    }
}

fn features(snr: f32) -> FeatureVector {
    FeatureVector {
        snr_estimate: snr,
        signal_stability: 0.9,
        delta_power: 0.2,
        theta_power: 0.2,
        alpha_power: 0.4,
        beta_power: 0.3,
        gamma_power: 0.1,
        ..FeatureVector::default()
    }
}

fn aggregator(
    config: SystemConfig,
    transport: Box<dyn Transport>,
    stats: Arc<FixedStats>,
) -> (TelemetryAggregator, Arc<SharedLatest>) {
    let latest = Arc::new(SharedLatest::default());
    let time: Arc<dyn TimeProvider> = Arc::new(MockTimeProvider::new(60_000_000));
    let engine = HapticEngine::new(
        Box::new(RecordingActuator::new()),
        PatternTable::builtin(),
        latest.clone(),
        time.clone(),
        config.haptic.tick_resolution_ms,
    );
    let agg = TelemetryAggregator::new(
        &config,
        transport,
        latest.clone(),
        stats,
        Arc::new(Mutex::new(engine)),
        time,
        Arc::new(ShutdownFlag::new()),
    );
    (agg, latest)
}

fn fast_config(schema: PayloadSchema) -> SystemConfig {
    let mut config = SystemConfig::default();
    config.telemetry.retry_delay_ms = 0;
    config.telemetry.schema = schema;
    config
}

#[test]
fn test_full_payload_round_trips_as_json() {
    let transport = LoopbackTransport::new();
    let (mut agg, latest) = aggregator(
        fast_config(PayloadSchema::Full),
        Box::new(transport.clone()),
        Arc::new(FixedStats::new(10_000, 120)),
    );

    for state in [
        CognitiveState::Focus,
        CognitiveState::Focus,
        CognitiveState::Stress,
        CognitiveState::Focus,
        CognitiveState::Calm,
        CognitiveState::Focus,
    ] {
        latest.set_classification(classification(state, 0.85));
        latest.set_features(features(21.0));
        agg.wake();
    }

    // Default super-cycle is six wakes.
    assert_eq!(transport.send_count(), 1);
    let json: serde_json::Value = serde_json::from_slice(&transport.payloads()[0]).unwrap();
    assert_eq!(json["cognitive_summary"]["dominant_state"], "focus");
    assert_eq!(json["cognitive_summary"]["state_transitions"], 4);
    assert_eq!(json["signal_quality"]["artifact_count"], 120);
    assert_eq!(json["signal_quality"]["electrode_quality"], 1.0);
    assert!(json["frequency_analysis"]["alpha_avg"].as_f64().unwrap() > 0.0);
    assert!(json["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[test]
fn test_compact_payload_scales_to_ten() {
    let transport = LoopbackTransport::new();
    let (mut agg, latest) = aggregator(
        fast_config(PayloadSchema::Compact),
        Box::new(transport.clone()),
        Arc::new(FixedStats::default()),
    );

    for _ in 0..6 {
        latest.set_classification(classification(CognitiveState::Calm, 0.9));
        latest.set_features(features(15.0));
        agg.wake();
    }

    let json: serde_json::Value = serde_json::from_slice(&transport.payloads()[0]).unwrap();
    assert_eq!(json["cognitive_states"]["calm"], 9.0);
    assert_eq!(json["cognitive_states"]["focus"], 0.0);
    assert_eq!(json["cognitive_states"]["flowstate"], 4.5);
    assert_eq!(json["deviceid"], "NEURO_001");
    assert!(json["sessionid"].as_str().unwrap().starts_with("NEURO_001-"));
}

#[test]
fn test_retry_bound_is_three_attempts() {
    let transport = FailingTransport::always_failing();
    let (mut agg, latest) = aggregator(
        fast_config(PayloadSchema::Full),
        Box::new(transport.clone()),
        Arc::new(FixedStats::default()),
    );

    for _ in 0..6 {
        latest.set_classification(classification(CognitiveState::Calm, 0.8));
        agg.wake();
    }

    // One failed cycle: exactly max_retries attempts, one error counted.
    assert_eq!(transport.attempts(), 3);
    let stats = agg.stats();
    assert_eq!(stats.transmission_errors, 1);
    assert_eq!(stats.transmissions_sent, 0);
}

#[test]
fn test_recovery_after_transient_failures() {
    let transport = FailingTransport::failing(2);
    let (mut agg, latest) = aggregator(
        fast_config(PayloadSchema::Full),
        Box::new(transport.clone()),
        Arc::new(FixedStats::default()),
    );

    for _ in 0..6 {
        latest.set_classification(classification(CognitiveState::Calm, 0.8));
        agg.wake();
    }

    assert_eq!(transport.attempts(), 3);
    let stats = agg.stats();
    assert_eq!(stats.transmissions_sent, 1);
    assert_eq!(stats.transmission_errors, 0);
    assert_eq!(stats.data_quality, 1.0);
}

#[test]
fn test_invalid_records_never_reach_payloads() {
    let transport = LoopbackTransport::new();
    let (mut agg, latest) = aggregator(
        fast_config(PayloadSchema::Full),
        Box::new(transport.clone()),
        Arc::new(FixedStats::default()),
    );

    // Zero wellness and zero SNR mark both records invalid.
    for _ in 0..6 {
        latest.set_classification(classification(CognitiveState::Stress, 0.9).into_invalid());
        latest.set_features(features(0.0));
        agg.wake();
    }

    let json: serde_json::Value = serde_json::from_slice(&transport.payloads()[0]).unwrap();
    // No valid entries in either window, so aggregates fall back to calm
    // defaults even though the slots are occupied.
    assert_eq!(json["cognitive_summary"]["dominant_state"], "calm");
    assert_eq!(json["cognitive_summary"]["avg_wellness_score"], 0.0);
    assert_eq!(json["signal_quality"]["avg_snr_db"], 0.0);
}

trait IntoInvalid {
    fn into_invalid(self) -> Classification;
}

impl IntoInvalid for Classification {
    fn into_invalid(mut self) -> Classification {
        self.wellness_score = 0.0;
        self
    }
}

proptest! {
    /// The data-quality score stays within [0, 1] for any artifact load and
    /// any mix of failed and successful delivery cycles.
    #[test]
    fn prop_quality_score_bounded(
        artifact_count in 0u64..5000,
        total_samples in 1u64..5000,
        failing in proptest::bool::ANY,
    ) {
        let transport: Box<dyn Transport> = if failing {
            Box::new(FailingTransport::always_failing())
        } else {
            Box::new(LoopbackTransport::new())
        };
        let (mut agg, latest) = aggregator(
            fast_config(PayloadSchema::Full),
            transport,
            Arc::new(FixedStats::new(total_samples, artifact_count)),
        );

        for _ in 0..6 {
            latest.set_classification(classification(CognitiveState::Calm, 0.8));
            agg.wake();
        }

        let quality = agg.stats().data_quality;
        prop_assert!((0.0..=1.0).contains(&quality));
        if failing {
            prop_assert_eq!(quality, 0.0);
        }
    }
}
