// src/telemetry/aggregator.rs
//! Periodic aggregation and bounded-retry delivery
//!
//! The aggregator wakes on a fixed interval, snapshots the latest
//! classification and feature records into its sliding windows, and every
//! configured number of wakes assembles one payload and hands it to the
//! transport. Delivery is attempted at most `max_retries` times with a fixed
//! delay between attempts; a cycle that exhausts its attempts counts as one
//! error regardless of how many attempts it made. After every transmission
//! cycle the data-quality score is recomputed from the running error rate
//! and the processing stage's artifact rate.
//!
//! Window slots are overwritten on every wake, valid record or not, so an
//! entry older than one full window never contributes to an aggregate; the
//! validity filter applies when averaging, not when recording.

use crate::config::{PayloadSchema, SystemConfig, TelemetryConfig};
use crate::error::{NeuroError, NeuroResult};
use crate::hal::traits::{StatsSource, Transport};
use crate::hal::types::{Classification, CognitiveState, FeatureVector};
use crate::haptic::HapticEngine;
use crate::pipeline::signal::ShutdownFlag;
use crate::telemetry::history::HistoryWindow;
use crate::telemetry::payload::{
    round1, round3, BehavioralInsights, CognitiveSummary,
    CompactCognitiveStates, CompactFrequencyAnalysis, CompactPayload, CompactSignalQuality,
    FrequencyAnalysis, FullPayload, SessionEvent, SignalQuality,
};
use crate::utils::time::{iso8601_timestamp, TimeProvider};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Aggregator statistics snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryStats {
    /// Payloads delivered successfully
    pub transmissions_sent: u64,
    /// Transmission cycles that exhausted their attempts
    pub transmission_errors: u64,
    /// Derived data-quality score in [0, 1]
    pub data_quality: f32,
    /// Aggregator wakes since session start
    pub wake_count: u64,
    /// Timestamp of the last successful delivery, microseconds
    pub last_send_us: Option<u64>,
}

/// Sliding-window telemetry aggregator
pub struct TelemetryAggregator {
    config: TelemetryConfig,
    sampling_rate_hz: u32,
    transport: Box<dyn Transport>,
    latest: Arc<crate::pipeline::context::SharedLatest>,
    stats: Arc<dyn StatsSource>,
    haptic: Arc<Mutex<HapticEngine>>,
    time: Arc<dyn TimeProvider>,
    shutdown: Arc<ShutdownFlag>,

    classifications: HistoryWindow<Classification>,
    features: HistoryWindow<FeatureVector>,
    published: Arc<Mutex<TelemetryStats>>,
    wake_counter: u64,
    session_start_us: u64,
    session_id: String,
    sent: u64,
    errors: u64,
    last_send_us: Option<u64>,
    quality: f32,
}

impl TelemetryAggregator {
    /// Build an aggregator from the system configuration and capabilities
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: &SystemConfig,
        transport: Box<dyn Transport>,
        latest: Arc<crate::pipeline::context::SharedLatest>,
        stats: Arc<dyn StatsSource>,
        haptic: Arc<Mutex<HapticEngine>>,
        time: Arc<dyn TimeProvider>,
        shutdown: Arc<ShutdownFlag>,
    ) -> Self {
        let telemetry = config.telemetry.clone();
        let session_start_us = time.now_micros();
        let session_id = format!("{}-{}", telemetry.device_id, session_start_us / 1_000_000);
        Self {
            classifications: HistoryWindow::new(telemetry.aggregation_window),
            features: HistoryWindow::new(telemetry.feature_history),
            config: telemetry,
            sampling_rate_hz: config.system.sampling_rate_hz,
            transport,
            latest,
            stats,
            haptic,
            time,
            shutdown,
            published: Arc::new(Mutex::new(TelemetryStats {
                transmissions_sent: 0,
                transmission_errors: 0,
                data_quality: 1.0,
                wake_count: 0,
                last_send_us: None,
            })),
            wake_counter: 0,
            session_start_us,
            session_id,
            sent: 0,
            errors: 0,
            last_send_us: None,
            quality: 1.0,
        }
    }

    /// Seconds between wakes, as configured
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.config.interval_s as u64)
    }

    /// Statistics snapshot
    pub fn stats(&self) -> TelemetryStats {
        TelemetryStats {
            transmissions_sent: self.sent,
            transmission_errors: self.errors,
            data_quality: self.quality,
            wake_count: self.wake_counter,
            last_send_us: self.last_send_us,
        }
    }

    /// One aggregator wake: record, and transmit on super-cycle boundaries
    pub fn wake(&mut self) {
        if let Some(record) = self.latest.classification() {
            self.classifications.record_at(self.wake_counter, record);
        }
        if let Some(features) = self.latest.features() {
            self.features.record_at(self.wake_counter, features);
        }

        self.wake_counter += 1;
        if self.wake_counter % self.config.wakes_per_transmission as u64 == 0 {
            self.transmit_cycle();
            self.recompute_quality();
        }
        *self.published.lock() = self.stats();
    }

    /// Shared statistics cell, refreshed after every wake
    ///
    /// Readers take this lock instead of the aggregator's own, so a snapshot
    /// never waits behind an in-cycle retry delay.
    pub fn stats_handle(&self) -> Arc<Mutex<TelemetryStats>> {
        self.published.clone()
    }

    /// Send a session lifecycle event immediately, outside the super-cycle
    pub fn send_session_event(&mut self, event: &'static str) -> NeuroResult<()> {
        let payload = SessionEvent {
            event_type: event,
            deviceid: self.config.device_id.clone(),
            timestamp: iso8601_timestamp(self.time.now_micros()),
            sessionid: self.session_id.clone(),
        };
        let bytes = serde_json::to_vec(&payload)?;
        self.send_with_retries(&bytes).map(|_| ())
    }

    fn transmit_cycle(&mut self) {
        let bytes = match self.build_payload() {
            Ok(bytes) => bytes,
            Err(err) => {
                self.errors += 1;
                warn!(error = %err, "payload assembly failed");
                return;
            }
        };

        match self.send_with_retries(&bytes) {
            Ok(attempts) => {
                self.sent += 1;
                self.last_send_us = Some(self.time.now_micros());
                info!(attempts, bytes = bytes.len(), "telemetry payload delivered");
            }
            Err(err) => {
                self.errors += 1;
                warn!(error = %err, "telemetry payload dropped");
            }
        }
    }

    /// Deliver one payload with bounded retries; returns the attempt count
    fn send_with_retries(&mut self, payload: &[u8]) -> NeuroResult<u32> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.transport.send(payload) {
                Ok(()) => return Ok(attempt),
                Err(err) if attempt < self.config.max_retries => {
                    debug!(attempt, error = %err, "send failed, retrying");
                    let delay = Duration::from_millis(self.config.retry_delay_ms);
                    if self.shutdown.wait_timeout(delay) {
                        return Err(NeuroError::Transport {
                            attempts: attempt,
                            reason: "shutdown during retry".to_string(),
                        });
                    }
                }
                Err(err) => {
                    return Err(NeuroError::Transport {
                        attempts: attempt,
                        reason: err.to_string(),
                    })
                }
            }
        }
    }

    fn build_payload(&self) -> NeuroResult<Vec<u8>> {
        let bytes = match self.config.schema {
            PayloadSchema::Full => serde_json::to_vec(&self.build_full_payload())?,
            PayloadSchema::Compact => serde_json::to_vec(&self.build_compact_payload())?,
        };
        Ok(bytes)
    }

    fn build_full_payload(&self) -> FullPayload {
        let now_us = self.time.now_micros();
        let session_min = (now_us - self.session_start_us) as f64 / 60_000_000.0;
        let haptic = self.haptic.lock().stats();
        let processing = self.stats.processing_stats();

        let (dominant, dominant_confidence) = self.dominant_state();
        let transitions = self.state_transitions();
        let avg_snr = self.mean_over_features(|f| f.snr_estimate);
        let stability = self.mean_over_features(|f| f.signal_stability);

        FullPayload {
            timestamp: iso8601_timestamp(now_us),
            device_id: self.config.device_id.clone(),
            session_duration_min: round3(session_min as f32),
            cognitive_summary: CognitiveSummary {
                avg_wellness_score: round3(self.mean_over_classifications(|c| c.wellness_score)),
                dominant_state: dominant.name(),
                dominant_state_confidence: round3(dominant_confidence),
                intervention_count: self.intervention_requests(),
                intervention_effectiveness: round3(haptic.effectiveness),
                state_transitions: transitions,
            },
            signal_quality: SignalQuality {
                avg_snr_db: round3(avg_snr),
                signal_stability: round3(stability),
                artifact_count: processing.artifact_count,
                // Quality from the previous super-cycle; this cycle's score
                // is recomputed after the send completes.
                electrode_quality: round3(self.quality),
            },
            frequency_analysis: FrequencyAnalysis {
                delta_avg: round3(self.mean_band_power(|f| f.delta_power)),
                theta_avg: round3(self.mean_band_power(|f| f.theta_power)),
                alpha_avg: round3(self.mean_band_power(|f| f.alpha_power)),
                beta_avg: round3(self.mean_band_power(|f| f.beta_power)),
                gamma_avg: round3(self.mean_band_power(|f| f.gamma_power)),
                alpha_beta_ratio: round3(self.mean_band_power(|f| f.alpha_beta_ratio)),
                spectral_entropy: round3(self.mean_band_power(|f| f.spectral_entropy)),
            },
            behavioral_insights: self.behavioral_insights(session_min),
        }
    }

    fn build_compact_payload(&self) -> CompactPayload {
        let now_us = self.time.now_micros();
        // Compact scores come from the latest valid record, not window means.
        let current = self.latest.classification().filter(|c| c.is_valid());
        let score = |state: CognitiveState| {
            let confidence = current.map(|c| c.confidence_for(state)).unwrap_or(0.0);
            round1(confidence * 10.0)
        };
        let focus = score(CognitiveState::Focus);
        let calm = score(CognitiveState::Calm);
        let stability = self.mean_over_features(|f| f.signal_stability);
        let has_signal = self.features.iter().any(|f| f.is_valid());

        CompactPayload {
            userid: self.config.user_id.clone(),
            sessionid: self.session_id.clone(),
            deviceid: self.config.device_id.clone(),
            timestamp: iso8601_timestamp(now_us),
            cognitive_states: CompactCognitiveStates {
                focus,
                stress: score(CognitiveState::Stress),
                anxiety: score(CognitiveState::Anxiety),
                fatigue: score(CognitiveState::Fatigue),
                calm,
                flowstate: round1(((focus + calm) / 2.0) as f32),
            },
            frequency_analysis: CompactFrequencyAnalysis {
                delta_power: round3(self.mean_band_power(|f| f.delta_power)),
                theta_power: round3(self.mean_band_power(|f| f.theta_power)),
                alpha_power: round3(self.mean_band_power(|f| f.alpha_power)),
                beta_power: round3(self.mean_band_power(|f| f.beta_power)),
                gamma_power: round3(self.mean_band_power(|f| f.gamma_power)),
            },
            signal_quality: CompactSignalQuality {
                snr_db: round3(self.mean_over_features(|f| f.snr_estimate)),
                artifact_detected: stability < 0.7 && has_signal,
            },
            sampling_rate: self.sampling_rate_hz,
        }
    }

    fn behavioral_insights(&self, session_min: f64) -> BehavioralInsights {
        let session_hours = session_min / 60.0;
        let stress_episodes = self
            .classifications
            .iter()
            .filter(|c| {
                c.dominant_state == CognitiveState::Stress && c.dominant_confidence() > 0.7
            })
            .count();
        let stress_per_hour = if session_hours > 0.0 {
            stress_episodes as f64 / session_hours
        } else {
            0.0
        };

        let focus_entries = self
            .classifications
            .iter()
            .filter(|c| c.dominant_state == CognitiveState::Focus)
            .count();
        // Each window entry spans one aggregation interval.
        let focus_min = focus_entries as f64 * self.config.interval_s as f64 / 60.0;

        // Severity averages over the whole window capacity, so sparse
        // windows read as low severity rather than inflated means.
        let anxiety_sum: f32 = self
            .classifications
            .iter()
            .map(|c| c.confidence_for(CognitiveState::Anxiety))
            .sum();
        let anxiety_avg = anxiety_sum / self.classifications.capacity() as f32;

        let primary_stressor = if stress_per_hour > 2.0 {
            "high_frequency_stress"
        } else if anxiety_avg > 0.6 {
            "persistent_anxiety"
        } else if focus_min < 5.0 {
            "attention_deficits"
        } else {
            "none_detected"
        };

        BehavioralInsights {
            stress_episodes_per_hour: round3(stress_per_hour as f32),
            focus_duration_avg_min: round3(focus_min as f32),
            anxiety_severity_avg: round3(anxiety_avg),
            primary_stressor,
        }
    }

    /// Latest valid dominant state and its own confidence
    fn dominant_state(&self) -> (CognitiveState, f32) {
        match self.latest.classification().filter(|c| c.is_valid()) {
            Some(record) => (record.dominant_state, record.dominant_confidence()),
            None => (CognitiveState::Calm, 0.0),
        }
    }

    /// Window entries that carried an intervention request
    fn intervention_requests(&self) -> u32 {
        self.classifications
            .iter()
            .filter(|c| c.intervention_needed)
            .count() as u32
    }

    /// Dominant-state changes between consecutive window entries
    fn state_transitions(&self) -> u32 {
        let states: Vec<CognitiveState> = self
            .classifications
            .iter()
            .map(|c| c.dominant_state)
            .collect();
        states.windows(2).filter(|pair| pair[0] != pair[1]).count() as u32
    }

    /// Mean over valid window entries; zero when none are valid
    fn mean_over_classifications(&self, f: impl Fn(&Classification) -> f32) -> f32 {
        let values: Vec<f32> = self
            .classifications
            .iter()
            .filter(|c| c.is_valid())
            .map(f)
            .collect();
        if values.is_empty() {
            return 0.0;
        }
        values.iter().sum::<f32>() / values.len() as f32
    }

    /// Mean over valid window entries; zero when none are valid
    fn mean_over_features(&self, f: impl Fn(&FeatureVector) -> f32) -> f32 {
        let values: Vec<f32> = self
            .features
            .iter()
            .filter(|entry| entry.is_valid())
            .map(f)
            .collect();
        if values.is_empty() {
            return 0.0;
        }
        values.iter().sum::<f32>() / values.len() as f32
    }

    /// Band-power mean over valid entries with signal content
    fn mean_band_power(&self, f: impl Fn(&FeatureVector) -> f32) -> f32 {
        let entries: Vec<f32> = self
            .features
            .iter()
            .filter(|entry| entry.is_valid() && entry.delta_power > 0.0)
            .map(f)
            .collect();
        if entries.is_empty() {
            return 0.0;
        }
        entries.iter().sum::<f32>() / entries.len() as f32
    }

    fn recompute_quality(&mut self) {
        let attempts = self.sent + self.errors;
        let error_rate = if attempts == 0 {
            0.0
        } else {
            self.errors as f32 / attempts as f32
        };
        let artifact_rate = self.stats.processing_stats().artifact_rate();
        self.quality = ((1.0 - error_rate) * (1.0 - artifact_rate)).max(0.0);
    }
}
