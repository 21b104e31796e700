// src/pipeline/scheduler.rs
//! Stage thread spawning and lifecycle
//!
//! [`PipelineScheduler::start`] validates the configuration, builds the
//! shared context, and spawns one named thread per stage. The sample clock
//! thread stands in for the acquisition timer interrupt: it raises the
//! sample-ready signal on a fixed period. Shutdown latches the flag, raises
//! every signal to release parked waiters, and joins all threads.

use crate::acquisition::AcquisitionStage;
use crate::config::constants::pipeline::PARK_DELAY_MS;
use crate::config::SystemConfig;
use crate::error::NeuroResult;
use crate::hal::traits::{
    ClassifierSource, FeatureSource, HapticActuator, SampleSource, StatsSource, Transport,
};
use crate::hal::types::CognitiveState;
use crate::haptic::{HapticEngine, HapticStats, PatternTable};
use crate::pipeline::context::PipelineContext;
use crate::pipeline::StagePriority;
use crate::telemetry::{TelemetryAggregator, TelemetryStats};
use crate::utils::time::{SystemTimeProvider, TimeProvider};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// External capabilities the pipeline is wired to at startup
pub struct Capabilities {
    /// Acquisition front-end
    pub source: Box<dyn SampleSource>,
    /// Feature extraction stage
    pub features: Box<dyn FeatureSource>,
    /// Classifier stage
    pub classifier: Box<dyn ClassifierSource>,
    /// Processing statistics view
    pub stats: Arc<dyn StatsSource>,
    /// Telemetry byte transport
    pub transport: Box<dyn Transport>,
    /// Haptic actuator driver
    pub actuator: Box<dyn HapticActuator>,
}

/// Handle to a running pipeline
pub struct PipelineScheduler {
    ctx: Arc<PipelineContext>,
    haptic: Arc<Mutex<HapticEngine>>,
    telemetry_stats: Arc<Mutex<TelemetryStats>>,
    handles: Vec<JoinHandle<()>>,
}

impl PipelineScheduler {
    /// Validate the configuration and spawn every stage thread
    pub fn start(config: SystemConfig, caps: Capabilities) -> NeuroResult<Self> {
        config.validate_consistency()?;
        let time: Arc<dyn TimeProvider> = Arc::new(SystemTimeProvider);
        let ctx = Arc::new(PipelineContext::new(config.clone(), time.clone()));

        let haptic = Arc::new(Mutex::new(HapticEngine::new(
            caps.actuator,
            PatternTable::builtin(),
            ctx.latest.clone(),
            time.clone(),
            config.haptic.tick_resolution_ms,
        )));
        let telemetry = Arc::new(Mutex::new(TelemetryAggregator::new(
            &config,
            caps.transport,
            ctx.latest.clone(),
            caps.stats,
            haptic.clone(),
            time,
            ctx.shutdown.clone(),
        )));

        let telemetry_stats = telemetry.lock().stats_handle();

        let mut handles = Vec::with_capacity(7);
        handles.push(spawn_sample_clock(&ctx)?);
        handles.push(spawn_acquisition(&ctx, caps.source)?);
        handles.push(spawn_preprocessing(&ctx)?);
        handles.push(spawn_feature_stage(&ctx, caps.features)?);
        handles.push(spawn_classification_stage(&ctx, caps.classifier)?);
        handles.push(spawn_haptic_stage(&ctx, haptic.clone())?);
        handles.push(spawn_telemetry_stage(&ctx, telemetry.clone())?);

        info!(
            sampling_rate_hz = config.system.sampling_rate_hz,
            stages = handles.len(),
            "pipeline started"
        );
        Ok(Self {
            ctx,
            haptic,
            telemetry_stats,
            handles,
        })
    }

    /// Manually start an intervention, overriding any active one
    pub fn trigger_pattern(&self, state: CognitiveState) -> NeuroResult<()> {
        self.haptic.lock().trigger(state)?;
        // Wake the haptic stage so it runs the tick loop for this run.
        self.ctx.signals.haptic.raise();
        Ok(())
    }

    /// Haptic engine statistics snapshot
    pub fn haptic_statistics(&self) -> HapticStats {
        self.haptic.lock().stats()
    }

    /// Telemetry delivery statistics snapshot
    ///
    /// Reads the aggregator's published stats cell rather than the
    /// aggregator itself, so the call never waits out a retry delay.
    pub fn communication_stats(&self) -> TelemetryStats {
        *self.telemetry_stats.lock()
    }

    /// Sample reads skipped because the front-end returned an error
    pub fn dropped_reads(&self) -> u64 {
        self.ctx.dropped_reads()
    }

    /// Whether shutdown has not been requested yet
    pub fn is_running(&self) -> bool {
        !self.ctx.shutdown.is_set()
    }

    /// Latch shutdown, release every stage and join all threads
    pub fn shutdown(self) {
        info!("pipeline shutting down");
        self.ctx.shutdown.raise();
        self.ctx.signals.raise_all();
        for handle in self.handles {
            let name = handle.thread().name().unwrap_or("stage").to_string();
            if handle.join().is_err() {
                error!(stage = %name, "stage thread panicked");
            }
        }
        info!("pipeline stopped");
    }
}

fn spawn(name: &str, priority: StagePriority, body: impl FnOnce() + Send + 'static) -> NeuroResult<JoinHandle<()>> {
    debug!(name, priority = priority.value(), "spawning stage");
    let handle = thread::Builder::new().name(name.to_string()).spawn(body)?;
    Ok(handle)
}

/// Timer-interrupt stand-in: raise the sample-ready signal on a fixed period
fn spawn_sample_clock(ctx: &Arc<PipelineContext>) -> NeuroResult<JoinHandle<()>> {
    let ctx = ctx.clone();
    let period = Duration::from_micros(1_000_000 / ctx.config.system.sampling_rate_hz as u64);
    spawn("sample-clock", StagePriority::Acquisition, move || {
        loop {
            if ctx.shutdown.wait_timeout(period) {
                break;
            }
            ctx.signals.sample_ready.raise();
        }
        debug!("sample clock exited");
    })
}

fn spawn_acquisition(
    ctx: &Arc<PipelineContext>,
    source: Box<dyn SampleSource>,
) -> NeuroResult<JoinHandle<()>> {
    let ctx = ctx.clone();
    spawn("acquisition", StagePriority::Acquisition, move || {
        AcquisitionStage::new(source).run(ctx);
    })
}

/// Drain the ring buffer and release feature extraction once per full window
fn spawn_preprocessing(ctx: &Arc<PipelineContext>) -> NeuroResult<JoinHandle<()>> {
    let ctx = ctx.clone();
    spawn("preprocessing", StagePriority::Preprocessing, move || {
        let window = ctx.config.system.processing_window;
        let mut accumulated = 0usize;
        loop {
            ctx.signals.preprocessing.wait();
            if ctx.shutdown.is_set() {
                break;
            }
            let mut buffer = ctx.sample_buffer.lock();
            while buffer.pop().is_some() {
                accumulated += 1;
            }
            drop(buffer);

            if accumulated >= window {
                accumulated -= window;
                ctx.signals.feature_extraction.raise();
            }
        }
        debug!("preprocessing stage exited");
    })
}

fn spawn_feature_stage(
    ctx: &Arc<PipelineContext>,
    mut features: Box<dyn FeatureSource>,
) -> NeuroResult<JoinHandle<()>> {
    let ctx = ctx.clone();
    spawn("feature-extraction", StagePriority::FeatureExtraction, move || {
        loop {
            ctx.signals.feature_extraction.wait();
            if ctx.shutdown.is_set() {
                break;
            }
            match features.feature_vector() {
                Ok(vector) => {
                    ctx.latest.set_features(vector);
                    ctx.signals.classification.raise();
                }
                Err(err) => warn!(error = %err, "feature extraction failed"),
            }
        }
        debug!("feature stage exited");
    })
}

fn spawn_classification_stage(
    ctx: &Arc<PipelineContext>,
    mut classifier: Box<dyn ClassifierSource>,
) -> NeuroResult<JoinHandle<()>> {
    let ctx = ctx.clone();
    spawn("classification", StagePriority::Classification, move || {
        loop {
            ctx.signals.classification.wait();
            if ctx.shutdown.is_set() {
                break;
            }
            match classifier.classification() {
                Ok(record) => {
                    ctx.latest.set_classification(record);
                    ctx.signals.haptic.raise();
                }
                Err(err) => warn!(error = %err, "classification failed"),
            }
        }
        debug!("classification stage exited");
    })
}

/// Haptic stage: init, then per-wake start checks and the 50 ms tick loop
///
/// A failed actuator init parks the stage in a shutdown-aware delay loop
/// instead of tearing down the pipeline.
fn spawn_haptic_stage(
    ctx: &Arc<PipelineContext>,
    haptic: Arc<Mutex<HapticEngine>>,
) -> NeuroResult<JoinHandle<()>> {
    let ctx = ctx.clone();
    let tick = Duration::from_millis(ctx.config.haptic.tick_resolution_ms as u64);
    spawn("haptic", StagePriority::Haptic, move || {
        if let Err(err) = haptic.lock().init() {
            error!(error = %err, "haptic init failed, stage parked");
            while !ctx.shutdown.wait_timeout(Duration::from_millis(PARK_DELAY_MS)) {}
            return;
        }

        'outer: loop {
            ctx.signals.haptic.wait();
            if ctx.shutdown.is_set() {
                break;
            }

            {
                let mut engine = haptic.lock();
                if let Some(record) = ctx.latest.classification() {
                    engine.start_if_needed(&record);
                }
            }

            // Tick loop; the lock drops between ticks so manual triggers
            // and the aggregator's stats reads can interleave.
            loop {
                {
                    let mut engine = haptic.lock();
                    if !engine.is_active() {
                        break;
                    }
                    engine.tick();
                }
                if ctx.shutdown.wait_timeout(tick) {
                    break 'outer;
                }
            }
        }
        debug!("haptic stage exited");
    })
}

/// Telemetry stage: periodic wakes bracketed by session lifecycle events
fn spawn_telemetry_stage(
    ctx: &Arc<PipelineContext>,
    telemetry: Arc<Mutex<TelemetryAggregator>>,
) -> NeuroResult<JoinHandle<()>> {
    let ctx = ctx.clone();
    spawn("telemetry", StagePriority::Telemetry, move || {
        let interval = telemetry.lock().interval();
        if let Err(err) = telemetry.lock().send_session_event("session_started") {
            warn!(error = %err, "session start event dropped");
        }
        loop {
            if ctx.shutdown.wait_timeout(interval) {
                break;
            }
            telemetry.lock().wake();
        }
        if let Err(err) = telemetry.lock().send_session_event("session_ended") {
            warn!(error = %err, "session end event dropped");
        }
        debug!("telemetry stage exited");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::simulator::{
        FixedStats, LoopbackTransport, RecordingActuator, SineSampleSource, StaticClassifier,
        StaticFeatureSource,
    };

    fn capabilities(actuator: RecordingActuator) -> Capabilities {
        Capabilities {
            source: Box::new(SineSampleSource::new(500)),
            features: Box::new(StaticFeatureSource::default()),
            classifier: Box::new(StaticClassifier::default()),
            stats: Arc::new(FixedStats::default()),
            transport: Box::new(LoopbackTransport::new()),
            actuator: Box::new(actuator),
        }
    }

    #[test]
    fn test_start_and_shutdown() {
        let scheduler =
            PipelineScheduler::start(SystemConfig::default(), capabilities(RecordingActuator::new()))
                .unwrap();
        assert!(scheduler.is_running());
        thread::sleep(Duration::from_millis(50));
        // Stats snapshots come from the published cell and are always
        // available, whatever the telemetry thread is doing.
        let stats = scheduler.communication_stats();
        assert_eq!(stats.transmission_errors, 0);
        scheduler.shutdown();
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = SystemConfig::default();
        config.system.sampling_rate_hz = 0;
        assert!(
            PipelineScheduler::start(config, capabilities(RecordingActuator::new())).is_err()
        );
    }

    #[test]
    fn test_manual_trigger_counts_intervention() {
        let scheduler =
            PipelineScheduler::start(SystemConfig::default(), capabilities(RecordingActuator::new()))
                .unwrap();
        // Give the haptic thread time to finish init.
        thread::sleep(Duration::from_millis(100));
        scheduler.trigger_pattern(CognitiveState::Stress).unwrap();
        assert_eq!(scheduler.haptic_statistics().total_interventions, 1);
        scheduler.shutdown();
    }

    #[test]
    fn test_broken_actuator_parks_but_shuts_down() {
        let scheduler =
            PipelineScheduler::start(SystemConfig::default(), capabilities(RecordingActuator::broken()))
                .unwrap();
        thread::sleep(Duration::from_millis(50));
        // The parked stage must still respond to shutdown.
        scheduler.shutdown();
    }
}
