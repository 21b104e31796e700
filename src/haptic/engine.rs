// src/haptic/engine.rs
//! Timed, steppable, interruptible pattern playback
//!
//! The engine owns the single run-state instance in the system. All mutation
//! happens through `tick`, `trigger` and `start_if_needed`; the haptic stage
//! calls `tick` at a fixed 50 ms resolution while a pattern is active.
//!
//! Fade transitions interpolate both channels linearly toward the step
//! target over the first half of the step (fade-in) or toward zero over the
//! second half (fade-out). Interpolation recomputes its increment from the
//! ticks remaining, forcing a minimum step of 1 in the direction of travel,
//! so intensity always reaches the target by the half-step boundary even
//! when the per-tick delta rounds to zero.

use crate::config::constants::haptic::{EFFECTIVE_SCORE, INEFFECTIVE_SCORE, MAX_INTENSITY};
use crate::error::{NeuroError, NeuroResult};
use crate::hal::traits::HapticActuator;
use crate::hal::types::{Classification, CognitiveState};
use crate::haptic::patterns::{HapticPattern, PatternTable};
use crate::pipeline::context::SharedLatest;
use crate::utils::time::TimeProvider;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Engine state: idle, playing a step, or just completed a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No intervention in progress
    Idle,
    /// Playing the given step of the active pattern
    Playing {
        /// Index of the step currently playing
        step: usize,
    },
    /// Pattern finished on the previous tick; settles to `Idle` next tick
    Completed,
}

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing to do
    Idle,
    /// Still playing; carries the step index after this tick
    Playing {
        /// Index of the step now playing
        step: usize,
    },
    /// The pattern completed on this tick
    Completed,
}

/// Read-only statistics snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HapticStats {
    /// Interventions started since engine creation
    pub total_interventions: u32,
    /// Effectiveness score of the last completed intervention
    pub effectiveness: f32,
    /// Whether a pattern is currently playing
    pub active: bool,
}

/// Bilateral haptic intervention engine
pub struct HapticEngine {
    patterns: PatternTable,
    actuator: Box<dyn HapticActuator>,
    latest: Arc<SharedLatest>,
    time: Arc<dyn TimeProvider>,
    tick_ms: u32,
    initialized: bool,

    state: EngineState,
    pattern: Option<HapticPattern>,
    current_step: usize,
    step_elapsed_ms: u32,
    repeat_counter: u8,
    paused: bool,
    intervention: CognitiveState,
    start_time_us: u64,
    target_left: u8,
    target_right: u8,

    left: u8,
    right: u8,
    total_interventions: u32,
    effectiveness_score: f32,
}

impl HapticEngine {
    /// Create an engine; call [`HapticEngine::init`] before triggering
    pub fn new(
        actuator: Box<dyn HapticActuator>,
        patterns: PatternTable,
        latest: Arc<SharedLatest>,
        time: Arc<dyn TimeProvider>,
        tick_ms: u32,
    ) -> Self {
        Self {
            patterns,
            actuator,
            latest,
            time,
            tick_ms: tick_ms.max(1),
            initialized: false,
            state: EngineState::Idle,
            pattern: None,
            current_step: 0,
            step_elapsed_ms: 0,
            repeat_counter: 0,
            paused: false,
            intervention: CognitiveState::Calm,
            start_time_us: 0,
            target_left: 0,
            target_right: 0,
            left: 0,
            right: 0,
            total_interventions: 0,
            effectiveness_score: 0.0,
        }
    }

    /// Bring up the actuator and zero both channels
    pub fn init(&mut self) -> NeuroResult<()> {
        self.actuator.init()?;
        self.write_intensity(0, 0);
        self.initialized = true;
        info!("haptic engine initialized");
        Ok(())
    }

    /// Whether a pattern is currently playing
    pub fn is_active(&self) -> bool {
        matches!(self.state, EngineState::Playing { .. })
    }

    /// Current engine state
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Current channel intensities `(left, right)`
    pub fn current_intensity(&self) -> (u8, u8) {
        (self.left, self.right)
    }

    /// Statistics snapshot, no side effects
    pub fn stats(&self) -> HapticStats {
        HapticStats {
            total_interventions: self.total_interventions,
            effectiveness: self.effectiveness_score,
            active: self.is_active(),
        }
    }

    /// Start an intervention for `classification` if one is requested and
    /// nothing is already playing
    pub fn start_if_needed(&mut self, classification: &Classification) -> bool {
        if !self.is_active() && classification.intervention_needed {
            self.start(classification.dominant_state);
            true
        } else {
            false
        }
    }

    /// Manual override: discard any active run and start fresh
    ///
    /// Override always wins; there is no queueing of pending interventions.
    /// Fails without state mutation if the engine is not initialized.
    pub fn trigger(&mut self, state: CognitiveState) -> NeuroResult<()> {
        if !self.initialized {
            return Err(NeuroError::NotInitialized("haptic engine"));
        }
        if self.is_active() {
            self.write_intensity(0, 0);
        }
        self.start(state);
        Ok(())
    }

    /// Pause playback in place; `tick` becomes a no-op until resumed
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume a paused pattern
    pub fn resume(&mut self) {
        self.paused = false;
    }

    fn start(&mut self, state: CognitiveState) {
        let pattern = self.patterns.for_state(state).clone();
        debug!(pattern = pattern.name, state = state.name(), "starting intervention");
        self.pattern = Some(pattern);
        self.current_step = 0;
        self.step_elapsed_ms = 0;
        self.repeat_counter = 0;
        self.paused = false;
        self.intervention = state;
        self.start_time_us = self.time.now_micros();
        self.total_interventions += 1;
        self.state = EngineState::Playing { step: 0 };
    }

    /// Advance playback by one tick of the fixed resolution
    pub fn tick(&mut self) -> TickOutcome {
        match self.state {
            EngineState::Idle => return TickOutcome::Idle,
            EngineState::Completed => {
                self.state = EngineState::Idle;
                return TickOutcome::Idle;
            }
            EngineState::Playing { .. } => {}
        }
        if self.paused {
            return TickOutcome::Playing {
                step: self.current_step,
            };
        }

        let (step, step_total, repeat_total) = match self.pattern.as_ref() {
            Some(p) => (p.steps[self.current_step], p.step_count(), p.repeat_count),
            None => {
                self.state = EngineState::Idle;
                return TickOutcome::Idle;
            }
        };

        // Step entry: latch targets and set the starting intensity.
        if self.step_elapsed_ms == 0 {
            self.target_left = step.left_intensity;
            self.target_right = step.right_intensity;
            if step.fade_in {
                self.write_intensity(0, 0);
            } else {
                self.write_intensity(step.left_intensity, step.right_intensity);
            }
        }

        let duration = step.duration_ms as u32;
        let half = duration / 2;
        if step.fade_in && self.step_elapsed_ms < half {
            let ticks_left = ((half - self.step_elapsed_ms) / self.tick_ms).max(1);
            let left = fade_toward(self.left, self.target_left, ticks_left);
            let right = fade_toward(self.right, self.target_right, ticks_left);
            self.write_intensity(left, right);
        } else if step.fade_out && self.step_elapsed_ms > half {
            let ticks_left = ((duration - self.step_elapsed_ms) / self.tick_ms).max(1);
            let left = fade_toward(self.left, 0, ticks_left);
            let right = fade_toward(self.right, 0, ticks_left);
            self.write_intensity(left, right);
        }

        self.step_elapsed_ms += self.tick_ms;

        if self.step_elapsed_ms >= duration {
            self.current_step += 1;
            self.step_elapsed_ms = 0;

            if self.current_step >= step_total {
                self.repeat_counter += 1;
                if self.repeat_counter >= repeat_total {
                    return self.finish();
                }
                self.current_step = 0;
            }
            self.state = EngineState::Playing {
                step: self.current_step,
            };
        }

        TickOutcome::Playing {
            step: self.current_step,
        }
    }

    fn finish(&mut self) -> TickOutcome {
        self.write_intensity(0, 0);
        let effective = self
            .latest
            .classification()
            .map(|c| intervention_effective(self.intervention, &c))
            .unwrap_or(false);
        self.effectiveness_score = if effective {
            EFFECTIVE_SCORE
        } else {
            INEFFECTIVE_SCORE
        };
        debug!(
            state = self.intervention.name(),
            effective, "intervention completed"
        );
        self.pattern = None;
        self.state = EngineState::Completed;
        TickOutcome::Completed
    }

    fn write_intensity(&mut self, left: u8, right: u8) {
        // Safety clamp on every actuator write.
        let left = left.min(MAX_INTENSITY);
        let right = right.min(MAX_INTENSITY);
        self.left = left;
        self.right = right;
        if let Err(err) = self.actuator.set_intensity(left, right) {
            warn!(error = %err, "actuator write failed");
        }
    }
}

/// One fade increment toward `target` with `ticks_left` ticks remaining
///
/// The increment is `remaining_delta / ticks_left`, at least 1 in the
/// direction of travel; the final tick snaps to the target.
fn fade_toward(current: u8, target: u8, ticks_left: u32) -> u8 {
    if ticks_left <= 1 || current == target {
        return target;
    }
    let delta = target as i32 - current as i32;
    let mut step = delta / ticks_left as i32;
    if step == 0 {
        step = delta.signum();
    }
    (current as i32 + step).clamp(0, MAX_INTENSITY as i32) as u8
}

/// State-specific post-pattern effectiveness predicate
fn intervention_effective(state: CognitiveState, result: &Classification) -> bool {
    match state {
        CognitiveState::Stress => result.confidence_for(CognitiveState::Stress) < 0.5,
        CognitiveState::Anxiety => result.confidence_for(CognitiveState::Anxiety) < 0.6,
        CognitiveState::Fatigue => result.confidence_for(CognitiveState::Focus) > 0.4,
        _ => true,
    }
}
