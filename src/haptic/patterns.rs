// src/haptic/patterns.rs
//! Built-in intervention patterns and the per-state selection table
//!
//! Patterns are immutable and statically defined: one per cognitive state,
//! with the breathing guide as the fallback for states without a dedicated
//! intervention. Selection is a fixed table keyed by `CognitiveState`, not a
//! runtime name lookup.

use crate::config::constants::haptic::{MAX_INTENSITY, MAX_PATTERN_STEPS};
use crate::hal::types::CognitiveState;

/// One timed intensity instruction for both actuator channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HapticStep {
    /// Left channel target intensity, 0..=100
    pub left_intensity: u8,
    /// Right channel target intensity, 0..=100
    pub right_intensity: u8,
    /// Step duration in milliseconds
    pub duration_ms: u16,
    /// Ramp intensities up from zero over the first half of the step
    pub fade_in: bool,
    /// Ramp intensities down to zero over the second half of the step
    pub fade_out: bool,
}

impl HapticStep {
    /// Shorthand constructor used by the pattern tables
    pub const fn new(left: u8, right: u8, duration_ms: u16, fade_in: bool, fade_out: bool) -> Self {
        Self {
            left_intensity: left,
            right_intensity: right,
            duration_ms,
            fade_in,
            fade_out,
        }
    }
}

/// Ordered, immutable sequence of steps with a repeat count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HapticPattern {
    /// Pattern name, stamped into statistics and logs
    pub name: &'static str,
    /// Step sequence, played in order
    pub steps: Vec<HapticStep>,
    /// Number of full sequence repetitions
    pub repeat_count: u8,
    /// Whether both channels mirror each other
    pub bilateral: bool,
}

impl HapticPattern {
    fn new(name: &'static str, bilateral: bool, repeat_count: u8, steps: Vec<HapticStep>) -> Self {
        debug_assert!(steps.len() <= MAX_PATTERN_STEPS);
        debug_assert!(steps
            .iter()
            .all(|s| s.left_intensity <= MAX_INTENSITY && s.right_intensity <= MAX_INTENSITY));
        Self {
            name,
            steps,
            repeat_count,
            bilateral,
        }
    }

    /// Number of steps in one repetition
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }
}

/// Slow bilateral swell and release, ~30 s per repetition block
fn stress_relief() -> HapticPattern {
    HapticPattern::new(
        "StressRelief",
        true,
        6,
        vec![
            HapticStep::new(0, 0, 500, true, false),
            HapticStep::new(30, 30, 1000, true, false),
            HapticStep::new(60, 60, 1500, false, false),
            HapticStep::new(40, 40, 1000, false, true),
            HapticStep::new(20, 20, 1500, false, false),
            HapticStep::new(5, 5, 1000, false, true),
            HapticStep::new(0, 0, 500, false, false),
            HapticStep::new(0, 0, 1000, false, false),
        ],
    )
}

/// Alternating left/right taps settling into a soft bilateral hold
fn anxiety_reduction() -> HapticPattern {
    HapticPattern::new(
        "AnxietyReduce",
        false,
        9,
        vec![
            HapticStep::new(25, 0, 800, true, false),
            HapticStep::new(0, 0, 200, false, false),
            HapticStep::new(0, 25, 800, true, false),
            HapticStep::new(0, 0, 200, false, false),
            HapticStep::new(40, 0, 600, true, false),
            HapticStep::new(0, 0, 200, false, false),
            HapticStep::new(0, 40, 600, true, false),
            HapticStep::new(0, 0, 300, false, false),
            HapticStep::new(15, 15, 1200, true, true),
            HapticStep::new(0, 0, 800, false, false),
        ],
    )
}

/// Sharp double pulse followed by a long sustain and release
fn fatigue_alertness() -> HapticPattern {
    HapticPattern::new(
        "FatigueAlert",
        true,
        4,
        vec![
            HapticStep::new(80, 80, 150, false, false),
            HapticStep::new(0, 0, 100, false, false),
            HapticStep::new(90, 90, 150, false, false),
            HapticStep::new(0, 0, 200, false, false),
            HapticStep::new(50, 50, 2000, true, false),
            HapticStep::new(10, 10, 2400, false, true),
        ],
    )
}

/// Escalating alternating taps converging on a bilateral peak
fn focus_enhancement() -> HapticPattern {
    HapticPattern::new(
        "FocusBoost",
        false,
        3,
        vec![
            HapticStep::new(30, 0, 300, true, false),
            HapticStep::new(0, 30, 300, true, false),
            HapticStep::new(45, 0, 400, false, false),
            HapticStep::new(0, 45, 400, false, false),
            HapticStep::new(60, 0, 500, false, false),
            HapticStep::new(0, 60, 500, false, false),
            HapticStep::new(75, 75, 1000, false, true),
            HapticStep::new(0, 0, 1600, false, false),
        ],
    )
}

/// 8-second breathing cycle: inhale swell, long exhale taper
fn breathing_guide() -> HapticPattern {
    HapticPattern::new(
        "BreathGuide",
        true,
        4,
        vec![
            HapticStep::new(0, 0, 1000, false, false),
            HapticStep::new(40, 40, 4000, true, false),
            HapticStep::new(20, 20, 7000, false, false),
            HapticStep::new(10, 10, 8000, false, true),
        ],
    )
}

/// Fixed mapping from cognitive state to intervention pattern
pub struct PatternTable {
    stress: HapticPattern,
    anxiety: HapticPattern,
    fatigue: HapticPattern,
    focus: HapticPattern,
    fallback: HapticPattern,
}

impl Default for PatternTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PatternTable {
    /// The built-in pattern set
    pub fn builtin() -> Self {
        Self {
            stress: stress_relief(),
            anxiety: anxiety_reduction(),
            fatigue: fatigue_alertness(),
            focus: focus_enhancement(),
            fallback: breathing_guide(),
        }
    }

    /// Pattern bound to a state; unmapped states get the breathing guide
    pub fn for_state(&self, state: CognitiveState) -> &HapticPattern {
        match state {
            CognitiveState::Stress => &self.stress,
            CognitiveState::Anxiety => &self.anxiety,
            CognitiveState::Fatigue => &self.fatigue,
            CognitiveState::Focus => &self.focus,
            CognitiveState::Boredom | CognitiveState::Calm => &self.fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_state_has_a_pattern() {
        let table = PatternTable::builtin();
        for state in CognitiveState::ALL {
            let pattern = table.for_state(state);
            assert!(pattern.step_count() > 0);
            assert!(pattern.repeat_count > 0);
        }
    }

    #[test]
    fn test_fallback_for_unmapped_states() {
        let table = PatternTable::builtin();
        assert_eq!(table.for_state(CognitiveState::Calm).name, "BreathGuide");
        assert_eq!(table.for_state(CognitiveState::Boredom).name, "BreathGuide");
    }

    #[test]
    fn test_intensities_within_limits() {
        let table = PatternTable::builtin();
        for state in CognitiveState::ALL {
            for step in &table.for_state(state).steps {
                assert!(step.left_intensity <= MAX_INTENSITY);
                assert!(step.right_intensity <= MAX_INTENSITY);
            }
        }
    }

    #[test]
    fn test_stress_pattern_shape() {
        let pattern = stress_relief();
        assert_eq!(pattern.step_count(), 8);
        assert_eq!(pattern.repeat_count, 6);
        assert!(pattern.bilateral);
    }
}
