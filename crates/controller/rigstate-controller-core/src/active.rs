//! Dynamic per-state-machine record.
//!
//! One record per state machine instance; multiple sync layers map to the
//! same record. The encoding is current+next: the second endpoint of an
//! active blend is always derived from the transition identity, so there is
//! no separately stored next-state index that could fall out of sync with
//! it. Where the original reserved a sentinel transition index for "no
//! active transition", the phase is a sum type instead.

use serde::{Deserialize, Serialize};

use crate::graph::StateMachine;
use crate::handles::{StateIndex, TransitionRef};

/// Blend status of one state machine.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TransitionPhase {
    /// No active transition; the current state plays at full weight.
    Rest,
    /// An active blend toward the referenced transition's target.
    Transitioning {
        transition: TransitionRef,
        /// Normalized time of the blend target's motion.
        next_time: f32,
        /// Progress through the blend, [0, 1].
        progress: f32,
    },
}

/// The dynamic data for one state machine instance.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MachineState {
    pub current_state: StateIndex,
    /// Normalized time of the current state's motion.
    pub current_time: f32,
    pub phase: TransitionPhase,
}

impl MachineState {
    /// Seed a record at the machine's initial state, at rest.
    pub fn initial(machine: &StateMachine) -> Self {
        Self {
            current_state: machine.initial_state,
            current_time: 0.0,
            phase: TransitionPhase::Rest,
        }
    }

    #[inline]
    pub fn is_transitioning(&self) -> bool {
        matches!(self.phase, TransitionPhase::Transitioning { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{MotionSource, State, StateMachine, TimePolicy};
    use crate::handles::ClipIndex;

    #[test]
    fn initial_record_is_at_rest() {
        let machine = StateMachine {
            name: "m".into(),
            states: vec![State::new(
                "Idle",
                MotionSource {
                    clip: ClipIndex(0),
                    duration_seconds: 1.0,
                },
                TimePolicy::Loop,
            )],
            any_state_transitions: vec![],
            initial_state: StateIndex(0),
        };
        let record = MachineState::initial(&machine);
        assert_eq!(record.current_state, StateIndex(0));
        assert_eq!(record.current_time, 0.0);
        assert!(!record.is_transitioning());
    }
}
