//! Index newtypes and resolved addresses into a controller graph.
//!
//! Everything at tick time is addressed by small integer indices into the
//! graph's flat arrays. Names exist only in the blob's name tables and are
//! resolved up front through the [`Controller`](crate::Controller) facade.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct StateMachineIndex(pub u16);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct StateIndex(pub u16);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct LayerIndex(pub u16);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ParameterIndex(pub u16);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ClipIndex(pub u16);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct BoneMaskIndex(pub u16);

/// Identity of a transition within one state machine.
///
/// Ordinary transitions are indexed within their source state's list and are
/// resolved against whatever state is current when the reference is read.
/// Any-state transitions live in the machine-wide list; the flag is what
/// distinguishes the two address spaces.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct TransitionRef {
    pub index: u16,
    pub any_state: bool,
}

impl TransitionRef {
    #[inline]
    pub fn ordinary(index: u16) -> Self {
        Self {
            index,
            any_state: false,
        }
    }

    #[inline]
    pub fn any_state(index: u16) -> Self {
        Self {
            index,
            any_state: true,
        }
    }
}

/// A resolved (state machine, state) address.
///
/// Handles come out of the name resolver on the controller facade and are
/// meant to be cached by the caller; tick-time code never constructs one
/// from raw integers.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct StateHandle {
    machine: StateMachineIndex,
    state: StateIndex,
}

impl StateHandle {
    pub(crate) fn new(machine: StateMachineIndex, state: StateIndex) -> Self {
        Self { machine, state }
    }

    #[inline]
    pub fn machine(&self) -> StateMachineIndex {
        self.machine
    }

    #[inline]
    pub fn state(&self) -> StateIndex {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_ref_constructors() {
        let a = TransitionRef::ordinary(3);
        let b = TransitionRef::any_state(3);
        assert_ne!(a, b);
        assert_eq!(a.index, b.index);
        assert!(b.any_state);
    }

    #[test]
    fn state_handle_accessors() {
        let h = StateHandle::new(StateMachineIndex(1), StateIndex(4));
        assert_eq!(h.machine(), StateMachineIndex(1));
        assert_eq!(h.state(), StateIndex(4));
    }
}
