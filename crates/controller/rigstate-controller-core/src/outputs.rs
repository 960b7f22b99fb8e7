//! Output contracts: pose-sample requests and semantic events.
//!
//! The evaluator produces at most two sample requests per state machine per
//! tick, grouped per layer with the declared blending mode, mask, and the
//! layer's weight. The external pose sampler consumes the requests; events
//! are for hosts that react to transition lifecycle.

use serde::{Deserialize, Serialize};

use crate::graph::LayerBlending;
use crate::handles::{BoneMaskIndex, ClipIndex, LayerIndex, StateIndex, StateMachineIndex, TransitionRef};

/// One pose-sampling request: sample `clip` at `normalized_time`, weighted
/// by `weight` within its layer.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoseSample {
    pub state: StateIndex,
    pub clip: ClipIndex,
    pub normalized_time: f32,
    pub weight: f32,
}

/// Samples produced by one state machine step: one entry at rest, two while
/// a transition blends. Weights always sum to 1.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MachineSamples {
    pub first: PoseSample,
    pub second: Option<PoseSample>,
}

impl MachineSamples {
    #[inline]
    pub fn single(sample: PoseSample) -> Self {
        Self {
            first: sample,
            second: None,
        }
    }

    #[inline]
    pub fn pair(first: PoseSample, second: PoseSample) -> Self {
        Self {
            first,
            second: Some(second),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &PoseSample> {
        std::iter::once(&self.first).chain(self.second.as_ref())
    }
}

/// One layer's contribution this tick, in layer declaration order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerOutput {
    pub layer: LayerIndex,
    /// The layer's entry in the weight table (1.0 for the base layer).
    pub weight: f32,
    pub blending: LayerBlending,
    pub bone_mask: Option<BoneMaskIndex>,
    pub samples: MachineSamples,
}

/// Discrete signals emitted while stepping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum CoreEvent {
    TransitionStarted {
        machine: StateMachineIndex,
        transition: TransitionRef,
    },
    TransitionInterrupted {
        machine: StateMachineIndex,
        interrupted: TransitionRef,
        by: TransitionRef,
    },
    TransitionCompleted {
        machine: StateMachineIndex,
        state: StateIndex,
    },
    /// A clamp-policy state reached its end. Emitted once per arrival.
    StateCompleted {
        machine: StateMachineIndex,
        state: StateIndex,
    },
}

/// Outputs of one controller tick, reused across ticks.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub layers: Vec<LayerOutput>,
    #[serde(default)]
    pub events: Vec<CoreEvent>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.layers.clear();
        self.events.clear();
    }

    #[inline]
    pub fn push_layer(&mut self, layer: LayerOutput) {
        self.layers.push(layer);
    }

    #[inline]
    pub fn push_event(&mut self, event: CoreEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty() && self.events.is_empty()
    }
}
