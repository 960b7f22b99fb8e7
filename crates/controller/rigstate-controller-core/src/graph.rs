//! Static controller graph: the immutable, shared description of layers,
//! state machines, states, transitions, conditions, and parameters.
//!
//! Relationships are integer indices into flat arrays, never references, so
//! the whole graph is a cache-dense blob that many instances read without
//! locking. Names and their stable hashes live in the blob purely for setup
//! time resolution; nothing at tick time touches them.

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::handles::{
    BoneMaskIndex, ClipIndex, LayerIndex, ParameterIndex, StateIndex, StateMachineIndex,
    TransitionRef,
};
use crate::params::ParameterValue;
use crate::resolve::name_hash;

/// How a layer's sampled pose is composited onto the running pose.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum LayerBlending {
    Override,
    Additive,
}

/// How a state's normalized time behaves past the end of its cycle.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum TimePolicy {
    Loop,
    Clamp,
}

/// Which transition sets may interrupt an in-flight transition.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum InterruptSource {
    None,
    CurrentState,
    NextState,
    CurrentOrNextState,
}

/// Declared kind of a parameter, fixed at bake time.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum ParameterKind {
    Float,
    Int,
    Bool,
    Trigger,
}

impl ParameterKind {
    fn label(self) -> &'static str {
        match self {
            ParameterKind::Float => "float",
            ParameterKind::Int => "int",
            ParameterKind::Bool => "bool",
            ParameterKind::Trigger => "trigger",
        }
    }
}

/// One entry in the graph's parameter table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    pub name_hash: u64,
    pub kind: ParameterKind,
    pub default: ParameterValue,
}

impl ParameterSpec {
    pub fn float(name: &str, default: f32) -> Self {
        Self {
            name: name.to_string(),
            name_hash: name_hash(name),
            kind: ParameterKind::Float,
            default: ParameterValue::Float(default),
        }
    }

    pub fn int(name: &str, default: i32) -> Self {
        Self {
            name: name.to_string(),
            name_hash: name_hash(name),
            kind: ParameterKind::Int,
            default: ParameterValue::Int(default),
        }
    }

    pub fn bool(name: &str, default: bool) -> Self {
        Self {
            name: name.to_string(),
            name_hash: name_hash(name),
            kind: ParameterKind::Bool,
            default: ParameterValue::Bool(default),
        }
    }

    pub fn trigger(name: &str) -> Self {
        Self {
            name: name.to_string(),
            name_hash: name_hash(name),
            kind: ParameterKind::Trigger,
            default: ParameterValue::Trigger(false),
        }
    }
}

/// Guard predicate evaluated against the parameter bank.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    If,
    IfNot,
    Greater(f32),
    Less(f32),
    Equals(i32),
    NotEquals(i32),
    Trigger,
}

impl Predicate {
    fn label(self) -> &'static str {
        match self {
            Predicate::If => "if",
            Predicate::IfNot => "if-not",
            Predicate::Greater(_) => "greater",
            Predicate::Less(_) => "less",
            Predicate::Equals(_) => "equals",
            Predicate::NotEquals(_) => "not-equals",
            Predicate::Trigger => "trigger",
        }
    }
}

/// One condition of a transition guard. All conditions must hold for the
/// transition to fire.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub parameter: ParameterIndex,
    pub predicate: Predicate,
}

impl Condition {
    pub fn new(parameter: ParameterIndex, predicate: Predicate) -> Self {
        Self {
            parameter,
            predicate,
        }
    }
}

/// A guarded edge to a target state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub target: StateIndex,
    /// Blend length in seconds. Non-positive means an instant switch.
    pub duration_seconds: f32,
    /// When set, the transition is only eligible once the source state has
    /// reached its end this cycle (clamp pinned at 1.0, or a loop wrap on
    /// the current tick).
    #[serde(default)]
    pub requires_end: bool,
    pub interrupt_source: InterruptSource,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl Transition {
    pub fn new(target: StateIndex, duration_seconds: f32) -> Self {
        Self {
            target,
            duration_seconds,
            requires_end: false,
            interrupt_source: InterruptSource::None,
            conditions: Vec::new(),
        }
    }

    pub fn when(mut self, parameter: ParameterIndex, predicate: Predicate) -> Self {
        self.conditions.push(Condition::new(parameter, predicate));
        self
    }

    pub fn at_end(mut self) -> Self {
        self.requires_end = true;
        self
    }

    pub fn interruptible_by(mut self, source: InterruptSource) -> Self {
        self.interrupt_source = source;
        self
    }
}

/// The motion a state plays, addressed into the companion clip-set blob.
/// The duration drives normalized time; everything richer (blend trees,
/// mirroring, cycle offsets) is the pose sampler's contract.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MotionSource {
    pub clip: ClipIndex,
    pub duration_seconds: f32,
}

/// A named motion source with a time policy and its outgoing transitions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Full dotted path including parent sub-machine names,
    /// e.g. `"Combat.Melee.Slash"`.
    pub name: String,
    pub name_hash: u64,
    pub motion: MotionSource,
    pub time_policy: TimePolicy,
    #[serde(default)]
    pub transitions: Vec<Transition>,
}

impl State {
    pub fn new(name: &str, motion: MotionSource, time_policy: TimePolicy) -> Self {
        Self {
            name: name.to_string(),
            name_hash: name_hash(name),
            motion,
            time_policy,
            transitions: Vec::new(),
        }
    }

    pub fn with_transitions(mut self, transitions: Vec<Transition>) -> Self {
        self.transitions = transitions;
        self
    }
}

/// An ordered set of states plus the machine-wide any-state transitions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateMachine {
    pub name: String,
    pub states: Vec<State>,
    #[serde(default)]
    pub any_state_transitions: Vec<Transition>,
    pub initial_state: StateIndex,
}

impl StateMachine {
    #[inline]
    pub fn state(&self, index: StateIndex) -> &State {
        &self.states[index.0 as usize]
    }

    /// Resolve a transition reference against its source context. Ordinary
    /// references index the source state's list; any-state references index
    /// the machine-wide list regardless of source.
    #[inline]
    pub fn transition(&self, source: StateIndex, r: TransitionRef) -> &Transition {
        if r.any_state {
            &self.any_state_transitions[r.index as usize]
        } else {
            &self.states[source.0 as usize].transitions[r.index as usize]
        }
    }

    pub fn state_index(&self, full_name: &str) -> Option<StateIndex> {
        self.states
            .iter()
            .position(|s| s.name == full_name)
            .map(|i| StateIndex(i as u16))
    }

    pub fn state_index_hashed(&self, hash: u64) -> Option<StateIndex> {
        self.states
            .iter()
            .position(|s| s.name_hash == hash)
            .map(|i| StateIndex(i as u16))
    }
}

/// An independently blended stream of animation. Layers referencing the same
/// state machine are synchronized: they share one active-state record and
/// always report identical time and transition state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    pub name_hash: u64,
    pub state_machine: StateMachineIndex,
    pub blending: LayerBlending,
    #[serde(default)]
    pub sync_group: Option<u16>,
    #[serde(default)]
    pub bone_mask: Option<BoneMaskIndex>,
    pub default_weight: f32,
}

impl Layer {
    pub fn new(name: &str, state_machine: StateMachineIndex, blending: LayerBlending) -> Self {
        Self {
            name: name.to_string(),
            name_hash: name_hash(name),
            state_machine,
            blending,
            sync_group: None,
            bone_mask: None,
            default_weight: 1.0,
        }
    }

    pub fn with_sync_group(mut self, group: u16) -> Self {
        self.sync_group = Some(group);
        self
    }

    pub fn with_bone_mask(mut self, mask: BoneMaskIndex) -> Self {
        self.bone_mask = Some(mask);
        self
    }

    pub fn with_default_weight(mut self, weight: f32) -> Self {
        self.default_weight = weight;
        self
    }
}

/// The compiled controller graph. Immutable once validated; shared by
/// reference across every instance and every parallel evaluation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControllerGraph {
    pub name: String,
    pub layers: Vec<Layer>,
    pub state_machines: Vec<StateMachine>,
    pub parameters: Vec<ParameterSpec>,
}

impl ControllerGraph {
    #[inline]
    pub fn machine(&self, index: StateMachineIndex) -> &StateMachine {
        &self.state_machines[index.0 as usize]
    }

    #[inline]
    pub fn layer(&self, index: LayerIndex) -> &Layer {
        &self.layers[index.0 as usize]
    }

    /// Linear scan of the layer name table. Expensive by contract; cache the
    /// result.
    pub fn layer_index(&self, name: &str) -> Option<LayerIndex> {
        self.layers
            .iter()
            .position(|l| l.name == name)
            .map(|i| LayerIndex(i as u16))
    }

    pub fn layer_index_hashed(&self, hash: u64) -> Option<LayerIndex> {
        self.layers
            .iter()
            .position(|l| l.name_hash == hash)
            .map(|i| LayerIndex(i as u16))
    }

    pub fn parameter_index(&self, name: &str) -> Option<ParameterIndex> {
        self.parameters
            .iter()
            .position(|p| p.name == name)
            .map(|i| ParameterIndex(i as u16))
    }

    pub fn parameter_index_hashed(&self, hash: u64) -> Option<ParameterIndex> {
        self.parameters
            .iter()
            .position(|p| p.name_hash == hash)
            .map(|i| ParameterIndex(i as u16))
    }

    /// Load-time structural validation. The evaluator assumes a graph that
    /// has passed this check and does no defensive checking per tick.
    pub fn validate(&self) -> Result<(), GraphError> {
        let mut layer_names: HashSet<&str> = HashSet::new();
        for layer in &self.layers {
            if !layer_names.insert(layer.name.as_str()) {
                return Err(GraphError::DuplicateName {
                    namespace: "layer",
                    name: layer.name.clone(),
                });
            }
            if layer.state_machine.0 as usize >= self.state_machines.len() {
                return Err(GraphError::LayerMachineOutOfRange {
                    layer: layer.name.clone(),
                    machine: layer.state_machine.0,
                });
            }
        }

        let mut parameter_names: HashSet<&str> = HashSet::new();
        for parameter in &self.parameters {
            if !parameter_names.insert(parameter.name.as_str()) {
                return Err(GraphError::DuplicateName {
                    namespace: "parameter",
                    name: parameter.name.clone(),
                });
            }
        }

        for machine in &self.state_machines {
            let mut state_names: HashSet<&str> = HashSet::new();
            for state in &machine.states {
                if !state_names.insert(state.name.as_str()) {
                    return Err(GraphError::DuplicateName {
                        namespace: "state",
                        name: state.name.clone(),
                    });
                }
                if !(state.motion.duration_seconds > 0.0) {
                    return Err(GraphError::NonPositiveDuration {
                        state: state.name.clone(),
                        duration: state.motion.duration_seconds,
                    });
                }
            }
            if machine.initial_state.0 as usize >= machine.states.len() {
                return Err(GraphError::InitialStateOutOfRange {
                    machine: machine.name.clone(),
                    state: machine.initial_state.0,
                });
            }
            for state in &machine.states {
                self.validate_transitions(&state.name, &state.transitions, machine)?;
            }
            self.validate_transitions(&machine.name, &machine.any_state_transitions, machine)?;
        }
        Ok(())
    }

    fn validate_transitions(
        &self,
        source: &str,
        transitions: &[Transition],
        machine: &StateMachine,
    ) -> Result<(), GraphError> {
        for transition in transitions {
            if transition.target.0 as usize >= machine.states.len() {
                return Err(GraphError::TransitionTargetOutOfRange {
                    from_state: source.to_string(),
                    target: transition.target.0,
                });
            }
            if !transition.duration_seconds.is_finite() {
                return Err(GraphError::InvalidBlendDuration {
                    from_state: source.to_string(),
                });
            }
            for condition in &transition.conditions {
                let Some(spec) = self.parameters.get(condition.parameter.0 as usize) else {
                    return Err(GraphError::ConditionParameterOutOfRange {
                        from_state: source.to_string(),
                        parameter: condition.parameter.0,
                    });
                };
                let compatible = match condition.predicate {
                    Predicate::If | Predicate::IfNot => {
                        matches!(spec.kind, ParameterKind::Bool | ParameterKind::Trigger)
                    }
                    Predicate::Greater(_) | Predicate::Less(_) => {
                        matches!(spec.kind, ParameterKind::Float | ParameterKind::Int)
                    }
                    Predicate::Equals(_) | Predicate::NotEquals(_) => {
                        matches!(spec.kind, ParameterKind::Int)
                    }
                    Predicate::Trigger => matches!(spec.kind, ParameterKind::Trigger),
                };
                if !compatible {
                    return Err(GraphError::ConditionKindMismatch {
                        from_state: source.to_string(),
                        predicate: condition.predicate.label(),
                        kind: spec.kind.label(),
                        parameter: spec.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}
