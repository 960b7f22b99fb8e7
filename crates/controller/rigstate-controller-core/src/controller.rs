//! Controller facade and per-instance tick orchestration.
//!
//! A `Controller` is the per-entity handle: references to the three shared
//! blob assets plus the instance scalars (playback speed, inertial-blend
//! timestamp). Name resolution lives here and is expensive by contract:
//! resolve once at setup, cache the handles, and feed only integers to the
//! tick path.

use std::sync::Arc;

use crate::active::MachineState;
use crate::assets::{BoneMaskSet, ClipSet};
use crate::error::ResolveError;
use crate::graph::ControllerGraph;
use crate::handles::{LayerIndex, ParameterIndex, StateHandle, StateMachineIndex};
use crate::layers::{compose_layers, LayerWeights};
use crate::machine::step_machine;
use crate::outputs::{MachineSamples, Outputs};
use crate::params::ParameterBank;

/// Per-entity animator controller handle.
#[derive(Clone, Debug)]
pub struct Controller {
    pub graph: Arc<ControllerGraph>,
    pub clips: Arc<ClipSet>,
    pub masks: Arc<BoneMaskSet>,
    /// Playback speed multiplier applied to delta time for every state
    /// machine of this instance.
    pub speed: f32,
    /// Seconds since the last inertial blend started, or None when no
    /// inertial blending is active. Advanced by wall-clock delta time.
    pub inertial_blend_seconds: Option<f32>,
}

impl Controller {
    pub fn new(graph: Arc<ControllerGraph>, clips: Arc<ClipSet>, masks: Arc<BoneMaskSet>) -> Self {
        Self {
            graph,
            clips,
            masks,
            speed: 1.0,
            inertial_blend_seconds: None,
        }
    }

    /// Resolve a layer-qualified state name to a handle. The state name must
    /// be the full dotted path through nested sub-machines, e.g.
    /// `"Combat.Melee.Slash"`. Expensive: cache and re-use the result.
    pub fn state_handle(
        &self,
        layer_name: &str,
        full_state_name: &str,
    ) -> Result<StateHandle, ResolveError> {
        let layer = self
            .graph
            .layer_index(layer_name)
            .ok_or_else(|| ResolveError::UnknownLayer(layer_name.to_string()))?;
        let machine_index = self.graph.layer(layer).state_machine;
        let machine = self.graph.machine(machine_index);
        let state = machine.state_index(full_state_name).ok_or_else(|| {
            ResolveError::UnknownState {
                layer: layer_name.to_string(),
                state: full_state_name.to_string(),
            }
        })?;
        Ok(StateHandle::new(machine_index, state))
    }

    /// Hashed variant of [`state_handle`](Self::state_handle), for callers
    /// that precompute [`name_hash`](crate::resolve::name_hash) of the layer
    /// name and full state path. Expensive: cache and re-use the result.
    pub fn state_handle_hashed(
        &self,
        layer_name_hash: u64,
        state_name_hash: u64,
    ) -> Result<StateHandle, ResolveError> {
        let layer = self
            .graph
            .layer_index_hashed(layer_name_hash)
            .ok_or(ResolveError::UnknownLayerHash(layer_name_hash))?;
        let machine_index = self.graph.layer(layer).state_machine;
        let machine = self.graph.machine(machine_index);
        let state = machine.state_index_hashed(state_name_hash).ok_or_else(|| {
            ResolveError::UnknownStateHash {
                machine: machine.name.clone(),
                hash: state_name_hash,
            }
        })?;
        Ok(StateHandle::new(machine_index, state))
    }

    /// Expensive: cache and re-use the result.
    pub fn layer_index(&self, name: &str) -> Result<LayerIndex, ResolveError> {
        self.graph
            .layer_index(name)
            .ok_or_else(|| ResolveError::UnknownLayer(name.to_string()))
    }

    pub fn layer_index_hashed(&self, hash: u64) -> Result<LayerIndex, ResolveError> {
        self.graph
            .layer_index_hashed(hash)
            .ok_or(ResolveError::UnknownLayerHash(hash))
    }

    /// Expensive: cache and re-use the result.
    pub fn parameter_index(&self, name: &str) -> Result<ParameterIndex, ResolveError> {
        self.graph
            .parameter_index(name)
            .ok_or_else(|| ResolveError::UnknownParameter(name.to_string()))
    }

    pub fn parameter_index_hashed(&self, hash: u64) -> Result<ParameterIndex, ResolveError> {
        self.graph
            .parameter_index_hashed(hash)
            .ok_or(ResolveError::UnknownParameterHash(hash))
    }

    /// Create the dynamic state for one animated entity.
    pub fn instantiate(&self) -> ControllerInstance {
        ControllerInstance::new(&self.graph)
    }

    /// Advance the whole instance by one tick.
    ///
    /// Steps every state machine referenced by at least one layer exactly
    /// once (sync layers reuse the result), maintains the inertial-blend
    /// timestamp, composes per-layer outputs, and sweeps trigger pulses.
    /// Bounded-time and non-blocking; the host guarantees one writer per
    /// instance per tick.
    pub fn update<'a>(&mut self, instance: &'a mut ControllerInstance, dt: f32) -> &'a Outputs {
        let graph = Arc::clone(&self.graph);
        let scaled_dt = dt * self.speed;

        instance.outputs.clear();
        for slot in instance.samples.iter_mut() {
            *slot = None;
        }

        let mut interrupted = false;
        let mut completed = false;
        let ControllerInstance {
            machines,
            params,
            referenced,
            samples,
            outputs,
            ..
        } = &mut *instance;
        for &machine_index in referenced.iter() {
            let record = &mut machines[machine_index.0 as usize];
            let (stepped, report) =
                step_machine(graph.as_ref(), machine_index, record, params, scaled_dt, outputs);
            samples[machine_index.0 as usize] = Some(stepped);
            interrupted |= report.interrupted;
            completed |= report.completed;
        }

        // An interrupt starts (or restarts) inertial blending; completing the
        // transition that carries it retires it. The timestamp is wall-clock.
        self.inertial_blend_seconds = if interrupted {
            Some(0.0)
        } else {
            match self.inertial_blend_seconds {
                Some(_) if completed => None,
                Some(t) => Some(t + dt),
                None => None,
            }
        };

        compose_layers(
            graph.as_ref(),
            &instance.layer_weights,
            &instance.samples,
            &mut instance.outputs,
        );
        instance.params.clear_triggers();
        &instance.outputs
    }
}

/// Dynamic state for one animated entity: one active-state record per state
/// machine, the parameter bank, and the layer weight table.
#[derive(Clone, Debug)]
pub struct ControllerInstance {
    machines: Vec<MachineState>,
    pub params: ParameterBank,
    pub layer_weights: LayerWeights,
    /// State machines referenced by at least one layer, in first-reference
    /// order. Only these are stepped.
    referenced: Vec<StateMachineIndex>,
    samples: Vec<Option<MachineSamples>>,
    outputs: Outputs,
}

impl ControllerInstance {
    pub fn new(graph: &ControllerGraph) -> Self {
        let machines = graph
            .state_machines
            .iter()
            .map(MachineState::initial)
            .collect();
        let mut referenced: Vec<StateMachineIndex> = Vec::new();
        for layer in &graph.layers {
            if !referenced.contains(&layer.state_machine) {
                referenced.push(layer.state_machine);
            }
        }
        Self {
            machines,
            params: ParameterBank::new(&graph.parameters),
            layer_weights: LayerWeights::new(&graph.layers),
            referenced,
            samples: vec![None; graph.state_machines.len()],
            outputs: Outputs::default(),
        }
    }

    /// Inspect the shared record of one state machine (what sync layers on
    /// that machine all report).
    #[inline]
    pub fn machine_state(&self, machine: StateMachineIndex) -> &MachineState {
        &self.machines[machine.0 as usize]
    }

    /// Outputs of the most recent tick.
    #[inline]
    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }
}
