//! Canned controller graphs shared by integration tests and benches.
//!
//! Each fixture builds and validates a small but realistic graph. Tests
//! resolve names through the facade rather than hard-coding indices, so the
//! fixtures stay free to reorder their tables.

use anyhow::Result;
use rigstate_controller_core::{
    BoneMask, BoneMaskIndex, BoneMaskSet, ClipIndex, ClipInfo, ClipSet, ControllerGraph,
    InterruptSource, Layer, LayerBlending, MotionSource, ParameterSpec, Predicate, State,
    StateIndex, StateMachine, StateMachineIndex, TimePolicy, Transition,
};

fn clip(index: u16, duration_seconds: f32) -> MotionSource {
    MotionSource {
        clip: ClipIndex(index),
        duration_seconds,
    }
}

/// Clip set matching every fixture graph's clip indices.
pub fn clip_set() -> ClipSet {
    ClipSet {
        clips: vec![
            ClipInfo {
                name: "idle".into(),
                duration_seconds: 1.0,
            },
            ClipInfo {
                name: "run".into(),
                duration_seconds: 0.8,
            },
            ClipInfo {
                name: "jump".into(),
                duration_seconds: 0.5,
            },
            ClipInfo {
                name: "relax".into(),
                duration_seconds: 1.0,
            },
            ClipInfo {
                name: "wave".into(),
                duration_seconds: 1.2,
            },
        ],
    }
}

/// One upper-body mask, enough for masked-layer plumbing.
pub fn bone_masks() -> BoneMaskSet {
    BoneMaskSet {
        masks: vec![BoneMask {
            name: "upper-body".into(),
            weights: vec![0.0, 0.0, 1.0, 1.0, 1.0, 1.0],
        }],
    }
}

/// Single-layer locomotion controller.
///
/// Parameters: `speed` (float), `jump` (trigger), `grounded` (bool).
/// States: Idle (loop 1 s) <-> Run (loop 0.8 s) guarded on `speed`;
/// any-state -> Jump (clamp 0.5 s) on the `jump` trigger; Jump returns to
/// Idle once its clip ends.
pub fn locomotion() -> Result<ControllerGraph> {
    let idle = State::new("Idle", clip(0, 1.0), TimePolicy::Loop).with_transitions(vec![
        Transition::new(StateIndex(1), 0.25)
            .when(param(0), Predicate::Greater(0.1))
            .interruptible_by(InterruptSource::CurrentState),
    ]);
    let run = State::new("Run", clip(1, 0.8), TimePolicy::Loop).with_transitions(vec![
        Transition::new(StateIndex(0), 0.25)
            .when(param(0), Predicate::Less(0.05))
            .interruptible_by(InterruptSource::CurrentState),
    ]);
    let jump = State::new("Jump", clip(2, 0.5), TimePolicy::Clamp)
        .with_transitions(vec![Transition::new(StateIndex(0), 0.2).at_end()]);

    let graph = ControllerGraph {
        name: "locomotion".into(),
        layers: vec![Layer::new(
            "Base",
            StateMachineIndex(0),
            LayerBlending::Override,
        )],
        state_machines: vec![StateMachine {
            name: "Locomotion".into(),
            states: vec![idle, run, jump],
            any_state_transitions: vec![
                Transition::new(StateIndex(2), 0.1).when(param(1), Predicate::Trigger)
            ],
            initial_state: StateIndex(0),
        }],
        parameters: vec![
            ParameterSpec::float("speed", 0.0),
            ParameterSpec::trigger("jump"),
            ParameterSpec::bool("grounded", true),
        ],
    };
    graph.validate()?;
    Ok(graph)
}

/// Three-layer controller: a base locomotion machine, an additive masked
/// upper-body machine, and a sync layer sharing the base machine.
///
/// Parameters: `speed` (float), `wave` (bool).
pub fn layered() -> Result<ControllerGraph> {
    let idle = State::new("Idle", clip(0, 1.0), TimePolicy::Loop).with_transitions(vec![
        Transition::new(StateIndex(1), 0.25).when(param(0), Predicate::Greater(0.1)),
    ]);
    let run = State::new("Run", clip(1, 0.8), TimePolicy::Loop).with_transitions(vec![
        Transition::new(StateIndex(0), 0.25).when(param(0), Predicate::Less(0.05)),
    ]);
    let relax = State::new("Relax", clip(3, 1.0), TimePolicy::Loop).with_transitions(vec![
        Transition::new(StateIndex(1), 0.3).when(param(1), Predicate::If),
    ]);
    let wave = State::new("Wave", clip(4, 1.2), TimePolicy::Loop).with_transitions(vec![
        Transition::new(StateIndex(0), 0.3).when(param(1), Predicate::IfNot),
    ]);

    let graph = ControllerGraph {
        name: "layered".into(),
        layers: vec![
            Layer::new("Base", StateMachineIndex(0), LayerBlending::Override),
            Layer::new("UpperBody", StateMachineIndex(1), LayerBlending::Additive)
                .with_bone_mask(BoneMaskIndex(0))
                .with_default_weight(0.5),
            Layer::new("Mirror", StateMachineIndex(0), LayerBlending::Override)
                .with_sync_group(0),
        ],
        state_machines: vec![
            StateMachine {
                name: "Locomotion".into(),
                states: vec![idle, run],
                any_state_transitions: vec![],
                initial_state: StateIndex(0),
            },
            StateMachine {
                name: "UpperBody".into(),
                states: vec![relax, wave],
                any_state_transitions: vec![],
                initial_state: StateIndex(0),
            },
        ],
        parameters: vec![
            ParameterSpec::float("speed", 0.0),
            ParameterSpec::bool("wave", false),
        ],
    };
    graph.validate()?;
    Ok(graph)
}

/// Interrupt-policy testbed: A -> B is a long blend whose interrupt source
/// is the given policy; A -> C (`bail`) is the current-state candidate and
/// B -> C (`bail_next`) the next-state candidate.
///
/// Parameters: `go` (bool), `bail` (bool), `bail_next` (bool).
pub fn interruptible(source: InterruptSource) -> Result<ControllerGraph> {
    let a = State::new("A", clip(0, 1.0), TimePolicy::Loop).with_transitions(vec![
        Transition::new(StateIndex(1), 0.5)
            .when(param(0), Predicate::If)
            .interruptible_by(source),
        Transition::new(StateIndex(2), 0.25).when(param(1), Predicate::If),
    ]);
    let b = State::new("B", clip(1, 1.0), TimePolicy::Loop).with_transitions(vec![
        Transition::new(StateIndex(2), 0.25).when(param(2), Predicate::If),
    ]);
    let c = State::new("C", clip(2, 1.0), TimePolicy::Loop);

    let graph = ControllerGraph {
        name: "interruptible".into(),
        layers: vec![Layer::new(
            "Base",
            StateMachineIndex(0),
            LayerBlending::Override,
        )],
        state_machines: vec![StateMachine {
            name: "Main".into(),
            states: vec![a, b, c],
            any_state_transitions: vec![],
            initial_state: StateIndex(0),
        }],
        parameters: vec![
            ParameterSpec::bool("go", false),
            ParameterSpec::bool("bail", false),
            ParameterSpec::bool("bail_next", false),
        ],
    };
    graph.validate()?;
    Ok(graph)
}

/// Sub-machine naming fixture: states carry full dotted paths the way the
/// baker flattens nested sub-state-machines.
pub fn nested_names() -> Result<ControllerGraph> {
    let idle = State::new("Idle", clip(0, 1.0), TimePolicy::Loop);
    let slash = State::new("Combat.Melee.Slash", clip(2, 0.5), TimePolicy::Clamp)
        .with_transitions(vec![Transition::new(StateIndex(0), 0.2).at_end()]);

    let graph = ControllerGraph {
        name: "nested".into(),
        layers: vec![Layer::new(
            "Base",
            StateMachineIndex(0),
            LayerBlending::Override,
        )],
        state_machines: vec![StateMachine {
            name: "Main".into(),
            states: vec![idle, slash],
            any_state_transitions: vec![],
            initial_state: StateIndex(0),
        }],
        parameters: vec![],
    };
    graph.validate()?;
    Ok(graph)
}

fn param(index: u16) -> rigstate_controller_core::ParameterIndex {
    rigstate_controller_core::ParameterIndex(index)
}
