use std::sync::Arc;

use rigstate_controller_core::{
    name_hash, ClipIndex, Condition, Controller, ControllerGraph, GraphError, Layer,
    LayerBlending, LayerIndex, MotionSource, ParameterIndex, ParameterSpec, Predicate,
    ResolveError, State, StateIndex, StateMachine, StateMachineIndex, TimePolicy, Transition,
};
use rigstate_test_fixtures as fixtures;

fn mk_controller(graph: ControllerGraph) -> Controller {
    Controller::new(
        Arc::new(graph),
        Arc::new(fixtures::clip_set()),
        Arc::new(fixtures::bone_masks()),
    )
}

/// it should resolve layer-qualified state names to handles
#[test]
fn resolve_state_handles() {
    let controller = mk_controller(fixtures::locomotion().unwrap());
    let run = controller.state_handle("Base", "Run").unwrap();
    assert_eq!(run.machine(), StateMachineIndex(0));
    assert_eq!(run.state(), StateIndex(1));

    let idle = controller.state_handle("Base", "Idle").unwrap();
    assert_ne!(idle, run);
}

/// it should resolve hashed lookups identically to literal lookups
#[test]
fn hashed_resolution_matches_literal() {
    let controller = mk_controller(fixtures::locomotion().unwrap());
    let literal = controller.state_handle("Base", "Jump").unwrap();
    let hashed = controller
        .state_handle_hashed(name_hash("Base"), name_hash("Jump"))
        .unwrap();
    assert_eq!(literal, hashed);

    assert_eq!(
        controller.layer_index("Base").unwrap(),
        controller.layer_index_hashed(name_hash("Base")).unwrap()
    );
    assert_eq!(
        controller.parameter_index("jump").unwrap(),
        controller
            .parameter_index_hashed(name_hash("jump"))
            .unwrap()
    );
}

/// it should resolve dotted sub-machine state paths
#[test]
fn resolve_nested_state_path() {
    let controller = mk_controller(fixtures::nested_names().unwrap());
    let slash = controller
        .state_handle("Base", "Combat.Melee.Slash")
        .unwrap();
    assert_eq!(slash.state(), StateIndex(1));
    let hashed = controller
        .state_handle_hashed(name_hash("Base"), name_hash("Combat.Melee.Slash"))
        .unwrap();
    assert_eq!(slash, hashed);
}

/// it should resolve layer and parameter indices by declaration order
#[test]
fn resolve_layer_and_parameter_indices() {
    let controller = mk_controller(fixtures::layered().unwrap());
    assert_eq!(controller.layer_index("Base").unwrap(), LayerIndex(0));
    assert_eq!(controller.layer_index("UpperBody").unwrap(), LayerIndex(1));
    assert_eq!(controller.layer_index("Mirror").unwrap(), LayerIndex(2));
    assert_eq!(
        controller.parameter_index("speed").unwrap(),
        ParameterIndex(0)
    );
    assert_eq!(
        controller.parameter_index("wave").unwrap(),
        ParameterIndex(1)
    );
}

/// it should fail resolution with the matching configuration error
#[test]
fn resolution_failures_are_typed() {
    let controller = mk_controller(fixtures::locomotion().unwrap());
    assert!(matches!(
        controller.state_handle("Nope", "Idle"),
        Err(ResolveError::UnknownLayer(_))
    ));
    assert!(matches!(
        controller.state_handle("Base", "Nope"),
        Err(ResolveError::UnknownState { .. })
    ));
    assert!(matches!(
        controller.layer_index("Nope"),
        Err(ResolveError::UnknownLayer(_))
    ));
    assert!(matches!(
        controller.parameter_index("nope"),
        Err(ResolveError::UnknownParameter(_))
    ));
    assert!(matches!(
        controller.state_handle_hashed(name_hash("Nope"), name_hash("Idle")),
        Err(ResolveError::UnknownLayerHash(_))
    ));
    assert!(matches!(
        controller.state_handle_hashed(name_hash("Base"), name_hash("Nope")),
        Err(ResolveError::UnknownStateHash { .. })
    ));
    assert!(matches!(
        controller.parameter_index_hashed(name_hash("nope")),
        Err(ResolveError::UnknownParameterHash(_))
    ));
}

fn base_graph(states: Vec<State>) -> ControllerGraph {
    ControllerGraph {
        name: "invalid".into(),
        layers: vec![Layer::new(
            "Base",
            StateMachineIndex(0),
            LayerBlending::Override,
        )],
        state_machines: vec![StateMachine {
            name: "Main".into(),
            states,
            any_state_transitions: vec![],
            initial_state: StateIndex(0),
        }],
        parameters: vec![ParameterSpec::bool("flag", false)],
    }
}

fn motion() -> MotionSource {
    MotionSource {
        clip: ClipIndex(0),
        duration_seconds: 1.0,
    }
}

/// it should reject dangling transition targets at validation time
#[test]
fn validate_rejects_dangling_target() {
    let graph = base_graph(vec![State::new("A", motion(), TimePolicy::Loop)
        .with_transitions(vec![Transition::new(StateIndex(7), 0.2)])]);
    assert!(matches!(
        graph.validate(),
        Err(GraphError::TransitionTargetOutOfRange { .. })
    ));
}

/// it should reject conditions whose predicate does not fit the parameter kind
#[test]
fn validate_rejects_condition_kind_mismatch() {
    let graph = base_graph(vec![State::new("A", motion(), TimePolicy::Loop)
        .with_transitions(vec![
            Transition::new(StateIndex(0), 0.2).when(ParameterIndex(0), Predicate::Trigger)
        ])]);
    assert!(matches!(
        graph.validate(),
        Err(GraphError::ConditionKindMismatch { .. })
    ));
}

/// it should reject conditions referencing parameters out of range
#[test]
fn validate_rejects_dangling_parameter() {
    let graph = base_graph(vec![State::new("A", motion(), TimePolicy::Loop)
        .with_transitions(vec![Transition {
            target: StateIndex(0),
            duration_seconds: 0.2,
            requires_end: false,
            interrupt_source: rigstate_controller_core::InterruptSource::None,
            conditions: vec![Condition::new(ParameterIndex(9), Predicate::If)],
        }])]);
    assert!(matches!(
        graph.validate(),
        Err(GraphError::ConditionParameterOutOfRange { .. })
    ));
}

/// it should reject duplicate state names within a machine
#[test]
fn validate_rejects_duplicate_state_names() {
    let graph = base_graph(vec![
        State::new("A", motion(), TimePolicy::Loop),
        State::new("A", motion(), TimePolicy::Loop),
    ]);
    assert!(matches!(
        graph.validate(),
        Err(GraphError::DuplicateName { namespace: "state", .. })
    ));
}

/// it should reject non-positive state durations
#[test]
fn validate_rejects_non_positive_duration() {
    let graph = base_graph(vec![State::new(
        "A",
        MotionSource {
            clip: ClipIndex(0),
            duration_seconds: 0.0,
        },
        TimePolicy::Loop,
    )]);
    assert!(matches!(
        graph.validate(),
        Err(GraphError::NonPositiveDuration { .. })
    ));
}

/// it should reject an initial state outside the machine
#[test]
fn validate_rejects_initial_state_out_of_range() {
    let mut graph = base_graph(vec![State::new("A", motion(), TimePolicy::Loop)]);
    graph.state_machines[0].initial_state = StateIndex(3);
    assert!(matches!(
        graph.validate(),
        Err(GraphError::InitialStateOutOfRange { .. })
    ));
}

/// it should reject a layer pointing at a missing state machine
#[test]
fn validate_rejects_layer_machine_out_of_range() {
    let mut graph = base_graph(vec![State::new("A", motion(), TimePolicy::Loop)]);
    graph.layers[0].state_machine = StateMachineIndex(4);
    assert!(matches!(
        graph.validate(),
        Err(GraphError::LayerMachineOutOfRange { .. })
    ));
}

/// it should round-trip a controller graph through serde
#[test]
fn graph_serde_roundtrip() {
    let graph = fixtures::layered().unwrap();
    let json = serde_json::to_string(&graph).unwrap();
    let back: ControllerGraph = serde_json::from_str(&json).unwrap();
    assert_eq!(graph, back);
    assert!(back.validate().is_ok());
}

/// it should keep stored name hashes consistent with name_hash()
#[test]
fn stored_hashes_match_helper() {
    let graph = fixtures::locomotion().unwrap();
    for layer in &graph.layers {
        assert_eq!(layer.name_hash, name_hash(&layer.name));
    }
    for machine in &graph.state_machines {
        for state in &machine.states {
            assert_eq!(state.name_hash, name_hash(&state.name));
        }
    }
    for parameter in &graph.parameters {
        assert_eq!(parameter.name_hash, name_hash(&parameter.name));
    }
}
