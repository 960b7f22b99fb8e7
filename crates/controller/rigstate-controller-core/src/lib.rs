//! rigstate controller core (engine-agnostic)
//!
//! Runtime evaluator for a layered animator-controller graph: a static,
//! precompiled description of layers, state machines, states, transitions,
//! and parameters, advanced per instance per tick. The core decides when
//! transitions fire (any-state transitions, interrupts, inertial-blend
//! bookkeeping included), keeps sync layers on one shared record, and emits
//! the weighted pose-sample requests an external pose sampler consumes.
//! Pose math, baking, and host scheduling live outside this crate.

pub mod active;
pub mod assets;
pub mod controller;
pub mod error;
pub mod graph;
pub mod handles;
pub mod layers;
pub mod machine;
pub mod outputs;
pub mod params;
pub mod resolve;

// Re-exports for consumers (adapters)
pub use active::{MachineState, TransitionPhase};
pub use assets::{BoneMask, BoneMaskSet, ClipInfo, ClipSet};
pub use controller::{Controller, ControllerInstance};
pub use error::{GraphError, ResolveError};
pub use graph::{
    Condition, ControllerGraph, InterruptSource, Layer, LayerBlending, MotionSource,
    ParameterKind, ParameterSpec, Predicate, State, StateMachine, TimePolicy, Transition,
};
pub use handles::{
    BoneMaskIndex, ClipIndex, LayerIndex, ParameterIndex, StateHandle, StateIndex,
    StateMachineIndex, TransitionRef,
};
pub use layers::LayerWeights;
pub use machine::{step_machine, StepReport};
pub use outputs::{CoreEvent, LayerOutput, MachineSamples, Outputs, PoseSample};
pub use params::{ParameterBank, ParameterValue};
pub use resolve::name_hash;
