//! Error taxonomy.
//!
//! Only configuration errors surface as `Err`: failed name/hash resolution
//! and structural problems caught by graph validation. Runtime policy
//! outcomes (no eligible transition, a clamp state reaching its end) are
//! ordinary control flow and never appear here.

use thiserror::Error;

/// Failed name or hash resolution against an immutable graph. Callers must
/// treat this as a configuration error; there is no retry path.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("unknown layer '{0}'")]
    UnknownLayer(String),
    #[error("no layer matches hash {0:#018x}")]
    UnknownLayerHash(u64),
    #[error("unknown state '{state}' in layer '{layer}'")]
    UnknownState { layer: String, state: String },
    #[error("no state matches hash {hash:#018x} in state machine '{machine}'")]
    UnknownStateHash { machine: String, hash: u64 },
    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),
    #[error("no parameter matches hash {0:#018x}")]
    UnknownParameterHash(u64),
}

/// Structural defect detected by load-time validation. The evaluator assumes
/// a validated graph and performs none of these checks per tick.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("layer '{layer}' references state machine {machine} out of range")]
    LayerMachineOutOfRange { layer: String, machine: u16 },
    #[error("state machine '{machine}' initial state {state} out of range")]
    InitialStateOutOfRange { machine: String, state: u16 },
    #[error("transition from '{from_state}' targets state {target} out of range")]
    TransitionTargetOutOfRange { from_state: String, target: u16 },
    #[error("condition on '{from_state}' references parameter {parameter} out of range")]
    ConditionParameterOutOfRange { from_state: String, parameter: u16 },
    #[error("condition on '{from_state}' applies a {predicate} predicate to {kind} parameter '{parameter}'")]
    ConditionKindMismatch {
        from_state: String,
        predicate: &'static str,
        kind: &'static str,
        parameter: String,
    },
    #[error("state '{state}' has non-positive duration {duration}")]
    NonPositiveDuration { state: String, duration: f32 },
    #[error("transition from '{from_state}' has non-finite blend duration")]
    InvalidBlendDuration { from_state: String },
    #[error("duplicate {namespace} name '{name}'")]
    DuplicateName {
        namespace: &'static str,
        name: String,
    },
}
