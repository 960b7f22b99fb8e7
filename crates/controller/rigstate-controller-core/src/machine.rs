//! State-machine advancement: one tick of time accumulation, transition
//! selection, interrupt handling, and pose-sample emission.
//!
//! `step_machine` advances exactly one active-state record. The controller
//! facade calls it once per referenced state machine per tick, so sync
//! layers sharing a machine reuse a single result. The graph is assumed
//! validated; no index is range-checked here.

use log::{debug, trace};

use crate::active::{MachineState, TransitionPhase};
use crate::graph::{
    Condition, ControllerGraph, InterruptSource, Predicate, StateMachine, TimePolicy, Transition,
};
use crate::handles::{StateIndex, StateMachineIndex, TransitionRef};
use crate::outputs::{CoreEvent, MachineSamples, Outputs, PoseSample};
use crate::params::ParameterBank;

/// Blend lifecycle facts one step reports back to the controller, which owns
/// the instance-wide inertial-blend timestamp.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    /// A permitted interrupt replaced the in-flight transition this tick.
    pub interrupted: bool,
    /// The in-flight transition ran to completion this tick.
    pub completed: bool,
}

fn fmod(a: f32, b: f32) -> f32 {
    if b == 0.0 {
        return 0.0;
    }
    let m = a % b;
    if (m < 0.0 && b > 0.0) || (m > 0.0 && b < 0.0) {
        m + b
    } else {
        m
    }
}

/// Advance a normalized time by `dt_norm` under a policy. Returns the new
/// time and whether the end of the cycle is reached: a wrap on this tick for
/// Loop, the pinned end for Clamp.
fn advance_time(time: f32, dt_norm: f32, policy: TimePolicy) -> (f32, bool) {
    match policy {
        TimePolicy::Loop => {
            let raw = time + dt_norm;
            let wrapped = !(0.0..1.0).contains(&raw);
            let mut t = fmod(raw, 1.0);
            if t < 0.0 {
                t += 1.0;
            }
            (t, wrapped)
        }
        TimePolicy::Clamp => {
            let t = (time + dt_norm).clamp(0.0, 1.0);
            (t, t >= 1.0)
        }
    }
}

fn condition_holds(condition: &Condition, params: &ParameterBank) -> bool {
    let p = condition.parameter;
    match condition.predicate {
        Predicate::If => params.get_bool(p),
        Predicate::IfNot => !params.get_bool(p),
        Predicate::Greater(threshold) => params.get_float(p) > threshold,
        Predicate::Less(threshold) => params.get_float(p) < threshold,
        Predicate::Equals(value) => params.get_int(p) == value,
        Predicate::NotEquals(value) => params.get_int(p) != value,
        Predicate::Trigger => params.trigger_is_set(p),
    }
}

fn transition_eligible(transition: &Transition, params: &ParameterBank, end_reached: bool) -> bool {
    if transition.requires_end && !end_reached {
        return false;
    }
    transition
        .conditions
        .iter()
        .all(|c| condition_holds(c, params))
}

fn consume_triggers(transition: &Transition, params: &mut ParameterBank) {
    for condition in &transition.conditions {
        if matches!(condition.predicate, Predicate::Trigger) {
            params.consume_trigger(condition.parameter);
        }
    }
}

/// First eligible transition in declaration order, or None. `exclude` keeps
/// an in-flight transition from re-firing as its own interrupt.
fn find_in(
    transitions: &[Transition],
    any_state: bool,
    params: &ParameterBank,
    end_reached: bool,
    exclude: Option<TransitionRef>,
) -> Option<TransitionRef> {
    for (i, transition) in transitions.iter().enumerate() {
        let r = if any_state {
            TransitionRef::any_state(i as u16)
        } else {
            TransitionRef::ordinary(i as u16)
        };
        if Some(r) == exclude {
            continue;
        }
        if transition_eligible(transition, params, end_reached) {
            return Some(r);
        }
    }
    None
}

/// Scan a state's outgoing transitions, then the machine-wide any-state set.
/// Per-state transitions win ties by being scanned first.
fn find_from_state(
    machine: &StateMachine,
    state: StateIndex,
    params: &ParameterBank,
    end_reached: bool,
    exclude: Option<TransitionRef>,
) -> Option<TransitionRef> {
    find_in(
        &machine.state(state).transitions,
        false,
        params,
        end_reached,
        exclude,
    )
    .or_else(|| {
        find_in(
            &machine.any_state_transitions,
            true,
            params,
            end_reached,
            exclude,
        )
    })
}

/// Advance one active-state record by one tick and emit its pose samples.
///
/// `scaled_dt` is delta time already multiplied by the instance's playback
/// speed. Events are pushed into `outputs`; the returned samples carry
/// weights that always sum to 1.
pub fn step_machine(
    graph: &ControllerGraph,
    machine_index: StateMachineIndex,
    record: &mut MachineState,
    params: &mut ParameterBank,
    scaled_dt: f32,
    outputs: &mut Outputs,
) -> (MachineSamples, StepReport) {
    let machine = graph.machine(machine_index);
    let mut report = StepReport::default();

    // 1) Time advancement.
    let current = machine.state(record.current_state);
    let was_at_end =
        matches!(current.time_policy, TimePolicy::Clamp) && record.current_time >= 1.0;
    let (t, reached) = advance_time(
        record.current_time,
        scaled_dt / current.motion.duration_seconds,
        current.time_policy,
    );
    record.current_time = t;
    let mut end_reached = reached;
    if reached && !was_at_end && matches!(current.time_policy, TimePolicy::Clamp) {
        outputs.push_event(CoreEvent::StateCompleted {
            machine: machine_index,
            state: record.current_state,
        });
    }

    let mut next_end_reached = false;
    if let TransitionPhase::Transitioning {
        transition,
        next_time,
        progress,
    } = record.phase
    {
        let in_flight = machine.transition(record.current_state, transition);
        let target_index = in_flight.target;
        let target = machine.state(target_index);
        let (nt, nr) = advance_time(
            next_time,
            scaled_dt / target.motion.duration_seconds,
            target.time_policy,
        );
        if matches!(target.time_policy, TimePolicy::Clamp) && nr && next_time < 1.0 {
            outputs.push_event(CoreEvent::StateCompleted {
                machine: machine_index,
                state: target_index,
            });
        }
        let p = if in_flight.duration_seconds > 0.0 {
            (progress + scaled_dt / in_flight.duration_seconds).clamp(0.0, 1.0)
        } else {
            1.0
        };
        if p >= 1.0 {
            // Blend done: the target becomes current, times carry over.
            record.current_state = target_index;
            record.current_time = nt;
            record.phase = TransitionPhase::Rest;
            end_reached = nr;
            report.completed = true;
            trace!(
                "machine {} completed transition into state {}",
                machine_index.0,
                target_index.0
            );
            outputs.push_event(CoreEvent::TransitionCompleted {
                machine: machine_index,
                state: target_index,
            });
        } else {
            record.phase = TransitionPhase::Transitioning {
                transition,
                next_time: nt,
                progress: p,
            };
            next_end_reached = nr;
        }
    }

    // 2) Transition evaluation.
    match record.phase {
        TransitionPhase::Rest => {
            if let Some(r) = find_from_state(machine, record.current_state, params, end_reached, None)
            {
                consume_triggers(machine.transition(record.current_state, r), params);
                record.phase = TransitionPhase::Transitioning {
                    transition: r,
                    next_time: 0.0,
                    progress: 0.0,
                };
                debug!(
                    "machine {} firing transition {:?} from state {}",
                    machine_index.0, r, record.current_state.0
                );
                outputs.push_event(CoreEvent::TransitionStarted {
                    machine: machine_index,
                    transition: r,
                });
            }
        }
        TransitionPhase::Transitioning {
            transition,
            next_time,
            ..
        } => {
            let in_flight = machine.transition(record.current_state, transition);
            let target_index = in_flight.target;
            // Which sets may interrupt is declared by the transition being
            // interrupted. Candidates from the current state keep the usual
            // per-state-then-any-state order; the in-flight transition
            // itself is excluded.
            let fired = match in_flight.interrupt_source {
                InterruptSource::None => None,
                InterruptSource::CurrentState => find_from_state(
                    machine,
                    record.current_state,
                    params,
                    end_reached,
                    Some(transition),
                )
                .map(|r| (r, false)),
                InterruptSource::NextState => find_in(
                    &machine.state(target_index).transitions,
                    false,
                    params,
                    next_end_reached,
                    None,
                )
                .map(|r| (r, true)),
                InterruptSource::CurrentOrNextState => find_from_state(
                    machine,
                    record.current_state,
                    params,
                    end_reached,
                    Some(transition),
                )
                .map(|r| (r, false))
                .or_else(|| {
                    find_in(
                        &machine.state(target_index).transitions,
                        false,
                        params,
                        next_end_reached,
                        None,
                    )
                    .map(|r| (r, true))
                }),
            };
            if let Some((r, from_next)) = fired {
                if from_next {
                    // The new transition's source is the state being blended
                    // to: promote it to current, carrying its time.
                    record.current_state = target_index;
                    record.current_time = next_time;
                }
                consume_triggers(machine.transition(record.current_state, r), params);
                record.phase = TransitionPhase::Transitioning {
                    transition: r,
                    next_time: 0.0,
                    progress: 0.0,
                };
                report.interrupted = true;
                debug!(
                    "machine {} transition {:?} interrupted by {:?}",
                    machine_index.0, transition, r
                );
                outputs.push_event(CoreEvent::TransitionInterrupted {
                    machine: machine_index,
                    interrupted: transition,
                    by: r,
                });
            }
        }
    }

    // 3) Sample emission.
    let samples = match record.phase {
        TransitionPhase::Rest => {
            let state = machine.state(record.current_state);
            MachineSamples::single(PoseSample {
                state: record.current_state,
                clip: state.motion.clip,
                normalized_time: record.current_time,
                weight: 1.0,
            })
        }
        TransitionPhase::Transitioning {
            transition,
            next_time,
            progress,
        } => {
            let in_flight = machine.transition(record.current_state, transition);
            let current = machine.state(record.current_state);
            let target = machine.state(in_flight.target);
            MachineSamples::pair(
                PoseSample {
                    state: record.current_state,
                    clip: current.motion.clip,
                    normalized_time: record.current_time,
                    weight: 1.0 - progress,
                },
                PoseSample {
                    state: in_flight.target,
                    clip: target.motion.clip,
                    normalized_time: next_time,
                    weight: progress,
                },
            )
        }
    };
    (samples, report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loop_time_wraps_and_reports_the_wrap() {
        let (t, wrapped) = advance_time(0.75, 0.5, TimePolicy::Loop);
        assert!((t - 0.25).abs() < 1e-6);
        assert!(wrapped);
        let (t, wrapped) = advance_time(0.25, 0.5, TimePolicy::Loop);
        assert!((t - 0.75).abs() < 1e-6);
        assert!(!wrapped);
    }

    #[test]
    fn loop_time_wraps_backward() {
        let (t, wrapped) = advance_time(0.25, -0.5, TimePolicy::Loop);
        assert!((t - 0.75).abs() < 1e-6);
        assert!(wrapped);
    }

    #[test]
    fn clamp_time_pins_at_one() {
        let (t, reached) = advance_time(0.9, 0.5, TimePolicy::Clamp);
        assert_eq!(t, 1.0);
        assert!(reached);
        let (t, reached) = advance_time(1.0, 0.5, TimePolicy::Clamp);
        assert_eq!(t, 1.0);
        assert!(reached);
        let (_, reached) = advance_time(0.1, 0.2, TimePolicy::Clamp);
        assert!(!reached);
    }
}
