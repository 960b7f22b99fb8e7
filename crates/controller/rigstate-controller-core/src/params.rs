//! Per-instance parameter bank.
//!
//! One tagged value per declared parameter, index-aligned with the graph's
//! parameter table. The original layout overlays all four tags on a single
//! numeric slot; here the overlay becomes a tagged enum and the typed
//! accessors coerce across tags deterministically instead of reinterpreting
//! raw bits. Callers are still expected to use the tag matching the declared
//! parameter kind; coercion keeps a mismatch deterministic, not correct.

use serde::{Deserialize, Serialize};

use crate::graph::ParameterSpec;
use crate::handles::ParameterIndex;

/// A single animator parameter value.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ParameterValue {
    Float(f32),
    Int(i32),
    Bool(bool),
    /// One-shot pulse: set by a collaborator, consumed by at most one firing
    /// transition, swept at the end of the tick's condition evaluation.
    Trigger(bool),
}

impl Default for ParameterValue {
    fn default() -> Self {
        ParameterValue::Float(0.0)
    }
}

/// Ordered parameter storage for one controller instance.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ParameterBank {
    values: Vec<ParameterValue>,
}

impl ParameterBank {
    /// Build a bank from the graph's parameter table, seeded with defaults.
    pub fn new(specs: &[ParameterSpec]) -> Self {
        Self {
            values: specs.iter().map(|s| s.default).collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn get_float(&self, index: ParameterIndex) -> f32 {
        match self.values[index.0 as usize] {
            ParameterValue::Float(f) => f,
            ParameterValue::Int(i) => i as f32,
            ParameterValue::Bool(b) | ParameterValue::Trigger(b) => {
                if b {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    #[inline]
    pub fn get_int(&self, index: ParameterIndex) -> i32 {
        match self.values[index.0 as usize] {
            ParameterValue::Int(i) => i,
            ParameterValue::Float(f) => f as i32,
            ParameterValue::Bool(b) | ParameterValue::Trigger(b) => i32::from(b),
        }
    }

    #[inline]
    pub fn get_bool(&self, index: ParameterIndex) -> bool {
        match self.values[index.0 as usize] {
            ParameterValue::Bool(b) | ParameterValue::Trigger(b) => b,
            ParameterValue::Float(f) => f != 0.0,
            ParameterValue::Int(i) => i != 0,
        }
    }

    #[inline]
    pub fn set_float(&mut self, index: ParameterIndex, value: f32) {
        self.values[index.0 as usize] = ParameterValue::Float(value);
    }

    #[inline]
    pub fn set_int(&mut self, index: ParameterIndex, value: i32) {
        self.values[index.0 as usize] = ParameterValue::Int(value);
    }

    #[inline]
    pub fn set_bool(&mut self, index: ParameterIndex, value: bool) {
        self.values[index.0 as usize] = ParameterValue::Bool(value);
    }

    /// Mark a trigger pulse pending for the next tick's condition evaluation.
    #[inline]
    pub fn set_trigger(&mut self, index: ParameterIndex) {
        self.values[index.0 as usize] = ParameterValue::Trigger(true);
    }

    /// Manually clear a pending pulse without consuming it.
    #[inline]
    pub fn reset_trigger(&mut self, index: ParameterIndex) {
        self.values[index.0 as usize] = ParameterValue::Trigger(false);
    }

    #[inline]
    pub fn trigger_is_set(&self, index: ParameterIndex) -> bool {
        matches!(self.values[index.0 as usize], ParameterValue::Trigger(true))
    }

    /// Clear a pulse and report whether it was set. Called by the evaluator
    /// when a transition fires on a trigger condition.
    #[inline]
    pub fn consume_trigger(&mut self, index: ParameterIndex) -> bool {
        let slot = &mut self.values[index.0 as usize];
        match slot {
            ParameterValue::Trigger(set) => {
                let was = *set;
                *set = false;
                was
            }
            _ => false,
        }
    }

    /// End-of-tick sweep: any pulse not consumed by a firing transition reads
    /// false on the next tick unless re-set.
    pub fn clear_triggers(&mut self) {
        for value in &mut self.values {
            if let ParameterValue::Trigger(set) = value {
                *set = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ParameterSpec;

    fn bank() -> ParameterBank {
        ParameterBank::new(&[
            ParameterSpec::float("speed", 0.5),
            ParameterSpec::int("weapon", 2),
            ParameterSpec::bool("grounded", true),
            ParameterSpec::trigger("jump"),
        ])
    }

    #[test]
    fn defaults_come_from_specs() {
        let bank = bank();
        assert_eq!(bank.get_float(ParameterIndex(0)), 0.5);
        assert_eq!(bank.get_int(ParameterIndex(1)), 2);
        assert!(bank.get_bool(ParameterIndex(2)));
        assert!(!bank.trigger_is_set(ParameterIndex(3)));
    }

    #[test]
    fn accessors_coerce_across_tags() {
        let bank = bank();
        assert_eq!(bank.get_int(ParameterIndex(0)), 0);
        assert_eq!(bank.get_float(ParameterIndex(1)), 2.0);
        assert_eq!(bank.get_float(ParameterIndex(2)), 1.0);
        assert!(bank.get_bool(ParameterIndex(1)));
    }

    #[test]
    fn trigger_pulse_consume_and_sweep() {
        let mut bank = bank();
        let jump = ParameterIndex(3);
        bank.set_trigger(jump);
        assert!(bank.trigger_is_set(jump));
        assert!(bank.consume_trigger(jump));
        assert!(!bank.trigger_is_set(jump));
        assert!(!bank.consume_trigger(jump));

        bank.set_trigger(jump);
        bank.clear_triggers();
        assert!(!bank.trigger_is_set(jump));
    }
}
