//! Layer weight table and per-tick composition plan.
//!
//! Weights exist only for layers beyond the base; a single-layer graph
//! carries no table at all and the base layer is always full weight. The
//! composition plan walks layers in declaration order and reuses one stepped
//! result per state machine, which is what keeps sync layers identical.

use serde::{Deserialize, Serialize};

use crate::graph::{ControllerGraph, Layer};
use crate::handles::LayerIndex;
use crate::outputs::{LayerOutput, MachineSamples, Outputs};

/// Blend weights for each layer beyond the implicit base layer, index-aligned
/// with the graph's layer list. Mutated by the host, read at composition.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerWeights {
    weights: Vec<f32>,
}

impl LayerWeights {
    /// Seed the table from the layers' declared default weights. Empty when
    /// the graph has a single layer.
    pub fn new(layers: &[Layer]) -> Self {
        Self {
            weights: layers.iter().skip(1).map(|l| l.default_weight).collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Effective weight of a layer. The base layer is implicitly 1.0.
    #[inline]
    pub fn weight_of(&self, layer: LayerIndex) -> f32 {
        if layer.0 == 0 {
            1.0
        } else {
            self.weights[layer.0 as usize - 1]
        }
    }

    /// Set a non-base layer's weight. Writes to the base layer are ignored;
    /// it is not part of the table.
    #[inline]
    pub fn set(&mut self, layer: LayerIndex, weight: f32) {
        if layer.0 > 0 {
            self.weights[layer.0 as usize - 1] = weight;
        }
    }
}

/// Emit one `LayerOutput` per layer in declaration order, reusing the single
/// stepped result of each state machine. `machine_samples` is indexed by
/// state-machine index; entries for machines no layer references stay None.
pub(crate) fn compose_layers(
    graph: &ControllerGraph,
    weights: &LayerWeights,
    machine_samples: &[Option<MachineSamples>],
    outputs: &mut Outputs,
) {
    for (i, layer) in graph.layers.iter().enumerate() {
        let index = LayerIndex(i as u16);
        if let Some(samples) = machine_samples[layer.state_machine.0 as usize] {
            outputs.push_layer(LayerOutput {
                layer: index,
                weight: weights.weight_of(index),
                blending: layer.blending,
                bone_mask: layer.bone_mask,
                samples,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Layer, LayerBlending};
    use crate::handles::StateMachineIndex;

    #[test]
    fn single_layer_graph_has_no_table() {
        let layers = vec![Layer::new(
            "Base",
            StateMachineIndex(0),
            LayerBlending::Override,
        )];
        let weights = LayerWeights::new(&layers);
        assert!(weights.is_empty());
        assert_eq!(weights.weight_of(LayerIndex(0)), 1.0);
    }

    #[test]
    fn base_layer_weight_is_implicit() {
        let layers = vec![
            Layer::new("Base", StateMachineIndex(0), LayerBlending::Override),
            Layer::new("Upper", StateMachineIndex(1), LayerBlending::Additive)
                .with_default_weight(0.25),
        ];
        let mut weights = LayerWeights::new(&layers);
        assert_eq!(weights.len(), 1);
        assert_eq!(weights.weight_of(LayerIndex(1)), 0.25);
        weights.set(LayerIndex(1), 0.75);
        assert_eq!(weights.weight_of(LayerIndex(1)), 0.75);
        // Base writes are dropped, reads stay 1.0.
        weights.set(LayerIndex(0), 0.0);
        assert_eq!(weights.weight_of(LayerIndex(0)), 1.0);
    }
}
