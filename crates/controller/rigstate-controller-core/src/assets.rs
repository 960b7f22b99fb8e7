//! Companion blob assets referenced by the controller facade.
//!
//! The evaluator never interprets clip or mask contents; it only needs clip
//! durations at bake time and hands mask indices through to the external
//! pose sampler. These types exist at the interface boundary so the facade
//! can bundle all three blobs the way the original component does.

use serde::{Deserialize, Serialize};

use crate::handles::{BoneMaskIndex, ClipIndex};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClipInfo {
    pub name: String,
    pub duration_seconds: f32,
}

/// The skeleton clip set blob: one entry per sampled clip.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClipSet {
    pub clips: Vec<ClipInfo>,
}

impl ClipSet {
    #[inline]
    pub fn clip(&self, index: ClipIndex) -> &ClipInfo {
        &self.clips[index.0 as usize]
    }

    pub fn clip_index(&self, name: &str) -> Option<ClipIndex> {
        self.clips
            .iter()
            .position(|c| c.name == name)
            .map(|i| ClipIndex(i as u16))
    }
}

/// Per-bone weights for masked layer composition. Opaque to this core.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoneMask {
    pub name: String,
    pub weights: Vec<f32>,
}

/// The bone mask set blob.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoneMaskSet {
    pub masks: Vec<BoneMask>,
}

impl BoneMaskSet {
    #[inline]
    pub fn mask(&self, index: BoneMaskIndex) -> &BoneMask {
        &self.masks[index.0 as usize]
    }

    pub fn mask_index(&self, name: &str) -> Option<BoneMaskIndex> {
        self.masks
            .iter()
            .position(|m| m.name == name)
            .map(|i| BoneMaskIndex(i as u16))
    }
}
