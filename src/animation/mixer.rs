use std::sync::Arc;

use glam::{Quat, Vec3};
use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

use crate::animation::action::{AnimationAction, TrackValue};
use crate::animation::binding::{PoseTarget, PropertyBinding, TargetPath};
use crate::animation::clip::AnimationClip;
use crate::animation::values::MorphWeightData;

new_key_type! {
    /// Handle to an action owned by an [`AnimationMixer`].
    pub struct ActionKey;
}

/// Blend accumulator for one node/property pair.
#[derive(Debug, Clone)]
struct PoseSlot {
    node_name: String,
    target: TargetPath,
    weight: f32,
    value: SlotValue,
}

#[derive(Debug, Clone)]
enum SlotValue {
    Empty,
    Vector3(Vec3),
    Quaternion(Quat),
    Morph(MorphWeightData),
}

impl PoseSlot {
    fn reset(&mut self) {
        self.weight = 0.0;
        self.value = SlotValue::Empty;
    }

    /// Vectors and morph weights are summed and normalized on write;
    /// rotations are slerped incrementally so the result stays unit length.
    fn accumulate(&mut self, value: TrackValue, weight: f32) {
        let total = self.weight + weight;
        let merged = match (std::mem::replace(&mut self.value, SlotValue::Empty), value) {
            (SlotValue::Empty, TrackValue::Vector3(v)) => SlotValue::Vector3(v * weight),
            (SlotValue::Empty, TrackValue::Quaternion(q)) => SlotValue::Quaternion(q),
            (SlotValue::Empty, TrackValue::MorphWeight(mut m)) => {
                m.weights.iter_mut().for_each(|w| *w *= weight);
                SlotValue::Morph(m)
            }
            (SlotValue::Empty, TrackValue::Scalar(s)) => {
                SlotValue::Morph(MorphWeightData::from_slice(&[s * weight]))
            }
            (SlotValue::Vector3(acc), TrackValue::Vector3(v)) => SlotValue::Vector3(acc + v * weight),
            (SlotValue::Quaternion(acc), TrackValue::Quaternion(q)) => {
                let mix = if total > 0.0 { weight / total } else { 0.0 };
                SlotValue::Quaternion(acc.slerp(q, mix))
            }
            (SlotValue::Morph(mut acc), TrackValue::MorphWeight(m)) => {
                if acc.weights.len() < m.weights.len() {
                    acc.weights.resize(m.weights.len(), 0.0);
                }
                for (a, w) in acc.weights.iter_mut().zip(m.weights.iter()) {
                    *a += w * weight;
                }
                SlotValue::Morph(acc)
            }
            (SlotValue::Morph(mut acc), TrackValue::Scalar(s)) => {
                if let Some(first) = acc.weights.first_mut() {
                    *first += s * weight;
                }
                SlotValue::Morph(acc)
            }
            (previous, _) => {
                // mismatched track type for this slot
                self.value = previous;
                return;
            }
        };
        self.value = merged;
        self.weight = total;
    }

    fn write(&self, target: &mut dyn PoseTarget) {
        if self.weight <= 0.0 {
            return;
        }
        let inv = 1.0 / self.weight;
        match (&self.value, self.target) {
            (SlotValue::Vector3(v), TargetPath::Translation) => {
                target.set_translation(&self.node_name, *v * inv);
            }
            (SlotValue::Vector3(v), TargetPath::Scale) => {
                target.set_scale(&self.node_name, *v * inv);
            }
            (SlotValue::Quaternion(q), TargetPath::Rotation) => {
                target.set_rotation(&self.node_name, q.normalize());
            }
            (SlotValue::Morph(m), TargetPath::Weights) => {
                let weights: SmallVec<[f32; 8]> = m.weights.iter().map(|w| w * inv).collect();
                target.set_morph_weights(&self.node_name, &weights);
            }
            _ => {}
        }
    }
}

/// Owns a set of actions sharing one timeline and blends them into a pose.
///
/// Mixer time only moves forward; fades and warps are scheduled against it
/// so that actions fading in and out together stay synchronized.
pub struct AnimationMixer {
    actions: SlotMap<ActionKey, AnimationAction>,
    slots: Vec<PoseSlot>,
    slot_lookup: FxHashMap<(String, TargetPath), usize>,
    time: f32,
}

impl Default for AnimationMixer {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationMixer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            actions: SlotMap::with_key(),
            slots: Vec::new(),
            slot_lookup: FxHashMap::default(),
            time: 0.0,
        }
    }

    /// Wraps `clip` into a new action, binding each track to a pose slot.
    /// The action starts stopped; call `play` on it.
    pub fn clip_action(&mut self, clip: Arc<AnimationClip>) -> ActionKey {
        let bindings = clip
            .tracks
            .iter()
            .enumerate()
            .filter(|(_, track)| track.data.is_sampleable())
            .map(|(track_index, track)| PropertyBinding {
                track_index,
                slot_index: self.slot_for(&track.meta.node_name, track.meta.target),
                target: track.meta.target,
            })
            .collect();

        let mut action = AnimationAction::new(clip);
        action.bindings = bindings;
        action.stop();
        self.actions.insert(action)
    }

    fn slot_for(&mut self, node_name: &str, target: TargetPath) -> usize {
        if let Some(&index) = self.slot_lookup.get(&(node_name.to_string(), target)) {
            return index;
        }
        let index = self.slots.len();
        self.slots.push(PoseSlot {
            node_name: node_name.to_string(),
            target,
            weight: 0.0,
            value: SlotValue::Empty,
        });
        self.slot_lookup.insert((node_name.to_string(), target), index);
        index
    }

    #[must_use]
    pub fn action(&self, key: ActionKey) -> Option<&AnimationAction> {
        self.actions.get(key)
    }

    pub fn action_mut(&mut self, key: ActionKey) -> Option<&mut AnimationAction> {
        self.actions.get_mut(key)
    }

    pub fn actions(&self) -> impl Iterator<Item = (ActionKey, &AnimationAction)> {
        self.actions.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Global mixer time in seconds.
    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Linear crossfade from `from` to `to` over `duration` seconds.
    ///
    /// `from` ramps 1 -> 0 and `to` ramps 0 -> 1 on the same mixer clock.
    /// With `warp`, the two time scales are ramped toward each other's
    /// clip length ratio so both timelines cover the fade in step.
    pub fn cross_fade(&mut self, from: ActionKey, to: ActionKey, duration: f32, warp: bool) {
        if from == to {
            return;
        }
        let now = self.time;
        let (Some(from_duration), Some(to_duration)) = (
            self.actions.get(from).map(AnimationAction::duration),
            self.actions.get(to).map(AnimationAction::duration),
        ) else {
            return;
        };

        if let Some(out) = self.actions.get_mut(from) {
            out.schedule_fade(now, duration, 1.0, 0.0);
            if warp && to_duration > 0.0 {
                out.schedule_warp(now, 1.0, from_duration / to_duration, duration);
            }
        }
        if let Some(incoming) = self.actions.get_mut(to) {
            incoming.schedule_fade(now, duration, 0.0, 1.0);
            if warp && from_duration > 0.0 {
                incoming.schedule_warp(now, to_duration / from_duration, 1.0, duration);
            }
        }
    }

    /// Advances mixer time and every enabled action by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        self.time += dt;
        let now = self.time;
        for (_, action) in &mut self.actions {
            action.advance(now, dt);
        }
    }

    /// Samples every contributing action and writes the blended pose.
    pub fn write_pose(&mut self, target: &mut dyn PoseTarget) {
        for slot in &mut self.slots {
            slot.reset();
        }

        for (_, action) in &mut self.actions {
            let weight = action.effective_weight();
            if !action.is_running() || weight <= 0.0 {
                continue;
            }
            for i in 0..action.bindings.len() {
                let binding = action.bindings[i];
                if let Some(value) = action.sample_track(binding.track_index) {
                    self.slots[binding.slot_index].accumulate(value, weight);
                }
            }
        }

        for slot in &self.slots {
            slot.write(target);
        }
    }
}
