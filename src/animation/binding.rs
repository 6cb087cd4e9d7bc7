use glam::{Quat, Vec3};

/// Defines the target property for animation data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetPath {
    Translation, // Maps to transform.position
    Rotation,    // Maps to transform.rotation
    Scale,       // Maps to transform.scale
    Weights,     // Maps to Morph Target weights
}

/// Binding relationship: maps track `track_index` of an action's clip to
/// the mixer's pose slot `slot_index` (one slot per node/property pair).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyBinding {
    pub track_index: usize,
    pub slot_index: usize,
    pub target: TargetPath,
}

/// Receiver of blended animation output.
///
/// The mixer never owns the model. Whatever holds the node hierarchy
/// implements this and the director writes each frame's pose into it by
/// node name. Unknown names are ignored by implementors.
pub trait PoseTarget {
    fn set_translation(&mut self, node_name: &str, value: Vec3);
    fn set_rotation(&mut self, node_name: &str, value: Quat);
    fn set_scale(&mut self, node_name: &str, value: Vec3);
    fn set_morph_weights(&mut self, node_name: &str, weights: &[f32]);
}
