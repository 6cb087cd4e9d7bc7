use glam::{Affine3A, Quat, Vec3};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::animation::{AnimationClip, PoseTarget};
use crate::scene::Transform;

/// Axis-aligned bounding box. An empty box has `min > max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    #[must_use]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.cmpgt(self.max).any()
    }

    #[must_use]
    pub fn center(&self) -> Vec3 {
        if self.is_empty() {
            return Vec3::ZERO;
        }
        (self.min + self.max) * 0.5
    }

    #[must_use]
    pub fn size(&self) -> Vec3 {
        if self.is_empty() {
            return Vec3::ZERO;
        }
        self.max - self.min
    }

    pub fn expand_point(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    #[must_use]
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Bounds of this box after applying `matrix` to its eight corners.
    #[must_use]
    pub fn transformed(&self, matrix: &Affine3A) -> Aabb {
        if self.is_empty() {
            return *self;
        }
        let mut out = Aabb::EMPTY;
        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
            out.expand_point(matrix.transform_point3(corner));
        }
        out
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Shading model a renderable was authored with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaterialTag {
    /// Unlit; ignores lights and therefore shadows.
    Basic,
    Standard { roughness: f32, metalness: f32 },
}

impl MaterialTag {
    #[must_use]
    pub fn receives_light(&self) -> bool {
        !matches!(self, MaterialTag::Basic)
    }
}

/// Render-relevant facts about a mesh node, decided once at load time.
#[derive(Debug, Clone, PartialEq)]
pub struct Renderable {
    pub mesh_name: Option<String>,
    pub material: MaterialTag,
    pub morph_target_count: usize,
    /// Mesh bounds in node-local space.
    pub local_bounds: Aabb,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

#[derive(Debug, Clone)]
pub struct ModelNode {
    pub name: String,
    pub transform: Transform,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub morph_weights: SmallVec<[f32; 8]>,
    pub renderable: Option<Renderable>,
}

impl ModelNode {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::new(),
            parent: None,
            children: Vec::new(),
            morph_weights: SmallVec::new(),
            renderable: None,
        }
    }
}

/// Flattened node tree of a loaded model, addressable by node name.
#[derive(Debug, Clone, Default)]
pub struct ModelHierarchy {
    nodes: Vec<ModelNode>,
    roots: Vec<usize>,
    by_name: FxHashMap<String, usize>,
    /// Translation applied above the roots (used to recentre the model).
    pub root_offset: Vec3,
}

impl ModelHierarchy {
    /// Builds the hierarchy from nodes whose `parent`/`children` indices
    /// already refer into `nodes`. The first node of a given name wins
    /// name lookups.
    #[must_use]
    pub fn new(nodes: Vec<ModelNode>) -> Self {
        let roots = nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.parent.is_none())
            .map(|(i, _)| i)
            .collect();
        let mut by_name = FxHashMap::default();
        for (index, node) in nodes.iter().enumerate() {
            by_name.entry(node.name.clone()).or_insert(index);
        }
        let mut hierarchy = Self {
            nodes,
            roots,
            by_name,
            root_offset: Vec3::ZERO,
        };
        hierarchy.update_world_matrices();
        hierarchy
    }

    #[must_use]
    pub fn nodes(&self) -> &[ModelNode] {
        &self.nodes
    }

    #[must_use]
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    #[must_use]
    pub fn node(&self, name: &str) -> Option<&ModelNode> {
        self.nodes.get(*self.by_name.get(name)?)
    }

    pub fn node_mut(&mut self, name: &str) -> Option<&mut ModelNode> {
        let index = *self.by_name.get(name)?;
        self.nodes.get_mut(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Propagates local matrices down from the roots.
    pub fn update_world_matrices(&mut self) {
        let base = Affine3A::from_translation(self.root_offset);
        let mut stack: Vec<(usize, Affine3A)> = self.roots.iter().map(|&r| (r, base)).collect();
        while let Some((index, parent_world)) = stack.pop() {
            let Some(node) = self.nodes.get_mut(index) else {
                continue;
            };
            node.transform.update_local_matrix();
            let world = parent_world * *node.transform.local_matrix();
            node.transform.set_world_matrix(world);
            stack.extend(node.children.iter().map(|&c| (c, world)));
        }
    }

    /// World-space bounds of every renderable node.
    #[must_use]
    pub fn world_bounds(&self) -> Aabb {
        self.nodes
            .iter()
            .filter_map(|n| {
                let r = n.renderable.as_ref()?;
                Some(r.local_bounds.transformed(n.transform.world_matrix()))
            })
            .fold(Aabb::EMPTY, |acc, b| acc.union(&b))
    }

    /// Flags every renderable as shadow caster and receiver. Unlit materials
    /// are upgraded to a standard one so they take part in lighting.
    ///
    /// Returns how many materials were upgraded.
    pub fn prepare_shadows(&mut self) -> usize {
        let mut upgraded = 0;
        for node in &mut self.nodes {
            let Some(renderable) = node.renderable.as_mut() else {
                continue;
            };
            renderable.cast_shadow = true;
            renderable.receive_shadow = true;
            if renderable.material == MaterialTag::Basic {
                log::warn!(
                    "Unlit material on '{}' does not take shadows; upgrading to standard",
                    node.name
                );
                renderable.material = MaterialTag::Standard {
                    roughness: 0.7,
                    metalness: 0.0,
                };
                upgraded += 1;
            }
        }
        upgraded
    }
}

impl PoseTarget for ModelHierarchy {
    fn set_translation(&mut self, node_name: &str, value: Vec3) {
        if let Some(node) = self.node_mut(node_name) {
            node.transform.position = value;
        }
    }

    fn set_rotation(&mut self, node_name: &str, value: Quat) {
        if let Some(node) = self.node_mut(node_name) {
            node.transform.rotation = value;
        }
    }

    fn set_scale(&mut self, node_name: &str, value: Vec3) {
        if let Some(node) = self.node_mut(node_name) {
            node.transform.scale = value;
        }
    }

    fn set_morph_weights(&mut self, node_name: &str, weights: &[f32]) {
        if let Some(node) = self.node_mut(node_name) {
            node.morph_weights.clear();
            node.morph_weights.extend_from_slice(weights);
        }
    }
}

/// Camera placement and anchors derived from the model bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelFraming {
    /// Bounds as loaded, before recentring.
    pub center: Vec3,
    pub size: Vec3,
    /// Offset that moves the model centre to the origin.
    pub root_offset: Vec3,
    /// Anchor above the character's head that panels are laid out around.
    pub head_anchor: Vec3,
    pub camera_position: Vec3,
    pub camera_target: Vec3,
}

/// Everything a model load produces.
#[derive(Debug, Clone, Default)]
pub struct LoadedModel {
    pub hierarchy: ModelHierarchy,
    pub clips: Vec<AnimationClip>,
    pub bounds: Aabb,
}

impl LoadedModel {
    #[must_use]
    pub fn new(hierarchy: ModelHierarchy, clips: Vec<AnimationClip>) -> Self {
        let bounds = hierarchy.world_bounds();
        Self {
            hierarchy,
            clips,
            bounds,
        }
    }

    /// Recentres the model on the origin and computes the framing for a
    /// camera with vertical field of view `fov` (radians).
    pub fn frame(&mut self, fov: f32, head_clearance: f32) -> ModelFraming {
        let center = self.bounds.center();
        let size = self.bounds.size();
        let max_dim = size.max_element();
        let half_tan = (fov * 0.5).tan();
        let distance = if half_tan > 0.0 {
            (max_dim / half_tan).abs()
        } else {
            max_dim
        };

        self.hierarchy.root_offset = -center;
        self.hierarchy.update_world_matrices();

        ModelFraming {
            center,
            size,
            root_offset: -center,
            head_anchor: Vec3::new(0.0, size.y / 2.0 + head_clearance, 0.0),
            camera_position: Vec3::new(0.0, center.y, distance),
            camera_target: center,
        }
    }
}
