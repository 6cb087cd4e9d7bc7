use std::sync::Arc;

use glam::{Affine3A, Vec2, Vec3};

use crate::config::PanelTarget;
use crate::panels::texture_cache::LabelTexture;
use crate::scene::{Ray, Transform};

/// A camera-facing quad carrying a label.
#[derive(Debug, Clone)]
pub struct Billboard {
    pub transform: Transform,
    pub visible: bool,
    pub texture: Arc<LabelTexture>,
    /// Unscaled half width / half height of the quad.
    half_extents: Vec2,
}

impl Billboard {
    #[must_use]
    pub fn new(texture: Arc<LabelTexture>, size: Vec2) -> Self {
        Self {
            transform: Transform::new(),
            visible: true,
            texture,
            half_extents: size * 0.5,
        }
    }

    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    /// Uniform panel scale (the quad is scaled in X and Y only).
    #[must_use]
    pub fn scale(&self) -> f32 {
        self.transform.scale.x
    }

    pub fn place(&mut self, position: Vec3, scale: f32) {
        self.transform.position = position;
        self.transform.scale = Vec3::new(scale, scale, 1.0);
        self.transform.update_local_matrix();
    }

    /// Turns the front face towards `target`.
    pub fn face(&mut self, target: Vec3) {
        self.transform.face_towards(target, Vec3::Y);
        self.transform.update_local_matrix();
    }

    #[must_use]
    pub fn matrix(&self) -> &Affine3A {
        self.transform.local_matrix()
    }

    /// World distance to the hit, if `ray` hits this billboard while visible.
    #[must_use]
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        if !self.visible {
            return None;
        }
        ray.intersect_quad(self.matrix(), self.half_extents)
    }
}

/// Top-level panel from the configured list.
#[derive(Debug, Clone)]
pub struct Panel {
    pub label: String,
    pub target: PanelTarget,
    pub billboard: Billboard,
}

/// Child of an open dropdown. Lives only while its parent's menu is open.
#[derive(Debug, Clone)]
pub struct DropdownPanel {
    pub label: String,
    pub action: String,
    /// Index of the owning panel.
    pub parent: usize,
    pub billboard: Billboard,
}

/// What a pick ray hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelHit {
    Panel(usize),
    Dropdown(usize),
}
