use glam::{Affine3A, Mat3, Quat, Vec3};

/// Position / rotation / scale of one node with a cached local matrix.
///
/// The local matrix is only recomputed when one of the public TRS fields
/// changed since the last call to [`Transform::update_local_matrix`].
#[derive(Debug, Clone)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,

    pub(crate) local_matrix: Affine3A,
    pub(crate) world_matrix: Affine3A,

    last_position: Vec3,
    last_rotation: Quat,
    last_scale: Vec3,
    force_update: bool,
}

impl Transform {
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,

            local_matrix: Affine3A::IDENTITY,
            world_matrix: Affine3A::IDENTITY,

            last_position: Vec3::ZERO,
            last_rotation: Quat::IDENTITY,
            last_scale: Vec3::ONE,
            force_update: true,
        }
    }

    #[must_use]
    pub fn from_trs(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
            ..Self::new()
        }
    }

    // ========================================================================
    // Matrix cache
    // ========================================================================

    /// Rebuilds the local matrix if any TRS field changed.
    /// Returns whether it did.
    pub fn update_local_matrix(&mut self) -> bool {
        let changed = self.position != self.last_position
            || self.rotation != self.last_rotation
            || self.scale != self.last_scale
            || self.force_update;

        if changed {
            self.local_matrix =
                Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.position);

            self.last_position = self.position;
            self.last_rotation = self.rotation;
            self.last_scale = self.scale;
            self.force_update = false;
        }

        changed
    }

    #[inline]
    #[must_use]
    pub fn local_matrix(&self) -> &Affine3A {
        &self.local_matrix
    }

    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.world_matrix
    }

    pub fn set_world_matrix(&mut self, mat: Affine3A) {
        self.world_matrix = mat;
    }

    // ========================================================================
    // Orientation helpers
    // ========================================================================

    /// Camera-style look-at: local -Z points at `target`.
    ///
    /// `target` and `up` are in the parent space. Degenerate input keeps
    /// the current rotation.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        if let Some(rotation) = basis_towards(target - self.position, up) {
            self.rotation = rotation * Quat::from_rotation_y(std::f32::consts::PI);
        }
    }

    /// Object-style look-at: local +Z points at `target`, so a quad in the
    /// XY plane shows its front face to whatever sits at `target`.
    pub fn face_towards(&mut self, target: Vec3, up: Vec3) {
        if let Some(rotation) = basis_towards(target - self.position, up) {
            self.rotation = rotation;
        }
    }
}

/// Rotation taking +Z to `forward` with +Y as close to `up` as possible.
fn basis_towards(forward: Vec3, up: Vec3) -> Option<Quat> {
    let forward = forward.try_normalize()?;
    let right = up.cross(forward);
    if right.length_squared() < 1e-8 {
        return None;
    }
    let right = right.normalize();
    let new_up = forward.cross(right);
    Some(Quat::from_mat3(&Mat3::from_cols(right, new_up, forward)))
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}
