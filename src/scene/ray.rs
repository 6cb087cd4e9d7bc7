use glam::{Affine3A, Vec2, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length.
    pub direction: Vec3,
}

impl Ray {
    #[must_use]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Intersects a quad lying in the local XY plane of `world`, centred on
    /// the local origin with the given half extents. Both faces count.
    ///
    /// Returns the world-space distance from the ray origin to the hit.
    #[must_use]
    pub fn intersect_quad(&self, world: &Affine3A, half_extents: Vec2) -> Option<f32> {
        let det = world.matrix3.determinant();
        if det.abs() < 1e-12 {
            return None;
        }
        let inverse = world.inverse();
        let origin = inverse.transform_point3(self.origin);
        let direction = inverse.transform_vector3(self.direction);

        if direction.z.abs() < 1e-8 {
            return None;
        }
        let t = -origin.z / direction.z;
        if t < 0.0 {
            return None;
        }

        let local = origin + direction * t;
        if local.x.abs() > half_extents.x || local.y.abs() > half_extents.y {
            return None;
        }

        let hit = world.transform_point3(local);
        Some((hit - self.origin).length())
    }
}
