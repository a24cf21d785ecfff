use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

slotmap::new_key_type! {
    /// Stable handle to a rigid body owned by a world.
    pub struct BodyHandle;

    /// Stable handle to a collider owned by a world.
    pub struct ColliderHandle;
}

/// Rigid placement in world space: position plus unit orientation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
        }
    }
}

impl Pose {
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// A pose at `position` with identity orientation.
    pub fn from_translation(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Map a point from this pose's local frame into world space.
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.orientation * local
    }

    /// Map a world-space point into this pose's local frame.
    pub fn inverse_transform_point(&self, world: Vec3) -> Vec3 {
        self.orientation.inverse() * (world - self.position)
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.orientation.is_finite()
    }
}
