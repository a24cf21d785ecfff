use glam::{Quat, Vec3};
use groundfall_common::{ColliderHandle, Pose};
use serde::{Deserialize, Serialize};

use crate::error::PhysicsError;

/// Whether a body takes part in integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyKind {
    /// Immovable scenery: infinite mass, zero velocity.
    Fixed,
    /// Subject to gravity, integration, and contact response.
    Dynamic,
}

/// Per-step classification of a dynamic body. Computed by `World::step`, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionState {
    FreeFalling,
    Resting,
}

/// Construction parameters for a rigid body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    pub kind: BodyKind,
    pub pose: Pose,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    /// Ignored for fixed bodies.
    pub mass: f32,
}

impl BodyDesc {
    pub fn fixed() -> Self {
        Self {
            kind: BodyKind::Fixed,
            pose: Pose::default(),
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            mass: f32::INFINITY,
        }
    }

    /// A dynamic body of unit mass at the origin.
    pub fn dynamic() -> Self {
        Self {
            kind: BodyKind::Dynamic,
            mass: 1.0,
            ..Self::fixed()
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.pose.position = position;
        self
    }

    pub fn with_orientation(mut self, orientation: Quat) -> Self {
        self.pose.orientation = orientation;
        self
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_linear_velocity(mut self, velocity: Vec3) -> Self {
        self.linear_velocity = velocity;
        self
    }

    pub fn with_angular_velocity(mut self, velocity: Vec3) -> Self {
        self.angular_velocity = velocity;
        self
    }
}

/// Physical state of one body.
#[derive(Debug, Clone, PartialEq)]
pub struct RigidBody {
    kind: BodyKind,
    pose: Pose,
    linear_velocity: Vec3,
    angular_velocity: Vec3,
    mass: f32,
    pub(crate) colliders: Vec<ColliderHandle>,
}

impl RigidBody {
    /// Validate a descriptor and build the body it describes.
    pub(crate) fn from_desc(desc: &BodyDesc) -> Result<Self, PhysicsError> {
        if !desc.pose.is_finite() || desc.pose.orientation.length_squared() <= f32::EPSILON {
            return Err(PhysicsError::InvalidPose);
        }
        let pose = Pose::new(desc.pose.position, desc.pose.orientation.normalize());
        match desc.kind {
            BodyKind::Fixed => Ok(Self {
                kind: BodyKind::Fixed,
                pose,
                linear_velocity: Vec3::ZERO,
                angular_velocity: Vec3::ZERO,
                mass: f32::INFINITY,
                colliders: Vec::new(),
            }),
            BodyKind::Dynamic => {
                if !(desc.mass.is_finite() && desc.mass > 0.0) {
                    return Err(PhysicsError::InvalidMass(desc.mass));
                }
                if !(desc.linear_velocity.is_finite() && desc.angular_velocity.is_finite()) {
                    return Err(PhysicsError::InvalidPose);
                }
                Ok(Self {
                    kind: BodyKind::Dynamic,
                    pose,
                    linear_velocity: desc.linear_velocity,
                    angular_velocity: desc.angular_velocity,
                    mass: desc.mass,
                    colliders: Vec::new(),
                })
            }
        }
    }

    pub fn kind(&self) -> BodyKind {
        self.kind
    }

    pub fn is_dynamic(&self) -> bool {
        self.kind == BodyKind::Dynamic
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn position(&self) -> Vec3 {
        self.pose.position
    }

    pub fn orientation(&self) -> Quat {
        self.pose.orientation
    }

    pub fn linear_velocity(&self) -> Vec3 {
        self.linear_velocity
    }

    pub fn angular_velocity(&self) -> Vec3 {
        self.angular_velocity
    }

    /// Infinite for fixed bodies.
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Zero for fixed bodies, so they absorb any contact correction.
    pub fn inv_mass(&self) -> f32 {
        match self.kind {
            BodyKind::Fixed => 0.0,
            BodyKind::Dynamic => self.mass.recip(),
        }
    }

    pub fn colliders(&self) -> &[ColliderHandle] {
        &self.colliders
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.pose.is_finite() && self.linear_velocity.is_finite() && self.angular_velocity.is_finite()
    }

    /// Semi-implicit Euler: velocity from gravity first, then pose from the new velocity.
    pub(crate) fn integrate(&mut self, gravity: Vec3, dt: f32) {
        if !self.is_dynamic() {
            return;
        }
        self.linear_velocity += gravity * dt;
        self.pose.position += self.linear_velocity * dt;
        if self.angular_velocity != Vec3::ZERO {
            let spin = Quat::from_scaled_axis(self.angular_velocity * dt);
            self.pose.orientation = (spin * self.pose.orientation).normalize();
        }
    }

    pub(crate) fn translate(&mut self, delta: Vec3) {
        if self.is_dynamic() {
            self.pose.position += delta;
        }
    }

    pub(crate) fn add_velocity(&mut self, delta: Vec3) {
        if self.is_dynamic() {
            self.linear_velocity += delta;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dynamic_body_requires_positive_mass() {
        let err = RigidBody::from_desc(&BodyDesc::dynamic().with_mass(0.0)).unwrap_err();
        assert_eq!(err, PhysicsError::InvalidMass(0.0));
        assert!(RigidBody::from_desc(&BodyDesc::dynamic().with_mass(-2.0)).is_err());
        assert!(RigidBody::from_desc(&BodyDesc::dynamic().with_mass(f32::NAN)).is_err());
    }

    #[test]
    fn fixed_body_ignores_mass_and_velocity() {
        let desc = BodyDesc::fixed()
            .with_mass(-1.0)
            .with_linear_velocity(Vec3::X);
        let body = RigidBody::from_desc(&desc).unwrap();
        assert_eq!(body.linear_velocity(), Vec3::ZERO);
        assert_eq!(body.inv_mass(), 0.0);
        assert!(body.mass().is_infinite());
    }

    #[test]
    fn orientation_is_normalized_on_creation() {
        let desc = BodyDesc::dynamic().with_orientation(Quat::from_xyzw(0.0, 2.0, 0.0, 2.0));
        let body = RigidBody::from_desc(&desc).unwrap();
        assert!((body.orientation().length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn zero_orientation_rejected() {
        let desc = BodyDesc::dynamic().with_orientation(Quat::from_xyzw(0.0, 0.0, 0.0, 0.0));
        assert_eq!(
            RigidBody::from_desc(&desc).unwrap_err(),
            PhysicsError::InvalidPose
        );
    }

    #[test]
    fn integration_updates_velocity_before_position() {
        let mut body = RigidBody::from_desc(&BodyDesc::dynamic()).unwrap();
        body.integrate(Vec3::new(0.0, -10.0, 0.0), 0.1);
        // v = -1.0, then x = v * dt = -0.1 (explicit Euler would leave x at 0)
        assert!((body.linear_velocity().y + 1.0).abs() < 1e-6);
        assert!((body.position().y + 0.1).abs() < 1e-6);
    }

    #[test]
    fn spinning_body_keeps_unit_orientation() {
        let desc = BodyDesc::dynamic().with_angular_velocity(Vec3::new(3.0, 7.0, -2.0));
        let mut body = RigidBody::from_desc(&desc).unwrap();
        for _ in 0..10_000 {
            body.integrate(Vec3::ZERO, 1.0 / 60.0);
        }
        assert!((body.orientation().length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn fixed_body_does_not_integrate() {
        let mut body = RigidBody::from_desc(&BodyDesc::fixed().with_position(Vec3::Y)).unwrap();
        let before = body.pose();
        body.integrate(Vec3::new(0.0, -9.81, 0.0), 1.0);
        body.translate(Vec3::ONE);
        body.add_velocity(Vec3::ONE);
        assert_eq!(body.pose(), before);
        assert_eq!(body.linear_velocity(), Vec3::ZERO);
    }
}
