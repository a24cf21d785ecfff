use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::PhysicsError;

/// Simulation parameters, fixed for the lifetime of a world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Constant linear acceleration applied to every dynamic body.
    pub gravity: Vec3,
    /// Seconds advanced by one `step()`.
    pub time_step: f32,
    /// Upper bound on detect/resolve passes per step.
    pub solver_iterations: u32,
    /// Fraction of the overlap depth removed per resolve pass, in (0, 1].
    pub position_correction: f32,
    /// Residual penetration under which a touching body counts as resting.
    pub resting_tolerance: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            time_step: 1.0 / 60.0,
            solver_iterations: 8,
            position_correction: 1.0,
            resting_tolerance: 1e-3,
        }
    }
}

impl WorldConfig {
    pub fn with_gravity(gravity: Vec3) -> Self {
        Self {
            gravity,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), PhysicsError> {
        if !self.gravity.is_finite() {
            return Err(PhysicsError::InvalidConfig(format!(
                "gravity must be finite, got {}",
                self.gravity
            )));
        }
        if !(self.time_step.is_finite() && self.time_step > 0.0) {
            return Err(PhysicsError::InvalidConfig(format!(
                "time_step must be positive, got {}",
                self.time_step
            )));
        }
        if self.solver_iterations == 0 {
            return Err(PhysicsError::InvalidConfig(
                "solver_iterations must be at least 1".into(),
            ));
        }
        if !(self.position_correction > 0.0 && self.position_correction <= 1.0) {
            return Err(PhysicsError::InvalidConfig(format!(
                "position_correction must be in (0, 1], got {}",
                self.position_correction
            )));
        }
        if !(self.resting_tolerance.is_finite() && self.resting_tolerance >= 0.0) {
            return Err(PhysicsError::InvalidConfig(format!(
                "resting_tolerance must be non-negative, got {}",
                self.resting_tolerance
            )));
        }
        Ok(())
    }
}
