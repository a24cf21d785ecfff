use glam::{Vec2, Vec3};
use groundfall_common::BodyHandle;
use serde::{Deserialize, Serialize};

use crate::error::PhysicsError;

/// Geometry of a collider, in the owning body's local frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Cuboid { half_extents: Vec3 },
    Heightfield(Heightfield),
}

impl Shape {
    pub fn cuboid(hx: f32, hy: f32, hz: f32) -> Self {
        Self::Cuboid {
            half_extents: Vec3::new(hx, hy, hz),
        }
    }

    /// Reject shapes that cannot take part in contact tests.
    pub fn validate(&self) -> Result<(), PhysicsError> {
        match self {
            Shape::Cuboid { half_extents } => {
                if !half_extents.is_finite() || half_extents.min_element() <= 0.0 {
                    return Err(PhysicsError::DegenerateShape(format!(
                        "cuboid half-extents must be positive, got {half_extents}"
                    )));
                }
                Ok(())
            }
            Shape::Heightfield(field) => field.validate(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Shape::Cuboid { .. } => "cuboid",
            Shape::Heightfield(_) => "heightfield",
        }
    }
}

/// Regular grid of heights, centered on its body's origin in the local XZ plane.
///
/// Heights are stored row-major: `heights[z * resolution_x + x]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawHeightfield")]
pub struct Heightfield {
    resolution_x: usize,
    resolution_z: usize,
    cell_size: Vec2,
    heights: Vec<f32>,
}

/// Unchecked wire form; deserialization goes through `Heightfield::new`.
#[derive(Deserialize)]
struct RawHeightfield {
    resolution_x: usize,
    resolution_z: usize,
    cell_size: Vec2,
    heights: Vec<f32>,
}

impl TryFrom<RawHeightfield> for Heightfield {
    type Error = PhysicsError;

    fn try_from(raw: RawHeightfield) -> Result<Self, Self::Error> {
        Self::new(raw.resolution_x, raw.resolution_z, raw.cell_size, raw.heights)
    }
}

impl Heightfield {
    pub fn new(
        resolution_x: usize,
        resolution_z: usize,
        cell_size: Vec2,
        heights: Vec<f32>,
    ) -> Result<Self, PhysicsError> {
        let field = Self {
            resolution_x,
            resolution_z,
            cell_size,
            heights,
        };
        field.validate()?;
        Ok(field)
    }

    /// A level grid at a constant height.
    pub fn flat(
        resolution_x: usize,
        resolution_z: usize,
        cell_size: Vec2,
        height: f32,
    ) -> Result<Self, PhysicsError> {
        let count = resolution_x.saturating_mul(resolution_z);
        Self::new(resolution_x, resolution_z, cell_size, vec![height; count])
    }

    fn validate(&self) -> Result<(), PhysicsError> {
        if self.resolution_x == 0 || self.resolution_z == 0 {
            return Err(PhysicsError::DegenerateShape(format!(
                "heightfield grid is {}x{}",
                self.resolution_x, self.resolution_z
            )));
        }
        if !self.cell_size.is_finite() || self.cell_size.min_element() <= 0.0 {
            return Err(PhysicsError::DegenerateShape(format!(
                "heightfield cell size must be positive, got {}",
                self.cell_size
            )));
        }
        let expected = self.resolution_x.checked_mul(self.resolution_z);
        if expected != Some(self.heights.len()) {
            return Err(PhysicsError::DegenerateShape(format!(
                "heightfield has {} samples for a {}x{} grid",
                self.heights.len(),
                self.resolution_x,
                self.resolution_z
            )));
        }
        if let Some(i) = self.heights.iter().position(|h| !h.is_finite()) {
            return Err(PhysicsError::DegenerateShape(format!(
                "heightfield sample {i} is not finite"
            )));
        }
        Ok(())
    }

    pub fn resolution_x(&self) -> usize {
        self.resolution_x
    }

    pub fn resolution_z(&self) -> usize {
        self.resolution_z
    }

    pub fn cell_size(&self) -> Vec2 {
        self.cell_size
    }

    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    /// Local-frame size along x and z.
    pub fn extent(&self) -> Vec2 {
        Vec2::new(
            (self.resolution_x - 1) as f32 * self.cell_size.x,
            (self.resolution_z - 1) as f32 * self.cell_size.y,
        )
    }

    /// Height at grid point (`x`, `z`).
    pub fn get(&self, x: usize, z: usize) -> Option<f32> {
        if x >= self.resolution_x || z >= self.resolution_z {
            return None;
        }
        self.heights.get(z * self.resolution_x + x).copied()
    }

    pub fn min_height(&self) -> f32 {
        self.heights.iter().copied().fold(f32::INFINITY, f32::min)
    }

    pub fn max_height(&self) -> f32 {
        self.heights.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }

    /// Bilinear height under local point (`x`, `z`), or `None` outside the grid.
    pub fn height_at(&self, x: f32, z: f32) -> Option<f32> {
        let half = self.extent() * 0.5;
        let gx = (x + half.x) / self.cell_size.x;
        let gz = (z + half.y) / self.cell_size.y;
        let max_x = (self.resolution_x - 1) as f32;
        let max_z = (self.resolution_z - 1) as f32;
        if !(0.0..=max_x).contains(&gx) || !(0.0..=max_z).contains(&gz) {
            return None;
        }

        let x0 = (gx.floor() as usize).min(self.resolution_x - 1);
        let z0 = (gz.floor() as usize).min(self.resolution_z - 1);
        let x1 = (x0 + 1).min(self.resolution_x - 1);
        let z1 = (z0 + 1).min(self.resolution_z - 1);
        let fx = gx - x0 as f32;
        let fz = gz - z0 as f32;

        let row0 = z0 * self.resolution_x;
        let row1 = z1 * self.resolution_x;
        let h00 = self.heights[row0 + x0];
        let h10 = self.heights[row0 + x1];
        let h01 = self.heights[row1 + x0];
        let h11 = self.heights[row1 + x1];

        let near = h00 + fx * (h10 - h00);
        let far = h01 + fx * (h11 - h01);
        Some(near + fz * (far - near))
    }
}

/// A shape bound to exactly one body.
#[derive(Debug, Clone, PartialEq)]
pub struct Collider {
    pub(crate) shape: Shape,
    pub(crate) body: BodyHandle,
}

impl Collider {
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// The owning body.
    pub fn body(&self) -> BodyHandle {
        self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> Heightfield {
        // 3x2 grid, heights rise along x: 0, 1, 2
        Heightfield::new(3, 2, Vec2::ONE, vec![0.0, 1.0, 2.0, 0.0, 1.0, 2.0]).unwrap()
    }

    #[test]
    fn cuboid_with_zero_extent_is_degenerate() {
        assert!(Shape::cuboid(0.5, 0.0, 0.5).validate().is_err());
        assert!(Shape::cuboid(0.5, -1.0, 0.5).validate().is_err());
        assert!(Shape::cuboid(0.5, 0.5, 0.5).validate().is_ok());
    }

    #[test]
    fn heightfield_rejects_empty_grid() {
        let err = Heightfield::flat(0, 4, Vec2::ONE, 0.0).unwrap_err();
        assert!(matches!(err, PhysicsError::DegenerateShape(_)));
    }

    #[test]
    fn heightfield_rejects_length_mismatch_and_nan() {
        assert!(Heightfield::new(2, 2, Vec2::ONE, vec![0.0; 3]).is_err());
        assert!(Heightfield::new(2, 1, Vec2::ONE, vec![0.0, f32::NAN]).is_err());
        assert!(Heightfield::new(2, 1, Vec2::ZERO, vec![0.0, 0.0]).is_err());
    }

    #[test]
    fn heightfield_is_centered() {
        let field = ramp();
        assert_eq!(field.extent(), Vec2::new(2.0, 1.0));
        assert_eq!(field.height_at(-1.0, -0.5), Some(0.0));
        assert_eq!(field.height_at(1.0, 0.5), Some(2.0));
        assert_eq!(field.height_at(1.01, 0.0), None);
        assert_eq!(field.height_at(0.0, -0.6), None);
    }

    #[test]
    fn heightfield_interpolates_between_samples() {
        let field = ramp();
        let h = field.height_at(-0.5, 0.0).unwrap();
        assert!((h - 0.5).abs() < 1e-6);
        let h = field.height_at(0.25, 0.1).unwrap();
        assert!((h - 1.25).abs() < 1e-6);
    }

    #[test]
    fn min_max_heights() {
        let field = ramp();
        assert_eq!(field.min_height(), 0.0);
        assert_eq!(field.max_height(), 2.0);
        assert_eq!(field.get(2, 1), Some(2.0));
        assert_eq!(field.get(3, 0), None);
    }

    #[test]
    fn deserialized_heightfield_is_validated() {
        let yaml = "resolution_x: 2\nresolution_z: 2\ncell_size: [1.0, 0.5]\nheights: [0.0, 1.0, 2.0, 3.0]\n";
        let field: Heightfield = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(field.extent(), Vec2::new(1.0, 0.5));
        assert_eq!(field.get(1, 1), Some(3.0));

        let empty = "resolution_x: 0\nresolution_z: 0\ncell_size: [1.0, 1.0]\nheights: []\n";
        assert!(serde_yaml::from_str::<Heightfield>(empty).is_err());

        let short = "resolution_x: 3\nresolution_z: 3\ncell_size: [1.0, 1.0]\nheights: [0.0]\n";
        let err = serde_yaml::from_str::<Heightfield>(short).unwrap_err();
        assert!(err.to_string().contains("1 samples for a 3x3 grid"));

        let flat_cells = "resolution_x: 2\nresolution_z: 1\ncell_size: [0.0, 1.0]\nheights: [0.0, 0.0]\n";
        assert!(serde_yaml::from_str::<Heightfield>(flat_cells).is_err());
    }
}
