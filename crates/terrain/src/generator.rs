use glam::Vec2;
use groundfall_kernel::{Heightfield, PhysicsError};
use serde::{Deserialize, Serialize};

use crate::field::NoiseField;

pub const DEFAULT_FREQUENCY: f32 = 0.15;
pub const DEFAULT_AMPLITUDE: f32 = 2.0;

/// Errors from terrain generation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TerrainError {
    #[error("terrain grid must have at least one sample per axis, got {resolution_x}x{resolution_z}")]
    EmptyGrid {
        resolution_x: usize,
        resolution_z: usize,
    },
    #[error("terrain extent must be positive and finite, got {width}x{depth}")]
    InvalidExtent { width: f32, depth: f32 },
    #[error("invalid terrain parameter: {0}")]
    InvalidParameter(String),
    #[error("generated heightfield rejected: {0}")]
    Shape(#[from] PhysicsError),
}

/// Turns noise samples over an evenly spaced grid into a heightfield.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainGenerator {
    frequency: f32,
    amplitude: f32,
}

impl Default for TerrainGenerator {
    fn default() -> Self {
        Self {
            frequency: DEFAULT_FREQUENCY,
            amplitude: DEFAULT_AMPLITUDE,
        }
    }
}

impl TerrainGenerator {
    /// `frequency` scales grid coordinates before sampling; `amplitude`
    /// scales the sampled value into world units.
    pub fn new(frequency: f32, amplitude: f32) -> Result<Self, TerrainError> {
        if !frequency.is_finite() {
            return Err(TerrainError::InvalidParameter(format!(
                "frequency must be finite, got {frequency}"
            )));
        }
        if !(amplitude.is_finite() && amplitude >= 0.0) {
            return Err(TerrainError::InvalidParameter(format!(
                "amplitude must be non-negative, got {amplitude}"
            )));
        }
        Ok(Self {
            frequency,
            amplitude,
        })
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    /// Sample `resolution_x * resolution_z` points spanning
    /// `[-width/2, width/2] x [-depth/2, depth/2]`, row-major along x.
    ///
    /// An axis with a single sample places it at 0.
    pub fn generate(
        &self,
        width: f32,
        depth: f32,
        resolution_x: usize,
        resolution_z: usize,
        noise: &NoiseField,
    ) -> Result<Heightfield, TerrainError> {
        if resolution_x == 0 || resolution_z == 0 {
            return Err(TerrainError::EmptyGrid {
                resolution_x,
                resolution_z,
            });
        }
        if !(width.is_finite() && width > 0.0 && depth.is_finite() && depth > 0.0) {
            return Err(TerrainError::InvalidExtent { width, depth });
        }
        let count = resolution_x.checked_mul(resolution_z).ok_or_else(|| {
            TerrainError::InvalidParameter(format!(
                "grid {resolution_x}x{resolution_z} is too large"
            ))
        })?;

        let (step_x, start_x) = axis_layout(width, resolution_x);
        let (step_z, start_z) = axis_layout(depth, resolution_z);

        let mut heights = Vec::with_capacity(count);
        for iz in 0..resolution_z {
            let z = start_z + iz as f32 * step_z;
            for ix in 0..resolution_x {
                let x = start_x + ix as f32 * step_x;
                let value = noise.sample(x * self.frequency, z * self.frequency);
                heights.push(self.amplitude * value);
            }
        }

        let field = Heightfield::new(resolution_x, resolution_z, Vec2::new(step_x, step_z), heights)?;
        tracing::debug!(
            resolution_x,
            resolution_z,
            seed = noise.seed(),
            min = field.min_height(),
            max = field.max_height(),
            "terrain generated"
        );
        Ok(field)
    }
}

/// Spacing and first coordinate for `samples` points across `extent`.
fn axis_layout(extent: f32, samples: usize) -> (f32, f32) {
    if samples == 1 {
        (extent, 0.0)
    } else {
        (extent / (samples - 1) as f32, -extent * 0.5)
    }
}

/// Terrain parameters as loaded from configuration files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub seed: u32,
    pub octaves: usize,
    pub width: f32,
    pub depth: f32,
    pub resolution_x: usize,
    pub resolution_z: usize,
    pub frequency: f32,
    pub amplitude: f32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            octaves: 1,
            width: 20.0,
            depth: 20.0,
            resolution_x: 64,
            resolution_z: 64,
            frequency: DEFAULT_FREQUENCY,
            amplitude: DEFAULT_AMPLITUDE,
        }
    }
}

impl TerrainConfig {
    pub fn noise(&self) -> NoiseField {
        NoiseField::fractal(self.seed, self.octaves)
    }

    pub fn generator(&self) -> Result<TerrainGenerator, TerrainError> {
        TerrainGenerator::new(self.frequency, self.amplitude)
    }

    /// Build the noise field and generator, then sample the grid.
    pub fn generate(&self) -> Result<Heightfield, TerrainError> {
        self.generator()?.generate(
            self.width,
            self.depth,
            self.resolution_x,
            self.resolution_z,
            &self.noise(),
        )
    }
}
