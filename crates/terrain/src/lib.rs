//! Procedural terrain: a seeded noise field sampled over a grid into a heightfield.
//!
//! # Invariants
//! - Same seed and parameters give bit-identical heights.
//! - Every height lies within `[-amplitude, amplitude]`.
//! - Generation never creates bodies; the caller attaches the shape.

mod field;
mod generator;

pub use field::NoiseField;
pub use generator::{TerrainConfig, TerrainError, TerrainGenerator};

pub fn crate_info() -> &'static str {
    "groundfall-terrain v0.1.0"
}
