//! World Kernel: rigid bodies, colliders, fixed-step simulation.
//!
//! # Invariants
//! - `World::step` advances exactly one fixed time increment; no wall clock.
//! - Fixed bodies are never moved by integration or contact resolution.
//! - Orientations stay unit length.
//! - Failed construction calls commit no state.

pub mod body;
pub mod config;
pub mod contact;
pub mod error;
pub mod shape;
pub mod world;

pub use body::{BodyDesc, BodyKind, MotionState, RigidBody};
pub use config::WorldConfig;
pub use contact::{Contact, Separation};
pub use error::PhysicsError;
pub use shape::{Collider, Heightfield, Shape};
pub use world::{StepReport, World, WorldEvent};

pub use groundfall_common::{BodyHandle, ColliderHandle, Pose};
