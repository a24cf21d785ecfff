//! Developer tooling for the physics world.
//!
//! Everything here reads the world through shared references and never
//! mutates it.

mod inspector;

pub use inspector::{BodyInfo, WorldInspector, WorldSummary};

pub fn crate_info() -> &'static str {
    "groundfall-tools v0.1.0"
}
