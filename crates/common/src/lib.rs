//! Shared types used across the groundfall crates.
//!
//! # Invariants
//! - Handles are generation-checked: a handle to a removed item never resolves
//!   to a later item that reuses its slot.

mod types;

pub use types::{BodyHandle, ColliderHandle, Pose};

pub fn crate_info() -> &'static str {
    "groundfall-common v0.1.0"
}
