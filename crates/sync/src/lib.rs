//! Sync Bridge: pushes post-step body poses to a visual layer each frame.
//!
//! # Invariants
//! - Sinks receive pose copies; they never hold the world mutably.
//! - Poses are forwarded unchanged. Interpolation is the sink's concern.
//! - A frame steps the world exactly once before reading poses.

mod bridge;

pub use bridge::{PoseBuffer, PoseSink, SyncBridge, SyncStats};

pub fn crate_info() -> &'static str {
    "groundfall-sync v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("sync"));
    }
}
