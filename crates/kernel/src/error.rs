use groundfall_common::{BodyHandle, ColliderHandle};

/// Errors from world construction, queries, and stepping.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PhysicsError {
    #[error("dynamic body mass must be positive and finite, got {0}")]
    InvalidMass(f32),
    #[error("body pose must be finite with a non-zero orientation")]
    InvalidPose,
    #[error("degenerate shape: {0}")]
    DegenerateShape(String),
    #[error("unknown or removed body {0:?}")]
    UnknownBody(BodyHandle),
    #[error("unknown or removed collider {0:?}")]
    UnknownCollider(ColliderHandle),
    #[error("invalid world config: {0}")]
    InvalidConfig(String),
    #[error("body {0:?} reached a non-finite state; simulation halted")]
    NonFinite(BodyHandle),
    #[error("simulation halted after an earlier fatal step")]
    Halted,
}
