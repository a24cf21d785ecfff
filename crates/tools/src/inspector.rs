use groundfall_common::BodyHandle;
use groundfall_kernel::{BodyKind, World};

/// World inspector for developer tooling.
///
/// Read-only queries against the world state for debugging and the CLI.
pub struct WorldInspector;

impl WorldInspector {
    /// Produce a summary of the world state.
    pub fn summary(world: &World) -> WorldSummary {
        let dynamic_bodies = world.bodies().filter(|(_, b)| b.is_dynamic()).count();
        WorldSummary {
            tick: world.tick(),
            dynamic_bodies,
            fixed_bodies: world.body_count() - dynamic_bodies,
            colliders: world.collider_count(),
            contacts: world.contacts().len(),
            pending_events: world.events().len(),
            halted: world.is_halted(),
        }
    }

    /// Pose, velocity and attached shapes of one body.
    pub fn inspect_body(world: &World, handle: BodyHandle) -> Option<BodyInfo> {
        let body = world.body(handle).ok()?;
        let shapes = body
            .colliders()
            .iter()
            .filter_map(|c| world.collider(*c).ok())
            .map(|c| c.shape().kind_name())
            .collect();
        Some(BodyInfo {
            handle,
            kind: body.kind(),
            position: body.position().to_array(),
            orientation: body.orientation().to_array(),
            linear_velocity: body.linear_velocity().to_array(),
            shapes,
        })
    }

    /// List all body handles in arena order.
    pub fn list_bodies(world: &World) -> Vec<BodyHandle> {
        world.bodies().map(|(handle, _)| handle).collect()
    }
}

/// Summary of world state for the inspector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldSummary {
    pub tick: u64,
    pub dynamic_bodies: usize,
    pub fixed_bodies: usize,
    pub colliders: usize,
    /// Contacts found by the last step.
    pub contacts: usize,
    pub pending_events: usize,
    pub halted: bool,
}

impl std::fmt::Display for WorldSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "World: tick={} bodies={} (dynamic={} fixed={}) colliders={} contacts={} pending_events={}",
            self.tick,
            self.dynamic_bodies + self.fixed_bodies,
            self.dynamic_bodies,
            self.fixed_bodies,
            self.colliders,
            self.contacts,
            self.pending_events,
        )?;
        if self.halted {
            write!(f, " HALTED")?;
        }
        Ok(())
    }
}

/// Detailed info about a single body.
#[derive(Debug, Clone)]
pub struct BodyInfo {
    pub handle: BodyHandle,
    pub kind: BodyKind,
    pub position: [f32; 3],
    pub orientation: [f32; 4],
    pub linear_velocity: [f32; 3],
    pub shapes: Vec<&'static str>,
}

impl std::fmt::Display for BodyInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Body [{:?}] {:?} pos=({:.3}, {:.3}, {:.3}) rot=({:.3}, {:.3}, {:.3}, {:.3}) vel=({:.3}, {:.3}, {:.3}) shapes=[{}]",
            self.handle,
            self.kind,
            self.position[0],
            self.position[1],
            self.position[2],
            self.orientation[0],
            self.orientation[1],
            self.orientation[2],
            self.orientation[3],
            self.linear_velocity[0],
            self.linear_velocity[1],
            self.linear_velocity[2],
            self.shapes.join(", "),
        )
    }
}
