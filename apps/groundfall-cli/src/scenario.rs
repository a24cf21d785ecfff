use glam::Vec3;
use groundfall_kernel::{BodyDesc, BodyHandle, MotionState, Shape, World};
use groundfall_sync::{PoseBuffer, SyncBridge};
use serde::Serialize;

use crate::config::{Ground, ScenarioConfig};

/// Sync key for the dropped box.
const BOX_KEY: &str = "box";

/// A world holding one fixed ground body and one falling box.
pub struct Scenario {
    pub world: World,
    pub ground: BodyHandle,
    pub cube: BodyHandle,
}

impl Scenario {
    pub fn build(config: &ScenarioConfig) -> anyhow::Result<Self> {
        let mut world = World::with_config(config.world.clone())?;
        let ground = world.create_body(BodyDesc::fixed())?;

        // Drop point is raised over terrain peaks so the box starts clear of the ground.
        let drop_y = match config.ground {
            Ground::Slab => {
                world.attach_collider(ground, Shape::cuboid(10.0, 0.1, 10.0))?;
                config.drop_height
            }
            Ground::Terrain => {
                let field = config.terrain.generate()?;
                let clearance = field.max_height() + 2.0 * config.box_half_extent;
                world.attach_collider(ground, Shape::Heightfield(field))?;
                config.drop_height.max(clearance)
            }
        };

        let h = config.box_half_extent;
        let cube = world.create_body(
            BodyDesc::dynamic()
                .with_position(Vec3::new(0.0, drop_y, 0.0))
                .with_mass(config.box_mass),
        )?;
        world.attach_collider(cube, Shape::cuboid(h, h, h))?;

        tracing::info!(ground = ?config.ground, drop_y, "scenario built");
        Ok(Self {
            world,
            ground,
            cube,
        })
    }

    /// Frame loop: step, sync the box pose, stop once it rests or after `max_steps`.
    pub fn run(&mut self, max_steps: u64) -> anyhow::Result<DropOutcome> {
        let mut bridge = SyncBridge::new();
        bridge.bind(self.cube, BOX_KEY);
        let mut poses = PoseBuffer::new();

        let mut steps = 0;
        let mut resting = false;
        while steps < max_steps {
            let (report, _) = bridge.frame(&mut self.world, &mut poses)?;
            steps += 1;
            if report.motion_of(self.cube) == Some(MotionState::Resting) {
                resting = true;
                break;
            }
        }

        let pose = match poses.get(&BOX_KEY) {
            Some(pose) => *pose,
            None => self.world.body_pose(self.cube)?,
        };
        tracing::info!(steps, resting, position = %pose.position, "drop finished");
        Ok(DropOutcome {
            steps,
            resting,
            position: pose.position.to_array(),
            orientation: pose.orientation.to_array(),
            state_hash: self.world.state_hash(),
        })
    }
}

/// Result of a drop run, printed by the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct DropOutcome {
    pub steps: u64,
    pub resting: bool,
    pub position: [f32; 3],
    pub orientation: [f32; 4],
    pub state_hash: u64,
}

impl std::fmt::Display for DropOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [x, y, z] = self.position;
        write!(
            f,
            "box {} after {} steps at ({x:.4}, {y:.4}, {z:.4}) hash={:#018x}",
            if self.resting { "resting" } else { "still moving" },
            self.steps,
            self.state_hash
        )
    }
}

/// First step at which two identical runs disagree, if any.
pub fn replay_mismatch(config: &ScenarioConfig, steps: u64) -> anyhow::Result<Option<u64>> {
    let mut a = Scenario::build(config)?;
    let mut b = Scenario::build(config)?;
    for step in 1..=steps {
        a.world.step()?;
        b.world.step()?;
        if a.world.state_hash() != b.world.state_hash() {
            tracing::warn!(step, "replay diverged");
            return Ok(Some(step));
        }
    }
    Ok(None)
}
