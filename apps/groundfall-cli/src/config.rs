use std::path::Path;

use anyhow::Context;
use groundfall_kernel::WorldConfig;
use groundfall_terrain::TerrainConfig;
use serde::{Deserialize, Serialize};

/// What the dropped box lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Ground {
    /// Generated heightfield.
    Terrain,
    /// Thin fixed cuboid, 20 x 0.2 x 20, centered at the origin.
    Slab,
}

/// Drop scenario as loaded from YAML. Missing keys take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub world: WorldConfig,
    pub terrain: TerrainConfig,
    pub ground: Ground,
    pub box_half_extent: f32,
    pub box_mass: f32,
    pub drop_height: f32,
    pub max_steps: u64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            terrain: TerrainConfig::default(),
            ground: Ground::Terrain,
            box_half_extent: 0.5,
            box_mass: 1.0,
            drop_height: 5.0,
            max_steps: 600,
        }
    }
}

impl ScenarioConfig {
    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(text).context("invalid scenario yaml")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("parsing {}", path.display()))
    }
}
