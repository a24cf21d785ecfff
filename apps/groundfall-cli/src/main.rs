mod config;
mod scenario;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use groundfall_terrain::TerrainConfig;
use groundfall_tools::WorldInspector;
use tracing_subscriber::EnvFilter;

use crate::config::{Ground, ScenarioConfig};
use crate::scenario::{Scenario, replay_mismatch};

#[derive(Parser)]
#[command(name = "groundfall-cli", about = "Rigid-body drop scenarios over procedural terrain")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate versions and the default scenario
    Info,
    /// Drop a box onto the ground and report where it comes to rest
    Drop {
        #[command(flatten)]
        scenario: ScenarioArgs,
        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate a heightfield and print its statistics
    Terrain {
        /// YAML file with terrain parameters
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        seed: Option<u32>,
        #[arg(short, long)]
        octaves: Option<usize>,
        /// Samples per axis
        #[arg(short, long)]
        resolution: Option<usize>,
        #[arg(short, long)]
        amplitude: Option<f32>,
    },
    /// Run the scenario twice and compare state hashes every step
    Replay {
        #[command(flatten)]
        scenario: ScenarioArgs,
    },
}

/// Scenario source plus command-line overrides.
#[derive(Args)]
struct ScenarioArgs {
    /// YAML scenario file
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long, value_enum)]
    ground: Option<Ground>,
    /// Terrain seed
    #[arg(short, long)]
    seed: Option<u32>,
    #[arg(short = 'n', long)]
    max_steps: Option<u64>,
    #[arg(long)]
    drop_height: Option<f32>,
}

impl ScenarioArgs {
    fn resolve(&self) -> anyhow::Result<ScenarioConfig> {
        let mut config = match &self.config {
            Some(path) => ScenarioConfig::load(path)?,
            None => ScenarioConfig::default(),
        };
        if let Some(ground) = self.ground {
            config.ground = ground;
        }
        if let Some(seed) = self.seed {
            config.terrain.seed = seed;
        }
        if let Some(max_steps) = self.max_steps {
            config.max_steps = max_steps;
        }
        if let Some(drop_height) = self.drop_height {
            config.drop_height = drop_height;
        }
        Ok(config)
    }
}

struct TerrainStats {
    samples: usize,
    min: f32,
    max: f32,
    mean: f32,
    hash: u64,
}

/// FNV-1a over the height bit patterns.
fn content_hash(heights: &[f32]) -> u64 {
    let mut h: u64 = 0xcbf2_9ce4_8422_2325;
    for v in heights {
        for b in v.to_le_bytes() {
            h ^= b as u64;
            h = h.wrapping_mul(0x0100_0000_01b3);
        }
    }
    h
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("groundfall-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", groundfall_common::crate_info());
            println!("terrain: {}", groundfall_terrain::crate_info());
            println!("sync: {}", groundfall_sync::crate_info());
            println!("tools: {}", groundfall_tools::crate_info());
            println!("default scenario:");
            print!("{}", serde_yaml::to_string(&ScenarioConfig::default())?);
        }
        Commands::Drop { scenario, json } => {
            let config = scenario.resolve()?;
            let mut scenario = Scenario::build(&config)?;
            let outcome = scenario.run(config.max_steps)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                println!("{outcome}");
                println!("{}", WorldInspector::summary(&scenario.world));
                for body in [scenario.ground, scenario.cube] {
                    if let Some(info) = WorldInspector::inspect_body(&scenario.world, body) {
                        println!("{info}");
                    }
                }
            }
        }
        Commands::Terrain {
            config,
            seed,
            octaves,
            resolution,
            amplitude,
        } => {
            let mut terrain = match config {
                Some(path) => {
                    let text = std::fs::read_to_string(&path)?;
                    serde_yaml::from_str::<TerrainConfig>(&text)?
                }
                None => TerrainConfig::default(),
            };
            if let Some(seed) = seed {
                terrain.seed = seed;
            }
            if let Some(octaves) = octaves {
                terrain.octaves = octaves;
            }
            if let Some(resolution) = resolution {
                terrain.resolution_x = resolution;
                terrain.resolution_z = resolution;
            }
            if let Some(amplitude) = amplitude {
                terrain.amplitude = amplitude;
            }

            let field = terrain.generate()?;
            let heights = field.heights();
            let stats = TerrainStats {
                samples: heights.len(),
                min: field.min_height(),
                max: field.max_height(),
                mean: heights.iter().sum::<f32>() / heights.len() as f32,
                hash: content_hash(heights),
            };
            println!(
                "terrain seed={} {}x{} ({} samples): min={:.4} max={:.4} mean={:.4} hash={:#018x}",
                terrain.seed,
                field.resolution_x(),
                field.resolution_z(),
                stats.samples,
                stats.min,
                stats.max,
                stats.mean,
                stats.hash
            );
        }
        Commands::Replay { scenario } => {
            let config = scenario.resolve()?;
            println!("Replay check: ground={:?}, steps={}", config.ground, config.max_steps);
            match replay_mismatch(&config, config.max_steps)? {
                None => println!("Match: OK"),
                Some(step) => anyhow::bail!("replay diverged at step {step}"),
            }
        }
    }

    Ok(())
}
