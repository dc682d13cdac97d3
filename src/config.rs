//! # Pipeline Configuration
//!
//! Settings for the chunk pipeline, loadable from JSON. Every field has a default, so a
//! configuration file only needs to name what it changes:
//!
//! ```json
//! { "worker_count": 8, "terrain": { "seed": 42 } }
//! ```

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// Top-level pipeline settings.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of worker threads. Must be positive.
    pub worker_count: usize,
    /// Terrain generation settings.
    pub terrain: TerrainConfig,
}

/// Parameters of the procedural terrain stages.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Seed of every noise function.
    pub seed: u32,
    /// Scale applied to world block coordinates when sampling the height map.
    pub height_scale: f64,
    /// World height (in blocks) the terrain surface oscillates around.
    pub base_height: f64,
    /// Maximum deviation of the surface from `base_height`, in blocks.
    pub height_amplitude: f64,
    /// Scale applied to world block coordinates when sampling the cave noise.
    pub cave_scale: f64,
    /// Cave noise samples above this value are carved out.
    pub cave_threshold: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            worker_count: default_worker_count(),
            terrain: TerrainConfig::default(),
        }
    }
}

impl Default for TerrainConfig {
    fn default() -> Self {
        TerrainConfig {
            seed: 0,
            height_scale: 0.02,
            base_height: 0.0,
            height_amplitude: 24.0,
            cave_scale: 0.05,
            cave_threshold: 0.6,
        }
    }
}

/// One worker per available core, leaving one for the delegator and the consumer.
fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|cores| cores.get().saturating_sub(1).max(1))
        .unwrap_or(1)
}

impl PipelineConfig {
    /// A default configuration with the given worker count.
    pub fn with_workers(worker_count: usize) -> Self {
        PipelineConfig {
            worker_count,
            ..Self::default()
        }
    }

    /// Parses and validates a configuration from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: PipelineConfig =
            serde_json::from_str(json).with_context(|| "Failed to parse pipeline config JSON")?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_json_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.worker_count == 0 {
            bail!("worker_count must be positive");
        }
        if !(self.terrain.height_scale > 0.0 && self.terrain.cave_scale > 0.0) {
            bail!(
                "noise scales must be positive, got height_scale {} and cave_scale {}",
                self.terrain.height_scale,
                self.terrain.cave_scale
            );
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
