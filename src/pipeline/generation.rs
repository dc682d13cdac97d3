//! # Stage Generators
//!
//! The stage-specific work run by the workers, dispatched through [`STAGE_GENERATORS`], a
//! fixed table indexed by [`Stage::index`].
//!
//! Every generator is a pure function of its [`StageContext`]: it reads the leased
//! prerequisite tables and returns a new output without touching any shared state. The
//! worker is responsible for storing and publishing the result.
//!
//! ## Terrain Rules
//! * **StoneMap**: stone below a 2D Perlin height map, with 3D Perlin caves carved out
//! * **Topsoil**: stone with air anywhere in the four voxels above it becomes dirt
//! * **Surface**: dirt with air directly above it becomes grass
//! * **Mesh**: the greedy mesh of the surface table and its neighbours

use cgmath::Vector3;
use noise::{NoiseFn, Perlin};

use crate::{
    config::TerrainConfig,
    meshing::{greedy_mesh, ChunkMeshData},
    voxels::{
        block::{
            block_side::{BlockSide, BLOCK_SIDE_COUNT},
            block_type::BlockType,
            registry::BlockRegistry,
            BlockState,
        },
        chunk::{chunk_creation::ChunkBuilder, ChunkBlocks, CHUNK_DIMENSION, CHUNK_DIMENSION_I32},
    },
};

use super::{
    stage::{SpatialPos, Stage, StageKey},
    stage_cache::ResolvedPrerequisite,
};

/// How many voxels above a stone voxel are checked for air by the topsoil stage.
pub const TOPSOIL_DEPTH: usize = 4;

/// What a generator produces.
#[derive(Debug)]
pub enum StageOutput {
    /// A block table for a terrain stage.
    Blocks(Box<ChunkBlocks>),
    /// The mesh of the terminal stage.
    Mesh(ChunkMeshData),
}

/// A stage's generation function.
pub type StageGenerator = fn(&StageContext<'_>) -> StageOutput;

/// Generators indexed by [`Stage::index`].
pub static STAGE_GENERATORS: [StageGenerator; Stage::COUNT] =
    [generate_stone_map, generate_topsoil, generate_surface, generate_mesh];

/// Noise functions shared by every worker, built once from the [`TerrainConfig`].
pub struct TerrainNoise {
    config: TerrainConfig,
    height: Perlin,
    caves: Perlin,
}

impl TerrainNoise {
    /// Seeds the noise functions.
    pub fn new(config: TerrainConfig) -> Self {
        TerrainNoise {
            height: Perlin::new(config.seed),
            caves: Perlin::new(config.seed.wrapping_add(1)),
            config,
        }
    }

    /// Terrain surface height at a world block column.
    pub fn surface_height(&self, world_x: i32, world_z: i32) -> f64 {
        let scale = self.config.height_scale;
        let sample = self
            .height
            .get([world_x as f64 * scale, world_z as f64 * scale]);
        self.config.base_height + sample * self.config.height_amplitude
    }

    /// Whether a world block is carved out by caves.
    pub fn is_cave(&self, world: [i32; 3]) -> bool {
        let scale = self.config.cave_scale;
        let sample = self.caves.get([
            world[0] as f64 * scale,
            world[1] as f64 * scale,
            world[2] as f64 * scale,
        ]);
        sample > self.config.cave_threshold
    }
}

/// Everything a generator may read.
pub struct StageContext<'a> {
    /// The output being generated.
    pub key: StageKey,
    /// Leased prerequisites, in table order.
    pub prerequisites: &'a [ResolvedPrerequisite],
    /// Block models, for meshing.
    pub registry: &'a dyn BlockRegistry,
    /// Terrain noise, for the stone map.
    pub terrain: &'a TerrainNoise,
}

impl<'a> StageContext<'a> {
    /// Position being generated.
    pub fn position(&self) -> SpatialPos {
        self.key.position
    }

    /// The block table of the prerequisite at `offset` for `stage`, if it was available.
    pub fn blocks(&self, offset: Vector3<i32>, stage: Stage) -> Option<&'a ChunkBlocks> {
        self.prerequisites
            .iter()
            .find(|resolved| {
                resolved.requirement.offset == offset && resolved.requirement.stage == stage
            })
            .and_then(|resolved| resolved.lease.as_ref())
            .and_then(|lease| lease.blocks())
    }

    /// Like [`blocks`](Self::blocks), for a prerequisite that must be present.
    ///
    /// # Panics
    /// Panics if the prerequisite is missing, which means the work item was scheduled
    /// before its mandatory prerequisites existed.
    pub fn required_blocks(&self, offset: Vector3<i32>, stage: Stage) -> &'a ChunkBlocks {
        self.blocks(offset, stage).unwrap_or_else(|| {
            panic!(
                "{} scheduled without {} at offset ({}, {}, {})",
                self.key, stage, offset.x, offset.y, offset.z
            )
        })
    }
}

fn here() -> Vector3<i32> {
    Vector3::new(0, 0, 0)
}

fn above() -> Vector3<i32> {
    BlockSide::TOP.normal()
}

/// Whether the voxel `dy` blocks above local `(x, y, z)` is air, reading into the chunk
/// above when the offset leaves `blocks`.
fn is_air_above(
    blocks: &ChunkBlocks,
    blocks_above: &ChunkBlocks,
    x: usize,
    y: usize,
    z: usize,
    dy: usize,
) -> bool {
    let target = y + dy;
    if target < CHUNK_DIMENSION {
        blocks.get(x, target, z).is_air()
    } else {
        blocks_above.get(x, target - CHUNK_DIMENSION, z).is_air()
    }
}

/// Lays down stone under the height map and carves caves out of it.
pub fn generate_stone_map(context: &StageContext<'_>) -> StageOutput {
    let origin = context.position() * CHUNK_DIMENSION_I32;
    let mut builder = ChunkBuilder::new();

    let mut heights = [[0.0; CHUNK_DIMENSION]; CHUNK_DIMENSION];
    for (z, row) in heights.iter_mut().enumerate() {
        for (x, height) in row.iter_mut().enumerate() {
            *height = context
                .terrain
                .surface_height(origin.x + x as i32, origin.z + z as i32);
        }
    }

    for z in 0..CHUNK_DIMENSION {
        for y in 0..CHUNK_DIMENSION {
            for x in 0..CHUNK_DIMENSION {
                let world = [origin.x + x as i32, origin.y + y as i32, origin.z + z as i32];
                let solid = (world[1] as f64) <= heights[z][x] && !context.terrain.is_cave(world);
                builder.push_block(if solid {
                    BlockType::STONE.into()
                } else {
                    BlockState::AIR
                });
            }
        }
    }

    StageOutput::Blocks(Box::new(builder.finish()))
}

/// Turns stone into dirt where air lies within [`TOPSOIL_DEPTH`] voxels above.
pub fn generate_topsoil(context: &StageContext<'_>) -> StageOutput {
    let stone_map = context.required_blocks(here(), Stage::StoneMap);
    let stone_map_above = context.required_blocks(above(), Stage::StoneMap);
    let stone: BlockState = BlockType::STONE.into();

    let blocks = ChunkBlocks::from_fn(|x, y, z| {
        let block = stone_map.get(x, y, z);
        let exposed = block == stone
            && (1..=TOPSOIL_DEPTH).any(|dy| is_air_above(stone_map, stone_map_above, x, y, z, dy));
        if exposed {
            BlockType::DIRT.into()
        } else {
            block
        }
    });

    StageOutput::Blocks(Box::new(blocks))
}

/// Turns dirt directly under air into grass.
pub fn generate_surface(context: &StageContext<'_>) -> StageOutput {
    let topsoil = context.required_blocks(here(), Stage::Topsoil);
    // Air is identical in every terrain stage, so the stone map suffices above.
    let stone_map_above = context.required_blocks(above(), Stage::StoneMap);
    let dirt: BlockState = BlockType::DIRT.into();

    let blocks = ChunkBlocks::from_fn(|x, y, z| {
        let block = topsoil.get(x, y, z);
        if block == dirt && is_air_above(topsoil, stone_map_above, x, y, z, 1) {
            BlockType::GRASS.into()
        } else {
            block
        }
    });

    StageOutput::Blocks(Box::new(blocks))
}

/// Meshes the finished terrain, using whichever neighbours are available.
pub fn generate_mesh(context: &StageContext<'_>) -> StageOutput {
    let blocks = context.required_blocks(here(), Stage::Surface);
    let mut neighbours: [Option<&ChunkBlocks>; BLOCK_SIDE_COUNT] = [None; BLOCK_SIDE_COUNT];
    for side in BlockSide::all() {
        neighbours[side.index()] = context.blocks(side.normal(), Stage::Surface);
    }

    StageOutput::Mesh(greedy_mesh(
        context.position(),
        blocks,
        neighbours,
        context.registry,
    ))
}

#[cfg(test)]
#[path = "generation_test.rs"]
mod generation_test;
