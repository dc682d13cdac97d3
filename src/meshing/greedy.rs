//! Binary greedy meshing.
//!
//! Every chunk column along every axis is reduced to a bitmask, so face culling for a
//! whole column of sixteen voxels is a single shift-and-mask. Visible faces are then
//! sorted into per-texture 16x16 bitplanes, and each plane is merged into rectangles
//! one row at a time with `trailing_zeros` / `trailing_ones`.
//!
//! # Column layout
//! A column mask holds 18 meaningful bits: bit `k + 1` is the voxel at depth `k` inside
//! the chunk, bit `0` the voxel just before the chunk and bit `17` the voxel just past it.
//! The two outer bits are sampled from the neighbouring chunks. A neighbour that is not
//! available counts as solid, so no faces are emitted toward ungenerated space.
//!
//! # Plane axes
//! | faces along | u | v |
//! |-------------|---|---|
//! | X           | y | z |
//! | Y           | x | z |
//! | Z           | x | y |
//!
//! Quad width runs along u and height along v.

use std::collections::BTreeMap;

use cgmath::Point3;

use crate::{
    pipeline::SpatialPos,
    voxels::{
        block::{
            block_side::{BlockSide, BLOCK_SIDE_COUNT},
            registry::BlockRegistry,
            BlockModel, TextureId,
        },
        chunk::{ChunkBlocks, CHUNK_DIMENSION, CHUNK_SIZE},
    },
};

use super::{mesh::ChunkMeshData, quad::Quad};

/// Column masks for one face direction, indexed `[v][u]`.
type ColumnMasks = [[u32; CHUNK_DIMENSION]; CHUNK_DIMENSION];

/// One 16x16 bitplane per row `v`, bit `u` set when the face at `(u, v)` is visible.
type Plane = [u16; CHUNK_DIMENSION];

/// Bit holding the sample just past the far end of a column.
const FAR_NEIGHBOUR_BIT: u32 = CHUNK_DIMENSION as u32 + 1;

/// Maps a depth along `axis` and plane coordinates `(u, v)` to a local voxel coordinate.
#[inline]
fn to_local(axis: usize, depth: usize, u: usize, v: usize) -> Point3<usize> {
    match axis {
        0 => Point3::new(depth, u, v),
        1 => Point3::new(u, depth, v),
        _ => Point3::new(u, v, depth),
    }
}

/// Inverse of [`to_local`]: `(depth, u, v)` of a local voxel coordinate along `axis`.
#[inline]
fn from_local(axis: usize, position: Point3<usize>) -> (usize, usize, usize) {
    match axis {
        0 => (position.x, position.y, position.z),
        1 => (position.y, position.x, position.z),
        _ => (position.z, position.x, position.y),
    }
}

/// The two face directions perpendicular to `axis`, positive first.
#[inline]
fn sides_of_axis(axis: usize) -> [BlockSide; 2] {
    match axis {
        0 => [BlockSide::RIGHT, BlockSide::LEFT],
        1 => [BlockSide::TOP, BlockSide::BOTTOM],
        _ => [BlockSide::FRONT, BlockSide::BACK],
    }
}

/// Builds the greedy mesh of one chunk.
///
/// # Arguments
/// * `position` - Chunk coordinate, copied into the result
/// * `blocks` - The chunk's block table
/// * `neighbours` - For each face direction (by [`BlockSide::index`]) the chunk across that
///   face, or `None` if it is not available
/// * `registry` - Block model lookup
///
/// # Returns
/// The chunk's quads per face direction. A block without a registered model contributes
/// nothing and does not occlude its neighbours.
///
/// # Performance
/// The registry is queried once per occupied voxel of `blocks`, plus once per occupied
/// boundary voxel of each present neighbour. A chunk that ends up with no solid faces at
/// all returns before any neighbour sampling or texture grouping.
pub fn greedy_mesh(
    position: SpatialPos,
    blocks: &ChunkBlocks,
    neighbours: [Option<&ChunkBlocks>; BLOCK_SIDE_COUNT],
    registry: &dyn BlockRegistry,
) -> ChunkMeshData {
    let mut mesh = ChunkMeshData::new(position);

    let mut columns: [ColumnMasks; BLOCK_SIDE_COUNT] =
        [[[0; CHUNK_DIMENSION]; CHUNK_DIMENSION]; BLOCK_SIDE_COUNT];
    let mut models: Vec<Option<&BlockModel>> = vec![None; CHUNK_SIZE];

    for (local, block) in blocks.iter_occupied() {
        let Some(model) = registry.get_model(block.block_id) else {
            continue;
        };
        models[ChunkBlocks::index(local.x, local.y, local.z)] = Some(model);
        for side in BlockSide::all() {
            if model.is_solid_on(side) {
                let (depth, u, v) = from_local(side.axis(), local);
                columns[side.index()][v][u] |= 1 << (depth + 1);
            }
        }
    }

    let combined = columns
        .iter()
        .flatten()
        .flatten()
        .fold(0u32, |acc, column| acc | column);
    if combined == 0 {
        return mesh;
    }

    for side in BlockSide::all() {
        sample_neighbour(&mut columns, side, neighbours[side.index()], registry);
    }

    for side in BlockSide::all() {
        let axis = side.axis();
        let own = &columns[side.index()];
        let occluders = &columns[side.opposite().index()];

        // Grouped by depth, then texture, so emission order is deterministic.
        let mut planes: [BTreeMap<TextureId, Plane>; CHUNK_DIMENSION] =
            std::array::from_fn(|_| BTreeMap::new());

        for v in 0..CHUNK_DIMENSION {
            for u in 0..CHUNK_DIMENSION {
                let column = own[v][u];
                if column == 0 {
                    continue;
                }
                let occluder = occluders[v][u];
                let visible = if side.is_positive() {
                    column & !(occluder >> 1)
                } else {
                    column & !(occluder << 1)
                };
                let mut visible = (visible >> 1) & 0xFFFF;

                while visible != 0 {
                    let depth = visible.trailing_zeros() as usize;
                    visible &= visible - 1;

                    let local = to_local(axis, depth, u, v);
                    let Some(model) = models[ChunkBlocks::index(local.x, local.y, local.z)] else {
                        continue;
                    };
                    let plane = planes[depth]
                        .entry(model.texture(side))
                        .or_insert([0; CHUNK_DIMENSION]);
                    plane[v] |= 1 << u;
                }
            }
        }

        let quads = &mut mesh.faces[side.index()];
        for (depth, textured_planes) in planes.iter_mut().enumerate() {
            for (texture, plane) in textured_planes.iter_mut() {
                greedy_merge_plane(plane, |u, v, width, height| {
                    let origin = to_local(axis, depth, u, v);
                    quads.push(Quad::new(
                        *texture,
                        origin.x as u32,
                        origin.y as u32,
                        origin.z as u32,
                        width,
                        height,
                    ));
                });
            }
        }
    }

    mesh
}

/// Fills the outer bit of every column for the neighbour across `side`.
///
/// Both directions of the axis receive the sample so that the occluder mask of the facing
/// direction sees it.
fn sample_neighbour(
    columns: &mut [ColumnMasks; BLOCK_SIDE_COUNT],
    side: BlockSide,
    neighbour: Option<&ChunkBlocks>,
    registry: &dyn BlockRegistry,
) {
    let axis = side.axis();
    let (bit, neighbour_depth) = if side.is_positive() {
        (FAR_NEIGHBOUR_BIT, 0)
    } else {
        (0, CHUNK_DIMENSION - 1)
    };

    for v in 0..CHUNK_DIMENSION {
        for u in 0..CHUNK_DIMENSION {
            match neighbour {
                None => {
                    for axis_side in sides_of_axis(axis) {
                        columns[axis_side.index()][v][u] |= 1 << bit;
                    }
                }
                Some(neighbour_blocks) => {
                    let local = to_local(axis, neighbour_depth, u, v);
                    let block = neighbour_blocks.get(local.x, local.y, local.z);
                    if block.is_air() {
                        continue;
                    }
                    let Some(model) = registry.get_model(block.block_id) else {
                        continue;
                    };
                    for axis_side in sides_of_axis(axis) {
                        if model.is_solid_on(axis_side) {
                            columns[axis_side.index()][v][u] |= 1 << bit;
                        }
                    }
                }
            }
        }
    }
}

/// Merges the set bits of one bitplane into rectangles.
///
/// For each row, the lowest run of set bits gives a rectangle's start and width. The run
/// is then extended into following rows for as long as they contain the whole run, and
/// every covered bit is cleared. `emit` receives `(u, v, width, height)`.
pub(crate) fn greedy_merge_plane(plane: &mut Plane, mut emit: impl FnMut(usize, usize, u32, u32)) {
    for v in 0..CHUNK_DIMENSION {
        while plane[v] != 0 {
            let start = plane[v].trailing_zeros();
            let width = (plane[v] >> start).trailing_ones();
            let run_mask = if width == 16 {
                u16::MAX
            } else {
                ((1u16 << width) - 1) << start
            };
            plane[v] &= !run_mask;

            let mut height = 1;
            while v + height < CHUNK_DIMENSION && plane[v + height] & run_mask == run_mask {
                plane[v + height] &= !run_mask;
                height += 1;
            }

            emit(start as usize, v, width, height as u32);
        }
    }
}

#[cfg(test)]
#[path = "greedy_test.rs"]
mod greedy_test;
