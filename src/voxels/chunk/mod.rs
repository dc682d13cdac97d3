//! # Chunk Module
//!
//! This module provides [`ChunkBlocks`], the per-voxel table every terrain stage reads
//! and writes, plus a builder and an iterator over occupied voxels.
//!
//! ## Storage
//!
//! A table stores two views of the same data:
//! - `blocks`: one [`BlockState`] per voxel, `CHUNK_SIZE` entries addressed by
//!   `x + CHUNK_DIMENSION * y + CHUNK_PLANE_SIZE * z`
//! - `occupied`: a bit vector with one bit per voxel, set when the voxel is not air
//!
//! The bit vector is kept in sync by every mutation. It makes the questions the
//! pipeline asks most often cheap:
//! - **Emptiness**: O(words) instead of O(voxels), which lets the mesher short-circuit
//!   empty chunks before doing any grouping work
//! - **Iteration**: only occupied voxels are visited, by scanning for set bits

use bitvec::prelude::BitVec;
use cgmath::Point3;

use super::block::BlockState;

pub mod chunk_creation;
pub mod chunk_iteration;

use chunk_iteration::OccupiedVoxels;

/// The dimension (width, height, depth) of a chunk in blocks.
pub const CHUNK_DIMENSION: usize = 16;
/// `CHUNK_DIMENSION` as a signed integer, for world-coordinate arithmetic.
pub const CHUNK_DIMENSION_I32: i32 = CHUNK_DIMENSION as i32;
/// The number of blocks in a single 2D plane of a chunk (CHUNK_DIMENSION²).
pub const CHUNK_PLANE_SIZE: usize = CHUNK_DIMENSION * CHUNK_DIMENSION;
/// The total number of blocks in a chunk (CHUNK_DIMENSION³).
pub const CHUNK_SIZE: usize = CHUNK_PLANE_SIZE * CHUNK_DIMENSION;

/// A 16x16x16 table of block states.
#[derive(Clone, PartialEq, Eq)]
pub struct ChunkBlocks {
    blocks: Vec<BlockState>,
    occupied: BitVec,
}

impl ChunkBlocks {
    /// Flat index of a local coordinate.
    ///
    /// # Panics
    /// Debug builds panic when a coordinate is outside `0..CHUNK_DIMENSION`.
    #[inline]
    pub const fn index(x: usize, y: usize, z: usize) -> usize {
        debug_assert!(x < CHUNK_DIMENSION && y < CHUNK_DIMENSION && z < CHUNK_DIMENSION);
        x + CHUNK_DIMENSION * y + CHUNK_PLANE_SIZE * z
    }

    /// Local coordinate of a flat index.
    #[inline]
    pub fn position_of(index: usize) -> Point3<usize> {
        Point3::new(
            index % CHUNK_DIMENSION,
            (index / CHUNK_DIMENSION) % CHUNK_DIMENSION,
            index / CHUNK_PLANE_SIZE,
        )
    }

    /// Creates a table filled with air.
    pub fn empty() -> Self {
        Self::filled(BlockState::AIR)
    }

    /// Creates a table with every voxel set to `block`.
    pub fn filled(block: BlockState) -> Self {
        ChunkBlocks {
            blocks: vec![block; CHUNK_SIZE],
            occupied: BitVec::repeat(!block.is_air(), CHUNK_SIZE),
        }
    }

    /// Creates a table by evaluating `f` at every local coordinate.
    pub fn from_fn(mut f: impl FnMut(usize, usize, usize) -> BlockState) -> Self {
        let mut builder = chunk_creation::ChunkBuilder::new();
        for z in 0..CHUNK_DIMENSION {
            for y in 0..CHUNK_DIMENSION {
                for x in 0..CHUNK_DIMENSION {
                    builder.push_block(f(x, y, z));
                }
            }
        }
        builder.finish()
    }

    /// Block at a local coordinate.
    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> BlockState {
        self.blocks[Self::index(x, y, z)]
    }

    /// Block at a flat index.
    #[inline]
    pub fn get_index(&self, index: usize) -> BlockState {
        self.blocks[index]
    }

    /// Replaces the block at a local coordinate.
    pub fn set(&mut self, x: usize, y: usize, z: usize, block: BlockState) {
        let index = Self::index(x, y, z);
        self.blocks[index] = block;
        self.occupied.set(index, !block.is_air());
    }

    /// Whether the voxel at a local coordinate is not air.
    #[inline]
    pub fn is_occupied(&self, x: usize, y: usize, z: usize) -> bool {
        self.occupied[Self::index(x, y, z)]
    }

    /// Whether every voxel is air.
    pub fn is_empty(&self) -> bool {
        self.occupied.not_any()
    }

    /// Number of voxels that are not air.
    pub fn occupied_count(&self) -> usize {
        self.occupied.count_ones()
    }

    /// Iterates the non-air voxels in index order.
    pub fn iter_occupied(&self) -> OccupiedVoxels<'_> {
        OccupiedVoxels::new(self)
    }

    /// The whole table in index order.
    pub fn as_slice(&self) -> &[BlockState] {
        &self.blocks
    }

    /// The table as raw bytes, e.g. for upload or hashing.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.blocks)
    }
}

impl std::fmt::Debug for ChunkBlocks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkBlocks")
            .field("occupied", &self.occupied_count())
            .finish()
    }
}

#[cfg(test)]
#[path = "chunk_test.rs"]
mod chunk_test;
