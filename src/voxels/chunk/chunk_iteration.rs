//! # Chunk Iteration Module
//!
//! Iteration over the non-air voxels of a [`ChunkBlocks`] table. Air voxels are
//! skipped by scanning the occupancy bits for set bits, so sparse chunks cost
//! proportionally to what they contain.

use bitvec::slice::IterOnes;
use cgmath::Point3;

use crate::voxels::block::BlockState;

use super::ChunkBlocks;

/// Iterator over `(local position, block)` for every occupied voxel, in index order.
pub struct OccupiedVoxels<'a> {
    chunk_ref: &'a ChunkBlocks,
    ones: IterOnes<'a, usize, bitvec::order::Lsb0>,
}

impl<'a> OccupiedVoxels<'a> {
    pub(super) fn new(chunk_ref: &'a ChunkBlocks) -> Self {
        OccupiedVoxels {
            chunk_ref,
            ones: chunk_ref.occupied.iter_ones(),
        }
    }
}

impl Iterator for OccupiedVoxels<'_> {
    type Item = (Point3<usize>, BlockState);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.ones.next()?;
        Some((
            ChunkBlocks::position_of(index),
            self.chunk_ref.get_index(index),
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ones.size_hint()
    }
}
