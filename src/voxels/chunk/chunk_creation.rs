//! # Chunk Creation Module
//!
//! A builder that fills a [`ChunkBlocks`] table voxel by voxel in index order
//! (x fastest, then y, then z), keeping the occupancy bits in step with the blocks.
//! Stage generators use it so they never have to touch the table layout directly.

use bitvec::vec::BitVec;
use cgmath::Point3;

use crate::voxels::block::BlockState;

use super::{ChunkBlocks, CHUNK_DIMENSION, CHUNK_SIZE};

/// Sequential builder for [`ChunkBlocks`].
pub struct ChunkBuilder {
    blocks: Vec<BlockState>,
    occupied: BitVec,
    /// Local position the next pushed block will occupy
    local_x: usize,
    local_y: usize,
    local_z: usize,
}

impl ChunkBuilder {
    /// Creates an empty builder positioned at (0, 0, 0).
    pub fn new() -> Self {
        ChunkBuilder {
            blocks: Vec::with_capacity(CHUNK_SIZE),
            occupied: BitVec::with_capacity(CHUNK_SIZE),
            local_x: 0,
            local_y: 0,
            local_z: 0,
        }
    }

    /// Local coordinate the next [`push_block`](Self::push_block) writes to.
    pub fn next_position(&self) -> Point3<usize> {
        Point3::new(self.local_x, self.local_y, self.local_z)
    }

    /// Appends a block at the current position and advances.
    ///
    /// # Panics
    /// Panics if the table is already full.
    pub fn push_block(&mut self, block: BlockState) {
        assert!(
            self.blocks.len() < CHUNK_SIZE,
            "pushed more than {} blocks into a chunk",
            CHUNK_SIZE
        );
        self.blocks.push(block);
        self.occupied.push(!block.is_air());

        self.local_x += 1;
        if self.local_x == CHUNK_DIMENSION {
            self.local_x = 0;
            self.local_y += 1;
            if self.local_y == CHUNK_DIMENSION {
                self.local_y = 0;
                self.local_z += 1;
            }
        }
    }

    /// Finalizes the table.
    ///
    /// # Panics
    /// Panics unless exactly `CHUNK_SIZE` blocks were pushed.
    pub fn finish(self) -> ChunkBlocks {
        assert_eq!(
            self.blocks.len(),
            CHUNK_SIZE,
            "chunk finished with {} of {} blocks",
            self.blocks.len(),
            CHUNK_SIZE
        );
        ChunkBlocks {
            blocks: self.blocks,
            occupied: self.occupied,
        }
    }
}

impl Default for ChunkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
