//! Mesh output of the terminal pipeline stage.

use crate::{
    pipeline::SpatialPos,
    voxels::block::block_side::{BlockSide, BLOCK_SIDE_COUNT},
};

use super::quad::Quad;

/// The greedy-meshed geometry of one chunk.
///
/// Quads are kept in one list per face direction, indexed by [`BlockSide::index`], so a
/// renderer can cull whole directions that face away from the camera.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkMeshData {
    /// The position of the meshed chunk in chunk coordinates.
    pub position: SpatialPos,
    /// Quads per face direction.
    pub faces: [Vec<Quad>; BLOCK_SIDE_COUNT],
}

impl ChunkMeshData {
    /// Creates a mesh with no quads.
    pub fn new(position: SpatialPos) -> Self {
        ChunkMeshData {
            position,
            faces: Default::default(),
        }
    }

    /// Quads facing `side`.
    pub fn face(&self, side: BlockSide) -> &[Quad] {
        &self.faces[side.index()]
    }

    /// Total quads over every direction.
    pub fn quad_count(&self) -> usize {
        self.faces.iter().map(Vec::len).sum()
    }

    /// Whether no direction has any quads.
    pub fn is_empty(&self) -> bool {
        self.faces.iter().all(Vec::is_empty)
    }
}
