//! # Block Side Module
//!
//! This module defines the six faces of a voxel block and the axis arithmetic the
//! mesher and the prerequisite table need from them.

use cgmath::Vector3;

/// Represents the six possible faces of a voxel block.
///
/// Each variant is assigned a stable integer value which is also its index into the
/// per-face arrays of [`BlockModel`](super::BlockModel) and
/// [`ChunkMeshData`](crate::meshing::ChunkMeshData).
///
/// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The front face (facing positive Z)
    FRONT = 0,

    /// The back face (facing negative Z)
    BACK = 1,

    /// The bottom face (facing negative Y)
    BOTTOM = 2,

    /// The top face (facing positive Y)
    TOP = 3,

    /// The left face (facing negative X)
    LEFT = 4,

    /// The right face (facing positive X)
    RIGHT = 5,
}

/// Number of block faces.
pub const BLOCK_SIDE_COUNT: usize = 6;

impl BlockSide {
    /// Returns an array containing all six block faces in index order.
    pub const fn all() -> [BlockSide; BLOCK_SIDE_COUNT] {
        [
            BlockSide::FRONT,
            BlockSide::BACK,
            BlockSide::BOTTOM,
            BlockSide::TOP,
            BlockSide::LEFT,
            BlockSide::RIGHT,
        ]
    }

    /// Index of this face into per-face arrays.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The axis this face is perpendicular to: 0 = X, 1 = Y, 2 = Z.
    #[inline]
    pub const fn axis(self) -> usize {
        match self {
            BlockSide::LEFT | BlockSide::RIGHT => 0,
            BlockSide::BOTTOM | BlockSide::TOP => 1,
            BlockSide::FRONT | BlockSide::BACK => 2,
        }
    }

    /// Whether the face points along the positive direction of its axis.
    #[inline]
    pub const fn is_positive(self) -> bool {
        matches!(self, BlockSide::FRONT | BlockSide::TOP | BlockSide::RIGHT)
    }

    /// The face pointing the other way along the same axis.
    pub const fn opposite(self) -> BlockSide {
        match self {
            BlockSide::FRONT => BlockSide::BACK,
            BlockSide::BACK => BlockSide::FRONT,
            BlockSide::BOTTOM => BlockSide::TOP,
            BlockSide::TOP => BlockSide::BOTTOM,
            BlockSide::LEFT => BlockSide::RIGHT,
            BlockSide::RIGHT => BlockSide::LEFT,
        }
    }

    /// Unit vector pointing out of the face, in chunk (or block) units.
    ///
    /// Adding it to a chunk position yields the neighbouring chunk that shares this face.
    pub fn normal(self) -> Vector3<i32> {
        let sign = if self.is_positive() { 1 } else { -1 };
        match self.axis() {
            0 => Vector3::new(sign, 0, 0),
            1 => Vector3::new(0, sign, 0),
            _ => Vector3::new(0, 0, sign),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite_normals_cancel() {
        for side in BlockSide::all() {
            assert_eq!(side.opposite().opposite(), side);
            assert_eq!(side.normal() + side.opposite().normal(), Vector3::new(0, 0, 0));
            assert_eq!(side.axis(), side.opposite().axis());
            assert_ne!(side.is_positive(), side.opposite().is_positive());
        }
    }

    #[test]
    fn test_index_matches_order() {
        for (index, side) in BlockSide::all().into_iter().enumerate() {
            assert_eq!(side.index(), index);
        }
        assert_eq!(BlockSide::TOP.normal(), Vector3::new(0, 1, 0));
        assert_eq!(BlockSide::FRONT.normal(), Vector3::new(0, 0, 1));
        assert_eq!(BlockSide::LEFT.normal(), Vector3::new(-1, 0, 0));
    }
}
