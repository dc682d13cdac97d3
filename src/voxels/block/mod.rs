//! # Block Module
//!
//! This module provides the block-level data the pipeline works with: the per-voxel
//! [`BlockState`], the face directions, the built-in block types and the read-only
//! model registry the mesher queries.

pub mod block_side;
pub mod block_type;
pub mod registry;

use block_side::{BlockSide, BLOCK_SIDE_COUNT};

/// The underlying integer type used to identify block types in chunk tables.
pub type BlockId = u16;

/// Identifier of a texture in the renderer's atlas.
///
/// Quads store it in the low 16 bits of their first word, so it is a `u16`.
pub type TextureId = u16;

/// One voxel's assigned block.
///
/// # Memory Layout
/// The `#[repr(C)]` attribute keeps the layout stable so whole tables can be viewed as
/// plain bytes with `bytemuck`.
#[repr(C)]
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default, bytemuck::Pod, bytemuck::Zeroable, Debug)]
pub struct BlockState {
    /// The block occupying the voxel. `0` is air.
    pub block_id: BlockId,
}

impl BlockState {
    /// The empty voxel.
    pub const AIR: BlockState = BlockState { block_id: 0 };

    /// Creates a block state holding `block_id`.
    pub const fn new(block_id: BlockId) -> Self {
        BlockState { block_id }
    }

    /// Whether this voxel holds anything at all.
    #[inline]
    pub const fn is_air(self) -> bool {
        self.block_id == 0
    }
}

impl From<block_type::BlockType> for BlockState {
    fn from(block_type: block_type::BlockType) -> Self {
        BlockState::new(block_type.id())
    }
}

/// Render description of a block: which faces occlude and which texture each face shows.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BlockModel {
    /// Bit `i` is set when the face with [`BlockSide::index`] `i` is solid.
    pub solid_faces: u8,
    /// Texture for each face, indexed by [`BlockSide::index`].
    pub textures: [TextureId; BLOCK_SIDE_COUNT],
}

impl BlockModel {
    /// All six faces solid.
    pub const ALL_FACES_SOLID: u8 = 0b0011_1111;

    /// A solid cube showing the same texture on every face.
    pub const fn cube(texture: TextureId) -> Self {
        BlockModel {
            solid_faces: Self::ALL_FACES_SOLID,
            textures: [texture; BLOCK_SIDE_COUNT],
        }
    }

    /// A solid cube with one texture per face, in [`BlockSide`] order.
    pub const fn cube_with_textures(textures: [TextureId; BLOCK_SIDE_COUNT]) -> Self {
        BlockModel {
            solid_faces: Self::ALL_FACES_SOLID,
            textures,
        }
    }

    /// Whether the given face of this block is solid.
    #[inline]
    pub const fn is_solid_on(&self, side: BlockSide) -> bool {
        self.solid_faces & (1 << side as u8) != 0
    }

    /// Texture shown on the given face.
    #[inline]
    pub const fn texture(&self, side: BlockSide) -> TextureId {
        self.textures[side as usize]
    }
}
