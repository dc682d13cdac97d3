//! # Block Type Module
//!
//! This module defines the built-in block types the terrain stages place.

use num_derive::FromPrimitive;

use super::BlockId;

/// Enumerates the block types produced by terrain generation.
///
/// The discriminant is the block's [`BlockId`]. Other ids may exist in a custom
/// registry; they simply have no `BlockType` counterpart.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum BlockType {
    /// Empty space. Never has a model and never produces faces.
    AIR = 0,

    /// Bulk rock laid down by the stone map stage.
    STONE = 1,

    /// Soil near the surface, converted from stone by the topsoil stage.
    DIRT = 2,

    /// Dirt exposed to air from above.
    /// The top is green, the sides carry a grass fringe, the bottom is plain dirt.
    GRASS = 3,
}

impl BlockType {
    /// Converts a raw [`BlockId`] to a `BlockType`.
    ///
    /// # Returns
    /// `None` for ids that are not built-in block types.
    pub fn from_id(id: BlockId) -> Option<Self> {
        num_traits::FromPrimitive::from_u16(id)
    }

    /// The raw id stored in chunk tables.
    #[inline]
    pub const fn id(self) -> BlockId {
        self as BlockId
    }
}
