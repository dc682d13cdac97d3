//! # Block Registry
//!
//! Read-only lookup from a [`BlockId`] to its [`BlockModel`]. The mesher queries the
//! registry once per occupied voxel from several worker threads at the same time, so
//! implementations must be immutable once the pipeline is running.

use std::collections::HashMap;

use phf::phf_map;

use super::{BlockId, BlockModel};

/// Lookup of block render models.
pub trait BlockRegistry: Send + Sync {
    /// Returns the model registered for `block_id`, if any.
    fn get_model(&self, block_id: BlockId) -> Option<&BlockModel>;

    /// Whether `block_id` has a model. Blocks without one are skipped by the mesher.
    fn has_model(&self, block_id: BlockId) -> bool {
        self.get_model(block_id).is_some()
    }
}

/// Models of the built-in [`BlockType`](super::block_type::BlockType)s.
///
/// Face texture order is [Front, Back, Bottom, Top, Left, Right].
pub static STANDARD_BLOCK_MODELS: phf::Map<u16, BlockModel> = phf_map! {
    1u16 => BlockModel::cube(5),                                // STONE
    2u16 => BlockModel::cube(1),                                // DIRT
    3u16 => BlockModel::cube_with_textures([2, 2, 1, 3, 2, 2]), // GRASS (top: 3, bottom: 1, sides: 2)
};

/// Registry backed by [`STANDARD_BLOCK_MODELS`].
#[derive(Copy, Clone, Debug, Default)]
pub struct StandardBlockRegistry;

impl BlockRegistry for StandardBlockRegistry {
    fn get_model(&self, block_id: BlockId) -> Option<&BlockModel> {
        STANDARD_BLOCK_MODELS.get(&block_id)
    }
}

/// Registry assembled at world setup, e.g. from mod data or in tests.
///
/// # Examples
///
/// ```
/// use voxel_chunk_pipeline::voxels::block::{registry::{BlockRegistry, CustomBlockRegistry}, BlockModel};
///
/// let registry = CustomBlockRegistry::new()
///     .with_model(7, BlockModel::cube(42))
///     .with_model(8, BlockModel::cube(43));
///
/// assert!(registry.has_model(7));
/// assert!(!registry.has_model(0));
/// ```
#[derive(Clone, Debug, Default)]
pub struct CustomBlockRegistry {
    models: HashMap<BlockId, BlockModel>,
}

impl CustomBlockRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry pre-filled with the standard block models.
    pub fn standard() -> Self {
        Self {
            models: STANDARD_BLOCK_MODELS
                .entries()
                .map(|(id, model)| (*id, *model))
                .collect(),
        }
    }

    /// Registers `model` for `block_id`, replacing any previous model.
    ///
    /// # Panics
    /// Panics when `block_id` is `0`; air never has a model.
    pub fn with_model(mut self, block_id: BlockId, model: BlockModel) -> Self {
        assert!(block_id != 0, "air cannot be given a block model");
        self.models.insert(block_id, model);
        self
    }

    /// Number of registered models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether no models are registered.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl BlockRegistry for CustomBlockRegistry {
    fn get_model(&self, block_id: BlockId) -> Option<&BlockModel> {
        self.models.get(&block_id)
    }
}
