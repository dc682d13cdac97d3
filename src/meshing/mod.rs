//! Greedy meshing of chunk block tables.
//!
//! This module converts a chunk's voxels into compact, GPU-friendly quads. Adjacent
//! coplanar faces that share a texture are merged into a single rectangle, which keeps the
//! vertex count of a chunk proportional to its surface complexity rather than its volume.
//!
//! # Architecture
//! - [`Quad`]: one merged rectangle, packed into two 32-bit words
//! - [`ChunkMeshData`]: the quads of one chunk, one list per face direction
//! - [`greedy_mesh`]: the binary greedy mesher, run as the pipeline's terminal stage
//!
//! # Usage
//! ```
//! use cgmath::Point3;
//! use voxel_chunk_pipeline::meshing::greedy_mesh;
//! use voxel_chunk_pipeline::voxels::{
//!     block::{block_type::BlockType, registry::StandardBlockRegistry},
//!     chunk::ChunkBlocks,
//! };
//!
//! let stone = ChunkBlocks::filled(BlockType::STONE.into());
//! let air = ChunkBlocks::empty();
//! let mesh = greedy_mesh(Point3::new(0, 0, 0), &stone, [Some(&air); 6], &StandardBlockRegistry);
//! assert_eq!(mesh.quad_count(), 6);
//! ```

mod greedy;
mod mesh;
mod quad;

pub use greedy::greedy_mesh;
pub use mesh::ChunkMeshData;
pub use quad::Quad;
