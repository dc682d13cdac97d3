#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Chunk Pipeline
//!
//! Concurrent, dependency-driven generation of voxel terrain chunks and their meshes.
//!
//! Chunks are produced in stages (stone map, topsoil, surface, mesh). Each stage of a chunk
//! may read earlier stages of the chunk itself and of its neighbours, so a chunk is only
//! generated once everything it depends on exists. A delegator thread tracks those
//! dependencies and hands runnable stages to a pool of workers; finished chunks and meshes
//! are drained by the caller from FIFO output queues.
//!
//! ## Key Modules
//!
//! * `config` - Pipeline and terrain settings, loadable from JSON
//! * `core` - Shared-state primitives
//! * `voxels` - Block definitions and the per-chunk block tables
//! * `meshing` - The binary greedy mesher
//! * `pipeline` - Stages, the stage cache, the delegator and the worker pool
//!
//! ## Usage
//!
//! ```rust
//! use std::{sync::Arc, time::Duration};
//!
//! use cgmath::Point3;
//! use voxel_chunk_pipeline::{
//!     ChunkPipeline, ChunkRequest, PipelineConfig, StandardBlockRegistry,
//! };
//!
//! let pipeline = ChunkPipeline::new(PipelineConfig::with_workers(2), Arc::new(StandardBlockRegistry));
//! let requests: Vec<ChunkRequest> = (-1..=1)
//!     .map(|x| ChunkRequest::load(Point3::new(x, 0, 0)))
//!     .collect();
//! pipeline.queue_chunks(&requests);
//! assert!(pipeline.wait_until_idle(Duration::from_secs(30)));
//!
//! let mut quads = 0;
//! pipeline.consume_generated_chunk_meshes(|mesh| quads += mesh.quad_count(), usize::MAX);
//! println!("{quads} quads");
//! pipeline.shutdown();
//! ```

pub mod config;
pub mod core;
pub mod meshing;
pub mod pipeline;
pub mod voxels;

pub use config::{PipelineConfig, TerrainConfig};
pub use meshing::{greedy_mesh, ChunkMeshData, Quad};
pub use pipeline::{ChunkPipeline, ChunkRequest, GeneratedChunk, SpatialPos, Stage, StageKey};
pub use voxels::{
    block::registry::{BlockRegistry, CustomBlockRegistry, StandardBlockRegistry},
    chunk::ChunkBlocks,
};

/// Sends log records to stdout, filtered by the `RUST_LOG` environment variable.
///
/// Calling it more than once is harmless; only the first call installs the logger.
pub fn init_logging() {
    let mut log_builder = env_logger::Builder::new();
    let _ = log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .try_init();
}
