//! # Chunk Pipeline Demo
//!
//! Generates a cube of chunks around the origin, drains both output queues and logs what
//! was produced.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- [config.json]
//! ```

use std::{path::Path, sync::Arc, time::Duration};

use anyhow::{bail, Result};
use cgmath::Point3;
use log::info;
use voxel_chunk_pipeline::{
    init_logging, ChunkPipeline, ChunkRequest, PipelineConfig, StandardBlockRegistry,
};
use web_time::Instant;

/// Chunks generated in each direction from the origin.
const LOAD_RADIUS: i32 = 3;

const IDLE_TIMEOUT: Duration = Duration::from_secs(120);

fn main() -> Result<()> {
    init_logging();

    let config = match std::env::args().nth(1) {
        Some(path) => PipelineConfig::from_file(Path::new(&path))?,
        None => PipelineConfig::default(),
    };
    info!("Using {:?}", config);

    let pipeline = ChunkPipeline::new(config, Arc::new(StandardBlockRegistry));

    let mut requests = Vec::new();
    for x in -LOAD_RADIUS..=LOAD_RADIUS {
        for y in -LOAD_RADIUS..=LOAD_RADIUS {
            for z in -LOAD_RADIUS..=LOAD_RADIUS {
                requests.push(ChunkRequest::load(Point3::new(x, y, z)));
            }
        }
    }

    let started = Instant::now();
    pipeline.queue_chunks(&requests);

    let mut chunks = 0;
    let mut solid_voxels = 0;
    let mut meshes = 0;
    let mut quads = 0;
    loop {
        let idle = pipeline.is_idle();
        pipeline.consume_generated_chunks(
            |chunk| {
                chunks += 1;
                solid_voxels += chunk.blocks.occupied_count();
            },
            usize::MAX,
        );
        pipeline.consume_generated_chunk_meshes(
            |mesh| {
                meshes += 1;
                quads += mesh.quad_count();
            },
            usize::MAX,
        );
        if idle {
            break;
        }
        if started.elapsed() > IDLE_TIMEOUT {
            bail!("Pipeline did not finish within {:?}", IDLE_TIMEOUT);
        }
        std::thread::sleep(Duration::from_millis(5));
    }

    info!(
        "Generated {} chunks ({} solid voxels) and {} meshes ({} quads) in {:.1}ms",
        chunks,
        solid_voxels,
        meshes,
        quads,
        started.elapsed().as_secs_f64() * 1000.0
    );
    info!("{} stage outputs cached", pipeline.cached_entry_count());

    pipeline.shutdown();
    Ok(())
}
