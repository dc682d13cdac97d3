//! End-to-end tests of the threaded chunk pipeline.
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
    thread,
    time::Duration,
};

use cgmath::Point3;
use voxel_chunk_pipeline::{
    config::{PipelineConfig, TerrainConfig},
    pipeline::{ChunkPipeline, ChunkRequest, SpatialPos, Stage, StageKey},
    voxels::{block::registry::StandardBlockRegistry, chunk::ChunkBlocks},
};

const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

fn start(worker_count: usize, seed: u32) -> ChunkPipeline {
    let config = PipelineConfig {
        worker_count,
        terrain: TerrainConfig {
            seed,
            ..TerrainConfig::default()
        },
    };
    ChunkPipeline::new(config, Arc::new(StandardBlockRegistry))
}

fn region(radius: i32, height: i32) -> Vec<SpatialPos> {
    let mut positions = Vec::new();
    for x in -radius..=radius {
        for y in -height..height {
            for z in -radius..=radius {
                positions.push(Point3::new(x, y, z));
            }
        }
    }
    positions
}

fn load_all(positions: &[SpatialPos]) -> Vec<ChunkRequest> {
    positions.iter().copied().map(ChunkRequest::load).collect()
}

fn drain_chunks(pipeline: &ChunkPipeline) -> HashMap<SpatialPos, Box<ChunkBlocks>> {
    let mut chunks = HashMap::new();
    pipeline.consume_generated_chunks(
        |chunk| {
            chunks.insert(chunk.position, chunk.blocks);
        },
        usize::MAX,
    );
    chunks
}

#[test]
fn test_region_generates_one_mesh_per_chunk() {
    let pipeline = start(4, 1);
    let positions = region(1, 1);

    pipeline.queue_chunks(&load_all(&positions));
    assert!(pipeline.wait_until_idle(IDLE_TIMEOUT));

    let mut meshed = HashSet::new();
    pipeline.consume_generated_chunk_meshes(
        |mesh| assert!(meshed.insert(mesh.position), "{:?} meshed twice", mesh.position),
        usize::MAX,
    );
    assert_eq!(meshed, positions.iter().copied().collect());
    assert_eq!(drain_chunks(&pipeline).len(), positions.len());
    assert_eq!(pipeline.total_usage(), 0);
    pipeline.shutdown();
}

#[test]
fn test_generation_does_not_depend_on_worker_count() {
    let positions = region(1, 1);

    let single = start(1, 99);
    single.queue_chunks(&load_all(&positions));
    assert!(single.wait_until_idle(IDLE_TIMEOUT));
    let expected = drain_chunks(&single);
    single.shutdown();

    let parallel = start(6, 99);
    parallel.queue_chunks(&load_all(&positions));
    assert!(parallel.wait_until_idle(IDLE_TIMEOUT));
    let actual = drain_chunks(&parallel);
    parallel.shutdown();

    assert_eq!(expected.len(), positions.len());
    assert_eq!(actual, expected);
}

#[test]
fn test_partial_drains_leave_the_rest() {
    let pipeline = start(1, 3);
    let positions = region(1, 1);
    pipeline.queue_chunks(&load_all(&positions));
    assert!(pipeline.wait_until_idle(IDLE_TIMEOUT));

    let mut all_at_once = Vec::new();
    let mut one_by_one = Vec::new();
    pipeline.consume_generated_chunk_meshes(|mesh| one_by_one.push(mesh.position), 1);
    pipeline.consume_generated_chunk_meshes(|mesh| one_by_one.push(mesh.position), 2);
    pipeline.consume_generated_chunk_meshes(|mesh| all_at_once.push(mesh.position), usize::MAX);

    assert_eq!(one_by_one.len(), 3);
    assert_eq!(one_by_one.len() + all_at_once.len(), positions.len());
    assert!(one_by_one.iter().all(|position| !all_at_once.contains(position)));
    pipeline.shutdown();
}

#[test]
fn test_reload_of_generated_region_does_nothing() {
    let pipeline = start(3, 5);
    let positions = region(1, 1);
    pipeline.queue_chunks(&load_all(&positions));
    assert!(pipeline.wait_until_idle(IDLE_TIMEOUT));
    let cached = pipeline.cached_entry_count();
    let meshes = pipeline.consume_generated_chunk_meshes(|_| {}, usize::MAX);

    pipeline.queue_chunks(&load_all(&positions));
    assert!(pipeline.wait_until_idle(IDLE_TIMEOUT));

    assert_eq!(meshes, positions.len());
    assert_eq!(pipeline.cached_entry_count(), cached);
    assert_eq!(pipeline.consume_generated_chunk_meshes(|_| {}, usize::MAX), 0);
    pipeline.shutdown();
}

#[test]
fn test_unloading_everything_empties_the_cache() {
    let pipeline = start(4, 11);
    let positions = region(1, 1);
    pipeline.queue_chunks(&load_all(&positions));
    assert!(pipeline.wait_until_idle(IDLE_TIMEOUT));

    let unloads: Vec<ChunkRequest> = positions.iter().copied().map(ChunkRequest::unload).collect();
    pipeline.queue_chunks(&unloads);
    assert!(pipeline.wait_until_idle(IDLE_TIMEOUT));

    assert_eq!(pipeline.cached_entry_count(), 0);
    pipeline.shutdown();
}

#[test]
fn test_random_load_unload_sequences() {
    for seed in [1, 2, 3, 4] {
        let mut rng = fastrand::Rng::with_seed(seed);
        let pipeline = start(4, seed as u32);
        let positions = region(2, 1);
        let mut loaded = HashSet::new();

        for _ in 0..40 {
            let batch: Vec<ChunkRequest> = (0..rng.usize(1..8))
                .map(|_| {
                    let position = positions[rng.usize(..positions.len())];
                    if rng.u8(..3) == 0 {
                        loaded.remove(&position);
                        ChunkRequest::unload(position)
                    } else {
                        loaded.insert(position);
                        ChunkRequest::load(position)
                    }
                })
                .collect();
            pipeline.queue_chunks(&batch);

            pipeline.consume_generated_chunk_meshes(|_| {}, rng.usize(..4));
            if rng.bool() {
                thread::sleep(Duration::from_micros(rng.u64(..500)));
            }
        }

        assert!(pipeline.wait_until_idle(IDLE_TIMEOUT), "seed {seed} did not settle");
        assert_eq!(pipeline.total_usage(), 0, "seed {seed}");

        for position in &positions {
            let key = |stage| StageKey::new(*position, stage);
            if loaded.contains(position) {
                assert!(pipeline.cache_contains(key(Stage::Mesh)), "{position:?} not meshed");
                continue;
            }
            for stage in [Stage::Topsoil, Stage::Surface, Stage::Mesh] {
                assert!(!pipeline.cache_contains(key(stage)), "{position:?} kept {stage}");
            }
            let below = *position - cgmath::Vector3::new(0, 1, 0);
            if !loaded.contains(&below) {
                assert!(!pipeline.cache_contains(key(Stage::StoneMap)), "{position:?} kept stone");
            }
        }

        pipeline.shutdown();
    }
}
