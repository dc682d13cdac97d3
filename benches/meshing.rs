/// Benchmarks of the greedy mesher on representative chunks
use cgmath::Point3;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use noise::{NoiseFn, Perlin};
use voxel_chunk_pipeline::{
    meshing::greedy_mesh,
    voxels::{
        block::{block_type::BlockType, registry::StandardBlockRegistry, BlockState},
        chunk::ChunkBlocks,
    },
};

fn hills() -> ChunkBlocks {
    let perlin = Perlin::new(0);
    ChunkBlocks::from_fn(|x, y, z| {
        let height = 8.0 + perlin.get([x as f64 * 0.1, z as f64 * 0.1]) * 6.0;
        if (y as f64) < height - 1.0 {
            BlockType::STONE.into()
        } else if (y as f64) < height {
            BlockType::GRASS.into()
        } else {
            BlockState::AIR
        }
    })
}

fn bench_mesh_empty(c: &mut Criterion) {
    let chunk = ChunkBlocks::empty();
    c.bench_function("mesh_empty", |b| {
        b.iter(|| {
            greedy_mesh(
                Point3::new(0, 0, 0),
                black_box(&chunk),
                [None; 6],
                &StandardBlockRegistry,
            )
        });
    });
}

fn bench_mesh_solid(c: &mut Criterion) {
    let chunk = ChunkBlocks::filled(BlockType::STONE.into());
    let air = ChunkBlocks::empty();
    c.bench_function("mesh_solid", |b| {
        b.iter(|| {
            greedy_mesh(
                Point3::new(0, 0, 0),
                black_box(&chunk),
                [Some(&air); 6],
                &StandardBlockRegistry,
            )
        });
    });
}

fn bench_mesh_checkerboard(c: &mut Criterion) {
    let chunk = ChunkBlocks::from_fn(|x, y, z| {
        if (x + y + z) % 2 == 0 {
            BlockType::DIRT.into()
        } else {
            BlockState::AIR
        }
    });
    c.bench_function("mesh_checkerboard", |b| {
        b.iter(|| {
            greedy_mesh(
                Point3::new(0, 0, 0),
                black_box(&chunk),
                [None; 6],
                &StandardBlockRegistry,
            )
        });
    });
}

fn bench_mesh_hills(c: &mut Criterion) {
    let chunk = hills();
    let air = ChunkBlocks::empty();
    let stone = ChunkBlocks::filled(BlockType::STONE.into());
    let neighbours = [Some(&air), Some(&air), Some(&stone), Some(&air), Some(&air), Some(&air)];
    c.bench_function("mesh_hills", |b| {
        b.iter(|| {
            greedy_mesh(
                Point3::new(0, 0, 0),
                black_box(&chunk),
                neighbours,
                &StandardBlockRegistry,
            )
        });
    });
}

criterion_group!(
    benches,
    bench_mesh_empty,
    bench_mesh_solid,
    bench_mesh_checkerboard,
    bench_mesh_hills
);
criterion_main!(benches);
