use std::sync::atomic::{AtomicUsize, Ordering};

use cgmath::Point3;

use super::*;
use crate::voxels::block::{registry::CustomBlockRegistry, BlockId, BlockState};

/// Registry wrapper counting every model lookup.
struct CountingRegistry {
    inner: CustomBlockRegistry,
    lookups: AtomicUsize,
}

impl CountingRegistry {
    fn new(inner: CustomBlockRegistry) -> Self {
        CountingRegistry {
            inner,
            lookups: AtomicUsize::new(0),
        }
    }

    fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl BlockRegistry for CountingRegistry {
    fn get_model(&self, block_id: BlockId) -> Option<&BlockModel> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.get_model(block_id)
    }
}

const SOLID: BlockState = BlockState::new(1);

fn origin() -> SpatialPos {
    Point3::new(0, 0, 0)
}

fn single_texture_registry() -> CustomBlockRegistry {
    CustomBlockRegistry::new().with_model(1, BlockModel::cube(7))
}

#[test]
fn test_solid_chunk_with_empty_neighbours_emits_one_full_quad_per_face() {
    let registry = single_texture_registry();
    let solid = ChunkBlocks::filled(SOLID);
    let empty = ChunkBlocks::empty();

    let mesh = greedy_mesh(origin(), &solid, [Some(&empty); 6], &registry);

    assert_eq!(mesh.quad_count(), 6);
    for side in BlockSide::all() {
        let quads = mesh.face(side);
        assert_eq!(quads.len(), 1, "{side:?}");
        assert_eq!((quads[0].width(), quads[0].height()), (16, 16), "{side:?}");
        assert_eq!(quads[0].texture(), 7);
    }

    let top = mesh.face(BlockSide::TOP)[0];
    assert_eq!((top.x(), top.y(), top.z()), (0, 15, 0));
    let left = mesh.face(BlockSide::LEFT)[0];
    assert_eq!((left.x(), left.y(), left.z()), (0, 0, 0));
    let front = mesh.face(BlockSide::FRONT)[0];
    assert_eq!(front.z(), 15);
}

#[test]
fn test_empty_chunk_emits_nothing_without_registry_lookups() {
    let registry = CountingRegistry::new(single_texture_registry());
    let solid = ChunkBlocks::filled(SOLID);

    let mesh = greedy_mesh(origin(), &ChunkBlocks::empty(), [Some(&solid); 6], &registry);

    assert!(mesh.is_empty());
    assert_eq!(registry.lookups(), 0);
}

#[test]
fn test_absent_neighbour_hides_faces_but_empty_neighbour_does_not() {
    let registry = single_texture_registry();
    let solid = ChunkBlocks::filled(SOLID);
    let empty = ChunkBlocks::empty();

    let isolated = greedy_mesh(origin(), &solid, [None; 6], &registry);
    assert!(isolated.is_empty());

    let mut neighbours = [None; 6];
    neighbours[BlockSide::TOP.index()] = Some(&empty);
    let open_top = greedy_mesh(origin(), &solid, neighbours, &registry);
    assert_eq!(open_top.quad_count(), 1);
    assert_eq!(open_top.face(BlockSide::TOP).len(), 1);
}

#[test]
fn test_solid_neighbour_occludes_boundary_faces() {
    let registry = single_texture_registry();
    let solid = ChunkBlocks::filled(SOLID);
    let empty = ChunkBlocks::empty();

    let mut neighbours = [Some(&empty); 6];
    neighbours[BlockSide::RIGHT.index()] = Some(&solid);
    let mesh = greedy_mesh(origin(), &solid, neighbours, &registry);

    assert!(mesh.face(BlockSide::RIGHT).is_empty());
    assert_eq!(mesh.quad_count(), 5);
}

#[test]
fn test_checkerboard_textures_are_never_merged() {
    let registry = CustomBlockRegistry::new()
        .with_model(1, BlockModel::cube(10))
        .with_model(2, BlockModel::cube(11))
        .with_model(3, BlockModel::cube(12))
        .with_model(4, BlockModel::cube(13));
    let mut blocks = ChunkBlocks::empty();
    blocks.set(0, 0, 0, BlockState::new(1));
    blocks.set(1, 0, 0, BlockState::new(2));
    blocks.set(0, 0, 1, BlockState::new(3));
    blocks.set(1, 0, 1, BlockState::new(4));
    let empty = ChunkBlocks::empty();

    let mesh = greedy_mesh(origin(), &blocks, [Some(&empty); 6], &registry);

    let top = mesh.face(BlockSide::TOP);
    assert_eq!(top.len(), 4);
    assert!(top.iter().all(|quad| quad.area() == 1));
    let mut textures: Vec<_> = top.iter().map(Quad::texture).collect();
    textures.sort_unstable();
    assert_eq!(textures, vec![10, 11, 12, 13]);
}

#[test]
fn test_uniform_region_merges_into_single_quad() {
    let registry = single_texture_registry();
    let blocks = ChunkBlocks::from_fn(|x, y, z| {
        if y == 0 && x < 4 && z < 4 {
            SOLID
        } else {
            BlockState::AIR
        }
    });
    let empty = ChunkBlocks::empty();

    let mesh = greedy_mesh(origin(), &blocks, [Some(&empty); 6], &registry);

    let top = mesh.face(BlockSide::TOP);
    assert_eq!(top.len(), 1);
    assert_eq!((top[0].width(), top[0].height()), (4, 4));
    assert_eq!((top[0].x(), top[0].y(), top[0].z()), (0, 0, 0));
}

#[test]
fn test_interior_faces_between_textures_are_culled() {
    let registry = CustomBlockRegistry::new()
        .with_model(1, BlockModel::cube(5))
        .with_model(2, BlockModel::cube(1));
    let blocks = ChunkBlocks::from_fn(|_, y, _| BlockState::new(if y < 8 { 1 } else { 2 }));
    let empty = ChunkBlocks::empty();

    let mesh = greedy_mesh(origin(), &blocks, [Some(&empty); 6], &registry);

    assert_eq!(mesh.face(BlockSide::TOP).len(), 1);
    assert_eq!(mesh.face(BlockSide::TOP)[0].texture(), 1);
    assert_eq!(mesh.face(BlockSide::BOTTOM).len(), 1);
    assert_eq!(mesh.face(BlockSide::BOTTOM)[0].texture(), 5);
    for side in [BlockSide::FRONT, BlockSide::BACK, BlockSide::LEFT, BlockSide::RIGHT] {
        assert_eq!(mesh.face(side).len(), 2, "{side:?}");
    }
    assert_eq!(mesh.quad_count(), 10);
}

#[test]
fn test_blocks_without_model_are_skipped_and_do_not_occlude() {
    let registry = single_texture_registry();
    let mut blocks = ChunkBlocks::empty();
    blocks.set(5, 5, 5, SOLID);
    blocks.set(5, 6, 5, BlockState::new(99));
    let empty = ChunkBlocks::empty();

    let mesh = greedy_mesh(origin(), &blocks, [Some(&empty); 6], &registry);

    assert_eq!(mesh.quad_count(), 6);
    let top = mesh.face(BlockSide::TOP)[0];
    assert_eq!((top.x(), top.y(), top.z()), (5, 5, 5));
}

#[test]
fn test_chunk_of_unmodelled_blocks_is_empty() {
    let registry = single_texture_registry();
    let blocks = ChunkBlocks::filled(BlockState::new(42));

    let mesh = greedy_mesh(origin(), &blocks, [None; 6], &registry);

    assert!(mesh.is_empty());
}

#[test]
fn test_per_face_textures_follow_direction() {
    let registry = CustomBlockRegistry::standard();
    let blocks = ChunkBlocks::from_fn(|x, y, z| {
        if (x, y, z) == (0, 0, 0) {
            BlockState::new(3)
        } else {
            BlockState::AIR
        }
    });
    let empty = ChunkBlocks::empty();

    let mesh = greedy_mesh(origin(), &blocks, [Some(&empty); 6], &registry);

    assert_eq!(mesh.face(BlockSide::TOP)[0].texture(), 3);
    assert_eq!(mesh.face(BlockSide::BOTTOM)[0].texture(), 1);
    assert_eq!(mesh.face(BlockSide::FRONT)[0].texture(), 2);
}

#[test]
fn test_merge_stops_at_partial_rows() {
    let mut plane = [0u16; 16];
    plane[0] = 0b0111;
    plane[1] = 0b0111;
    plane[2] = 0b0011;

    let mut rectangles = Vec::new();
    greedy_merge_plane(&mut plane, |u, v, w, h| rectangles.push((u, v, w, h)));

    assert_eq!(rectangles, vec![(0, 0, 3, 2), (0, 2, 2, 1)]);
    assert!(plane.iter().all(|row| *row == 0));
}

#[test]
fn test_merge_handles_full_width_rows() {
    let mut plane = [u16::MAX; 16];

    let mut rectangles = Vec::new();
    greedy_merge_plane(&mut plane, |u, v, w, h| rectangles.push((u, v, w, h)));

    assert_eq!(rectangles, vec![(0, 0, 16, 16)]);
}

#[test]
fn test_quads_carry_the_chunk_position() {
    let registry = single_texture_registry();
    let position = Point3::new(-3, 2, 7);
    let mesh = greedy_mesh(position, &ChunkBlocks::empty(), [None; 6], &registry);
    assert_eq!(mesh.position, position);
}
