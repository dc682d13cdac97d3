use super::chunk_creation::ChunkBuilder;
use super::*;
use crate::voxels::block::block_type::BlockType;

#[test]
fn test_index_layout_is_x_fastest() {
    assert_eq!(ChunkBlocks::index(0, 0, 0), 0);
    assert_eq!(ChunkBlocks::index(1, 0, 0), 1);
    assert_eq!(ChunkBlocks::index(0, 1, 0), 16);
    assert_eq!(ChunkBlocks::index(0, 0, 1), 256);
    assert_eq!(ChunkBlocks::index(15, 15, 15), CHUNK_SIZE - 1);
    assert_eq!(ChunkBlocks::position_of(16 + 256 * 3 + 5), Point3::new(5, 1, 3));
}

#[test]
fn test_empty_and_filled() {
    let empty = ChunkBlocks::empty();
    assert!(empty.is_empty());
    assert_eq!(empty.occupied_count(), 0);
    assert_eq!(empty.iter_occupied().count(), 0);

    let stone = ChunkBlocks::filled(BlockType::STONE.into());
    assert!(!stone.is_empty());
    assert_eq!(stone.occupied_count(), CHUNK_SIZE);
    assert_eq!(stone.get(3, 7, 11), BlockState::from(BlockType::STONE));
}

#[test]
fn test_set_keeps_occupancy_in_sync() {
    let mut blocks = ChunkBlocks::empty();
    blocks.set(1, 2, 3, BlockType::DIRT.into());
    assert!(blocks.is_occupied(1, 2, 3));
    assert_eq!(blocks.occupied_count(), 1);

    blocks.set(1, 2, 3, BlockState::AIR);
    assert!(!blocks.is_occupied(1, 2, 3));
    assert!(blocks.is_empty());
}

#[test]
fn test_iter_occupied_visits_in_index_order() {
    let mut blocks = ChunkBlocks::empty();
    blocks.set(0, 0, 1, BlockType::GRASS.into());
    blocks.set(4, 0, 0, BlockType::STONE.into());

    let visited: Vec<_> = blocks.iter_occupied().collect();
    assert_eq!(
        visited,
        vec![
            (Point3::new(4, 0, 0), BlockType::STONE.into()),
            (Point3::new(0, 0, 1), BlockType::GRASS.into()),
        ]
    );
}

#[test]
fn test_from_fn_matches_builder_order() {
    let blocks = ChunkBlocks::from_fn(|x, y, _| {
        if x == y {
            BlockType::STONE.into()
        } else {
            BlockState::AIR
        }
    });
    assert_eq!(blocks.occupied_count(), CHUNK_PLANE_SIZE);
    assert!(blocks.is_occupied(5, 5, 9));
    assert!(!blocks.is_occupied(5, 6, 9));
}

#[test]
fn test_builder_tracks_next_position() {
    let mut builder = ChunkBuilder::new();
    for _ in 0..CHUNK_DIMENSION + 1 {
        builder.push_block(BlockState::AIR);
    }
    assert_eq!(builder.next_position(), Point3::new(1, 1, 0));
}

#[test]
#[should_panic(expected = "chunk finished with")]
fn test_builder_rejects_partial_table() {
    let mut builder = ChunkBuilder::new();
    builder.push_block(BlockState::AIR);
    builder.finish();
}

#[test]
fn test_as_bytes_covers_whole_table() {
    let blocks = ChunkBlocks::filled(BlockState::new(0x0102));
    let bytes = blocks.as_bytes();
    assert_eq!(bytes.len(), CHUNK_SIZE * std::mem::size_of::<BlockState>());
}
