//! # Output Queues
//!
//! FIFO queues through which workers hand finished chunks and meshes to consumers.
//!
//! Each queue has its own lock, independent of the stage cache, so a slow consumer never
//! holds up generation. [`OutputQueue::consume`] moves a batch out while holding the lock
//! and runs the handler only after releasing it, so the handler may take as long as it
//! likes without blocking producers.

use std::collections::VecDeque;

use crate::{core::MtResource, voxels::chunk::ChunkBlocks};

use super::stage::SpatialPos;

/// A chunk whose terrain stages are complete.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedChunk {
    /// Chunk position.
    pub position: SpatialPos,
    /// Final block table.
    pub blocks: Box<ChunkBlocks>,
}

/// Thread-safe FIFO queue. Clones refer to the same queue.
pub struct OutputQueue<T: Send + Sync> {
    items: MtResource<VecDeque<T>>,
}

impl<T: Send + Sync> OutputQueue<T> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        OutputQueue {
            items: MtResource::new(VecDeque::new()),
        }
    }

    /// Appends an item.
    pub fn push(&self, item: T) {
        self.items.get_mut().push_back(item);
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        self.items.get().len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.items.get().is_empty()
    }

    /// Removes up to `max_count` items in insertion order and passes each to `handler`.
    ///
    /// # Returns
    /// The number of items handled.
    pub fn consume(&self, mut handler: impl FnMut(T), max_count: usize) -> usize {
        let batch: Vec<T> = {
            let mut items = self.items.get_mut();
            let count = max_count.min(items.len());
            items.drain(..count).collect()
        };

        let handled = batch.len();
        batch.into_iter().for_each(&mut handler);
        handled
    }
}

impl<T: Send + Sync> Default for OutputQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + Sync> Clone for OutputQueue<T> {
    fn clone(&self) -> Self {
        OutputQueue {
            items: self.items.clone(),
        }
    }
}

#[cfg(test)]
#[path = "output_queue_test.rs"]
mod output_queue_test;
