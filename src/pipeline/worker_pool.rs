//! # Worker Pool
//!
//! A fixed set of named threads that take [`GenerationWorkItem`]s off a shared channel and
//! run them. Ownership of an item moves from the delegator to exactly one worker through
//! the channel, so an item is never executed twice.
//!
//! For each item a worker:
//! 1. Runs the stage's generator from [`STAGE_GENERATORS`]
//! 2. Stores the output in the stage cache (panicking if the key already exists)
//! 3. Drops the prerequisite leases, which is what lets those entries be reclaimed
//! 4. Publishes chunks and meshes to the output queues
//! 5. Tells the delegator the stage completed
//!
//! Workers stop when the work channel closes, which happens once the delegator is dropped.

use std::{
    any::Any,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
};

use crossbeam_channel::{Receiver, Sender};
use log::{debug, info, warn};
use web_time::Instant;

use crate::{meshing::ChunkMeshData, voxels::block::registry::BlockRegistry};

use super::{
    delegator::DelegatorEvent,
    generation::{StageContext, StageOutput, TerrainNoise, STAGE_GENERATORS},
    output_queue::{GeneratedChunk, OutputQueue},
    stage::StageKey,
    stage_cache::{ResolvedPrerequisite, StageCache, StagePayload},
};

/// A stage ready to run, holding leases on everything it reads.
#[derive(Debug)]
pub struct GenerationWorkItem {
    /// The output to generate.
    pub key: StageKey,
    /// One entry per requirement of the stage, in table order.
    pub prerequisites: Vec<ResolvedPrerequisite>,
}

/// State every worker reads or publishes into.
pub(crate) struct WorkerShared {
    pub cache: StageCache,
    pub registry: Arc<dyn BlockRegistry>,
    pub terrain: TerrainNoise,
    pub generated_chunks: OutputQueue<GeneratedChunk>,
    pub generated_meshes: OutputQueue<ChunkMeshData>,
    pub events: Sender<DelegatorEvent>,
    pub running: Arc<AtomicBool>,
}

/// Runs one work item to completion on the calling thread.
pub(crate) fn execute(shared: &WorkerShared, item: GenerationWorkItem) {
    let GenerationWorkItem { key, prerequisites } = item;
    let started = Instant::now();

    let output = {
        let context = StageContext {
            key,
            prerequisites: &prerequisites,
            registry: shared.registry.as_ref(),
            terrain: &shared.terrain,
        };
        STAGE_GENERATORS[key.stage.index()](&context)
    };

    match output {
        StageOutput::Blocks(blocks) => {
            let published = key.stage.completes_terrain().then(|| blocks.clone());
            shared.cache.insert(key, StagePayload::Blocks(blocks));
            drop(prerequisites);
            if let Some(blocks) = published {
                shared.generated_chunks.push(GeneratedChunk {
                    position: key.position,
                    blocks,
                });
            }
        }
        StageOutput::Mesh(mesh) => {
            shared.cache.insert(key, StagePayload::Meshed);
            drop(prerequisites);
            shared.generated_meshes.push(mesh);
        }
    }

    // The delegator is only gone during shutdown, when nothing waits for completions.
    let _ = shared.events.send(DelegatorEvent::StageCompleted(key));

    debug!(
        "Generated {} in {:.3}ms",
        key,
        started.elapsed().as_secs_f64() * 1000.0
    );
}

/// Owns the worker threads.
pub(crate) struct WorkerPool {
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Starts `worker_count` workers receiving from `work`.
    ///
    /// # Panics
    /// Panics if a thread cannot be spawned.
    pub fn spawn(
        worker_count: usize,
        work: Receiver<GenerationWorkItem>,
        shared: Arc<WorkerShared>,
    ) -> Self {
        info!("Starting {} chunk workers", worker_count);

        let workers = (0..worker_count)
            .map(|index| {
                let work = work.clone();
                let shared = shared.clone();
                thread::Builder::new()
                    .name(format!("chunk-worker-{index}"))
                    .spawn(move || worker_loop(&work, &shared))
                    .unwrap_or_else(|error| {
                        panic!("Failed to spawn chunk worker {index}: {error}")
                    })
            })
            .collect();

        WorkerPool { workers }
    }

    /// Waits for every worker to exit.
    ///
    /// # Returns
    /// The panic payload of the first worker that panicked, if any.
    pub fn join(self) -> Option<Box<dyn Any + Send + 'static>> {
        let mut first_panic = None;
        for worker in self.workers {
            if let Err(payload) = worker.join() {
                first_panic.get_or_insert(payload);
            }
        }
        first_panic
    }
}

fn worker_loop(work: &Receiver<GenerationWorkItem>, shared: &WorkerShared) {
    while let Ok(item) = work.recv() {
        if !shared.running.load(Ordering::SeqCst) {
            warn!("Dropping {} at shutdown", item.key);
            continue;
        }
        execute(shared, item);
    }
}
