//! # Chunk Generation Pipeline
//!
//! Generates chunks in dependency-ordered stages on a pool of worker threads.
//!
//! ## Components
//!
//! * [`Stage`] / [`StageKey`]: the ordered generation stages and the `(position, stage)`
//!   keys their outputs are stored under
//! * [`PrerequisiteTable`]: which outputs, at which neighbouring positions, each stage
//!   reads
//! * [`StageCache`]: the shared store of stage outputs with per-entry usage counts
//! * [`Delegator`]: the coordinating thread deciding what may run and what may be freed
//! * Worker pool: threads running the stage generators
//! * [`OutputQueue`]: FIFO queues through which finished chunks and meshes leave the
//!   pipeline
//!
//! ## Threads
//!
//! ```text
//! caller --Requests--> delegator --work items--> workers
//!                          ^                        |
//!                          +----StageCompleted------+
//!                                                   v
//! consumer <------------------------------ output queues
//! ```
//!
//! [`ChunkPipeline`] owns all of it. Requests may be queued and results consumed from any
//! thread.
//!
//! ## Example
//!
//! ```rust
//! use std::{sync::Arc, time::Duration};
//!
//! use cgmath::Point3;
//! use voxel_chunk_pipeline::{
//!     config::PipelineConfig,
//!     pipeline::{ChunkPipeline, ChunkRequest},
//!     voxels::block::registry::StandardBlockRegistry,
//! };
//!
//! let pipeline = ChunkPipeline::new(PipelineConfig::with_workers(2), Arc::new(StandardBlockRegistry));
//! pipeline.queue_chunks(&[ChunkRequest::load(Point3::new(0, 0, 0))]);
//! assert!(pipeline.wait_until_idle(Duration::from_secs(30)));
//!
//! let mut meshes = 0;
//! pipeline.consume_generated_chunk_meshes(|_mesh| meshes += 1, usize::MAX);
//! assert_eq!(meshes, 1);
//! pipeline.shutdown();
//! ```

mod delegator;
mod generation;
mod output_queue;
mod prerequisites;
mod stage;
mod stage_cache;
mod worker_pool;

use std::{
    any::Any,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use crossbeam_channel::{unbounded, Sender};
use log::{error, info, warn};
use web_time::Instant;

use crate::{
    config::PipelineConfig, meshing::ChunkMeshData, voxels::block::registry::BlockRegistry,
};

pub use delegator::{ChunkRequest, Delegator, DelegatorEvent, PipelineStatus};
pub use generation::{
    StageContext, StageGenerator, StageOutput, TerrainNoise, STAGE_GENERATORS, TOPSOIL_DEPTH,
};
pub use output_queue::{GeneratedChunk, OutputQueue};
pub use prerequisites::{PrerequisiteTable, Requirement};
pub use stage::{SpatialPos, Stage, StageKey};
pub use stage_cache::{
    PrerequisiteLease, Reclaim, ResolvedPrerequisite, StageCache, StageCacheEntry, StagePayload,
};
pub use worker_pool::GenerationWorkItem;

use worker_pool::{WorkerPool, WorkerShared};

/// Interval at which [`ChunkPipeline::wait_until_idle`] polls.
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// The running pipeline: a delegator thread, its worker pool and the output queues.
///
/// Dropping the pipeline shuts it down. Use [`shutdown`](Self::shutdown) instead to have a
/// worker panic propagate to the caller.
pub struct ChunkPipeline {
    cache: StageCache,
    status: Arc<PipelineStatus>,
    running: Arc<AtomicBool>,
    events: Sender<DelegatorEvent>,
    generated_chunks: OutputQueue<GeneratedChunk>,
    generated_meshes: OutputQueue<ChunkMeshData>,
    delegator: Option<JoinHandle<()>>,
    workers: Option<WorkerPool>,
}

impl ChunkPipeline {
    /// Starts a pipeline with the standard prerequisite table.
    ///
    /// # Arguments
    /// * `config` - Worker count and terrain settings
    /// * `registry` - Block models used when meshing. Must not change while the pipeline runs
    ///
    /// # Panics
    /// Panics if `config.worker_count` is zero or a thread cannot be spawned.
    pub fn new(config: PipelineConfig, registry: Arc<dyn BlockRegistry>) -> Self {
        Self::with_table(config, registry, PrerequisiteTable::standard())
    }

    /// Starts a pipeline with a custom prerequisite table.
    ///
    /// # Panics
    /// Panics if `config.worker_count` is zero, `table` is invalid or a thread cannot be
    /// spawned.
    pub fn with_table(
        config: PipelineConfig,
        registry: Arc<dyn BlockRegistry>,
        table: PrerequisiteTable,
    ) -> Self {
        assert!(config.worker_count > 0, "worker_count must be positive");
        table.validate();

        let cache = StageCache::new();
        let status = Arc::new(PipelineStatus::default());
        let running = Arc::new(AtomicBool::new(true));
        let generated_chunks = OutputQueue::new();
        let generated_meshes = OutputQueue::new();
        let (events_tx, events_rx) = unbounded();
        let (work_tx, work_rx) = unbounded();

        let shared = Arc::new(WorkerShared {
            cache: cache.clone(),
            registry,
            terrain: TerrainNoise::new(config.terrain.clone()),
            generated_chunks: generated_chunks.clone(),
            generated_meshes: generated_meshes.clone(),
            events: events_tx.clone(),
            running: running.clone(),
        });
        let workers = WorkerPool::spawn(config.worker_count, work_rx, shared);

        let delegator = Delegator::new(cache.clone(), Arc::new(table), work_tx, status.clone());
        let delegator = thread::Builder::new()
            .name("chunk-delegator".to_string())
            .spawn(move || delegator.run(events_rx))
            .unwrap_or_else(|error| panic!("Failed to spawn chunk delegator: {error}"));

        info!(
            "Chunk pipeline started with {} workers",
            config.worker_count
        );

        ChunkPipeline {
            cache,
            status,
            running,
            events: events_tx,
            generated_chunks,
            generated_meshes,
            delegator: Some(delegator),
            workers: Some(workers),
        }
    }

    /// Queues load and unload requests. Requests are handled in order.
    pub fn queue_chunks(&self, requests: &[ChunkRequest]) {
        if requests.is_empty() {
            return;
        }
        self.status.request_queued();
        if self
            .events
            .send(DelegatorEvent::Requests(requests.to_vec()))
            .is_err()
        {
            self.status.request_dropped();
            warn!("Delegator is gone, dropping {} requests", requests.len());
        }
    }

    /// Hands up to `max_count` finished terrain chunks to `handler`, oldest first.
    ///
    /// # Returns
    /// The number of chunks handled.
    pub fn consume_generated_chunks(
        &self,
        handler: impl FnMut(GeneratedChunk),
        max_count: usize,
    ) -> usize {
        self.generated_chunks.consume(handler, max_count)
    }

    /// Hands up to `max_count` finished meshes to `handler`, oldest first.
    ///
    /// # Returns
    /// The number of meshes handled.
    pub fn consume_generated_chunk_meshes(
        &self,
        handler: impl FnMut(ChunkMeshData),
        max_count: usize,
    ) -> usize {
        self.generated_meshes.consume(handler, max_count)
    }

    /// Whether every queued request has been fully handled: nothing is scheduled and every
    /// unloaded chunk has been reclaimed.
    pub fn is_idle(&self) -> bool {
        self.status.is_idle()
    }

    /// Blocks until the pipeline is idle or `timeout` passes.
    ///
    /// # Returns
    /// Whether the pipeline became idle.
    pub fn wait_until_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while !self.is_idle() {
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(IDLE_POLL_INTERVAL);
        }
        true
    }

    /// Outstanding work counters.
    pub fn status(&self) -> &PipelineStatus {
        &self.status
    }

    /// Whether the output of `key` is cached.
    pub fn cache_contains(&self, key: StageKey) -> bool {
        self.cache.contains(key)
    }

    /// Number of cached stage outputs.
    pub fn cached_entry_count(&self) -> usize {
        self.cache.len()
    }

    /// Usage count of `key`'s cache entry, or `None` if it is not cached.
    pub fn usage_count(&self, key: StageKey) -> Option<usize> {
        self.cache.usage_count(key)
    }

    /// Sum of the usage counts of every cache entry.
    pub fn total_usage(&self) -> usize {
        self.cache.total_usage()
    }

    /// Stops every thread and waits for them. Work not yet started is dropped.
    ///
    /// # Panics
    /// Resumes the panic of any pipeline thread that panicked.
    pub fn shutdown(mut self) {
        if let Some(payload) = self.stop() {
            std::panic::resume_unwind(payload);
        }
    }

    fn stop(&mut self) -> Option<Box<dyn Any + Send + 'static>> {
        let delegator = self.delegator.take()?;

        self.running.store(false, Ordering::SeqCst);
        let _ = self.events.send(DelegatorEvent::Shutdown);

        // The delegator owns the work sender, so the workers exit once it has returned.
        let delegator_panic = delegator.join().err();
        let worker_panic = self.workers.take().and_then(WorkerPool::join);

        info!("Chunk pipeline stopped");
        delegator_panic.or(worker_panic)
    }
}

impl Drop for ChunkPipeline {
    fn drop(&mut self) {
        if self.stop().is_some() {
            error!("A chunk pipeline thread panicked");
        }
    }
}
