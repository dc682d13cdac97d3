//! # Delegator
//!
//! The single coordinating thread of the pipeline. It owns the set of pending work, decides
//! when a stage may run, hands work items to the worker pool and reclaims cache entries of
//! unloaded chunks.
//!
//! ## Events
//! The delegator sleeps on its event channel and wakes for:
//! - `Requests`: load/unload requests queued by callers
//! - `StageCompleted`: a worker stored a stage output, which may unblock pending work
//! - `Shutdown`: the pipeline is stopping
//!
//! Every event already waiting when it wakes is handled in the same pass.
//!
//! ## Pass Order
//! 1. Record completions, so completed keys stop counting as scheduled
//! 2. Re-evaluate pending work. An item whose mandatory prerequisites are all cached is
//!    resolved (leasing every available prerequisite) and dispatched
//! 3. Handle requests. A load schedules the terminal stage and, recursively, every missing
//!    mandatory prerequisite. An unload cancels the position's pending work and marks it
//!    for reclamation, together with every neighbour it may have pulled in as a
//!    prerequisite that is not loaded itself
//! 4. Sweep unloading positions, erasing every entry that is neither leased nor a
//!    mandatory prerequisite of pending work
//!
//! Re-evaluation runs before the sweep, so a freshly completed prerequisite is leased by
//! the work waiting on it before an unload can reclaim it.
//!
//! ## Scheduled Keys
//! A key is *scheduled* from the moment it is queued as pending until its completion is
//! recorded. A key that is cached or scheduled is never scheduled again, which is what
//! makes repeated load requests idempotent and guarantees a key is generated at most once
//! while cached.

use std::{
    collections::{HashSet, VecDeque},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use crossbeam_channel::{Receiver, Sender};
use log::{debug, info, trace, warn};

use super::{
    prerequisites::PrerequisiteTable,
    stage::{SpatialPos, Stage, StageKey},
    stage_cache::{Reclaim, ResolvedPrerequisite, StageCache},
    worker_pool::GenerationWorkItem,
};

/// A request to load or unload one chunk.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct ChunkRequest {
    /// Chunk position.
    pub position: SpatialPos,
    /// `true` to generate the chunk up to the terminal stage, `false` to release it.
    pub load: bool,
}

impl ChunkRequest {
    /// A load request.
    pub fn load(position: SpatialPos) -> Self {
        ChunkRequest {
            position,
            load: true,
        }
    }

    /// An unload request.
    pub fn unload(position: SpatialPos) -> Self {
        ChunkRequest {
            position,
            load: false,
        }
    }
}

/// Messages to the delegator.
#[derive(Debug)]
pub enum DelegatorEvent {
    /// Load/unload requests from a caller.
    Requests(Vec<ChunkRequest>),
    /// A worker stored the output of this key.
    StageCompleted(StageKey),
    /// Stop the delegator.
    Shutdown,
}

/// Counters describing how much work is still outstanding, readable from any thread.
#[derive(Default, Debug)]
pub struct PipelineStatus {
    queued_requests: AtomicUsize,
    scheduled: AtomicUsize,
    unloading: AtomicUsize,
}

impl PipelineStatus {
    /// Records a request batch sent to the delegator.
    pub(crate) fn request_queued(&self) {
        self.queued_requests.fetch_add(1, Ordering::SeqCst);
    }

    /// Reverts [`request_queued`](Self::request_queued) for a batch that was never delivered.
    pub(crate) fn request_dropped(&self) {
        self.queued_requests.fetch_sub(1, Ordering::SeqCst);
    }

    /// Request batches not yet handled by the delegator.
    pub fn queued_requests(&self) -> usize {
        self.queued_requests.load(Ordering::SeqCst)
    }

    /// Keys pending, waiting for a worker or being generated.
    pub fn scheduled(&self) -> usize {
        self.scheduled.load(Ordering::SeqCst)
    }

    /// Unloaded positions whose entries are not all reclaimed yet.
    pub fn unloading(&self) -> usize {
        self.unloading.load(Ordering::SeqCst)
    }

    /// Whether every request has been fully handled.
    pub fn is_idle(&self) -> bool {
        self.queued_requests() == 0 && self.scheduled() == 0 && self.unloading() == 0
    }
}

/// The delegator's state. Run it on its own thread with [`Delegator::run`], or drive it
/// directly with [`Delegator::process`].
pub struct Delegator {
    cache: StageCache,
    table: Arc<PrerequisiteTable>,
    work: Sender<GenerationWorkItem>,
    status: Arc<PipelineStatus>,
    /// Scheduled keys whose mandatory prerequisites were missing at last evaluation.
    pending: VecDeque<StageKey>,
    /// Pending, dispatched and in-flight keys.
    scheduled: HashSet<StageKey>,
    /// Positions with an outstanding load request.
    loaded: HashSet<SpatialPos>,
    unloading: HashSet<SpatialPos>,
}

impl Delegator {
    /// Creates a delegator dispatching work items into `work`.
    pub fn new(
        cache: StageCache,
        table: Arc<PrerequisiteTable>,
        work: Sender<GenerationWorkItem>,
        status: Arc<PipelineStatus>,
    ) -> Self {
        Delegator {
            cache,
            table,
            work,
            status,
            pending: VecDeque::new(),
            scheduled: HashSet::new(),
            loaded: HashSet::new(),
            unloading: HashSet::new(),
        }
    }

    /// Handles events until `Shutdown` arrives or every sender is gone.
    ///
    /// Dropping the delegator on return closes the work channel, which stops the workers
    /// once they have drained it.
    pub fn run(mut self, events: Receiver<DelegatorEvent>) {
        info!("Delegator started");
        while let Ok(first) = events.recv() {
            let batch = std::iter::once(first).chain(events.try_iter());
            if !self.process(batch) {
                break;
            }
        }
        info!(
            "Delegator stopped with {} keys scheduled and {} pending",
            self.scheduled.len(),
            self.pending.len()
        );
    }

    /// Runs one pass over a batch of events.
    ///
    /// # Returns
    /// `false` if the batch contained `Shutdown`, in which case nothing else is handled.
    pub fn process(&mut self, events: impl IntoIterator<Item = DelegatorEvent>) -> bool {
        let mut completions = Vec::new();
        let mut request_batches = Vec::new();

        for event in events {
            match event {
                DelegatorEvent::Requests(requests) => request_batches.push(requests),
                DelegatorEvent::StageCompleted(key) => completions.push(key),
                DelegatorEvent::Shutdown => return false,
            }
        }

        for key in completions {
            self.record_completion(key);
        }

        self.evaluate_pending();

        for request in request_batches.iter().flatten() {
            self.handle_request(*request);
        }

        self.sweep();

        self.status
            .scheduled
            .store(self.scheduled.len(), Ordering::SeqCst);
        self.status
            .unloading
            .store(self.unloading.len(), Ordering::SeqCst);
        self.status
            .queued_requests
            .fetch_sub(request_batches.len(), Ordering::SeqCst);

        true
    }

    fn record_completion(&mut self, key: StageKey) {
        if !self.scheduled.remove(&key) {
            warn!("Completion of {} which was not scheduled", key);
        }
    }

    fn evaluate_pending(&mut self) {
        let waiting = std::mem::take(&mut self.pending);
        let mut still_waiting = VecDeque::with_capacity(waiting.len());

        for key in waiting {
            if let Some(prerequisites) = self.try_resolve(key) {
                self.dispatch(key, prerequisites);
                continue;
            }

            // A prerequisite may have been reclaimed after this key was queued.
            let missing: Vec<StageKey> = self
                .table
                .mandatory_keys(key)
                .filter(|prerequisite| {
                    !self.cache.contains(*prerequisite) && !self.scheduled.contains(prerequisite)
                })
                .collect();
            for prerequisite in missing {
                debug!("Re-requesting {} for {}", prerequisite, key);
                self.ensure(prerequisite);
            }
            still_waiting.push_back(key);
        }

        // Anything `ensure` queued meanwhile was already evaluated once.
        still_waiting.append(&mut self.pending);
        self.pending = still_waiting;
    }

    fn handle_request(&mut self, request: ChunkRequest) {
        let position = request.position;
        if request.load {
            self.loaded.insert(position);
            self.unloading.remove(&position);
            self.ensure(StageKey::new(position, Stage::END));
        } else {
            self.loaded.remove(&position);
            self.unloading.insert(position);
            self.cancel_pending_at(position);

            for offset in self.table.offsets() {
                let neighbour = position + offset;
                if !self.loaded.contains(&neighbour) {
                    self.unloading.insert(neighbour);
                }
            }
        }
    }

    /// Schedules `key` and, first, every missing mandatory prerequisite.
    ///
    /// Prerequisites name strictly earlier stages, so the recursion is bounded by the
    /// number of stages.
    fn ensure(&mut self, key: StageKey) {
        if self.cache.contains(key) || self.scheduled.contains(&key) {
            return;
        }
        self.scheduled.insert(key);

        let prerequisites: Vec<StageKey> = self.table.mandatory_keys(key).collect();
        for prerequisite in prerequisites {
            self.ensure(prerequisite);
        }

        match self.try_resolve(key) {
            Some(resolved) => self.dispatch(key, resolved),
            None => self.pending.push_back(key),
        }
    }

    fn try_resolve(&self, key: StageKey) -> Option<Vec<ResolvedPrerequisite>> {
        self.cache
            .try_resolve(key, self.table.requirements(key.stage))
    }

    fn dispatch(&mut self, key: StageKey, prerequisites: Vec<ResolvedPrerequisite>) {
        debug!("Dispatching {}", key);
        let item = GenerationWorkItem { key, prerequisites };
        if let Err(error) = self.work.send(item) {
            warn!("Worker pool is gone, dropping {}", error.into_inner().key);
        }
    }

    fn cancel_pending_at(&mut self, position: SpatialPos) {
        let scheduled = &mut self.scheduled;
        self.pending.retain(|key| {
            if key.position == position {
                debug!("Cancelled {}", key);
                scheduled.remove(key);
                false
            } else {
                true
            }
        });
    }

    /// Reclaims every unused entry of every unloading position. A position stops unloading
    /// once it has neither entries nor scheduled keys left.
    fn sweep(&mut self) {
        if self.unloading.is_empty() {
            return;
        }

        let table = self.table.as_ref();
        let needed: HashSet<StageKey> = self
            .pending
            .iter()
            .flat_map(|key| table.mandatory_keys(*key))
            .collect();

        let cache = &self.cache;
        let scheduled = &self.scheduled;
        self.unloading.retain(|position| {
            let mut remaining = false;
            for stage in Stage::all() {
                let key = StageKey::new(*position, stage);
                if scheduled.contains(&key) || needed.contains(&key) {
                    remaining = true;
                } else if cache.reclaim(key) == Reclaim::InUse {
                    remaining = true;
                }
            }
            if !remaining {
                trace!("Position {:?} fully unloaded", position);
            }
            remaining
        });
    }

    /// Number of pending keys.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Number of scheduled keys.
    pub fn scheduled_count(&self) -> usize {
        self.scheduled.len()
    }

    /// Whether `position` has an outstanding load request.
    pub fn is_loaded(&self, position: SpatialPos) -> bool {
        self.loaded.contains(&position)
    }

    /// Whether `position` is waiting for its entries to be reclaimed.
    pub fn is_unloading(&self, position: SpatialPos) -> bool {
        self.unloading.contains(&position)
    }
}

#[cfg(test)]
#[path = "delegator_test.rs"]
mod delegator_test;
