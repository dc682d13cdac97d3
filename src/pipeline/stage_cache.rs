//! # Stage Cache
//!
//! The concurrent store of stage outputs, keyed by [`StageKey`], and the single source of
//! truth for whether a `(position, stage)` has been generated.
//!
//! ## Usage Counting
//! Each entry carries an atomic usage count: the number of work items currently holding a
//! [`PrerequisiteLease`] on it. A lease can only be created by the cache, while it holds
//! its lock, and gives the count back exactly once when dropped. An entry is only erased
//! when its count is zero, and erasing also happens under the lock, so a lease can never
//! be handed out for an entry that is concurrently being reclaimed.
//!
//! ## Locking
//! Resolving leases takes the read lock (the counters are atomics). Inserting and
//! reclaiming take the write lock.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use log::trace;

use crate::{core::MtResource, voxels::chunk::ChunkBlocks};

use super::{
    prerequisites::Requirement,
    stage::{SpatialPos, Stage, StageKey},
};

/// Output of one stage, as kept by the cache.
#[derive(Debug)]
pub enum StagePayload {
    /// A block table produced by a terrain stage.
    Blocks(Box<ChunkBlocks>),
    /// Completion marker of the terminal stage. The mesh itself goes to the output queue.
    Meshed,
}

impl StagePayload {
    /// The block table, if this payload has one.
    pub fn blocks(&self) -> Option<&ChunkBlocks> {
        match self {
            StagePayload::Blocks(blocks) => Some(blocks),
            StagePayload::Meshed => None,
        }
    }
}

/// One cached stage output plus its live usage count.
#[derive(Debug)]
pub struct StageCacheEntry {
    payload: StagePayload,
    usage: AtomicUsize,
}

impl StageCacheEntry {
    fn new(payload: StagePayload) -> Self {
        StageCacheEntry {
            payload,
            usage: AtomicUsize::new(0),
        }
    }

    /// The cached output.
    pub fn payload(&self) -> &StagePayload {
        &self.payload
    }

    /// Number of live leases on this entry.
    pub fn usage_count(&self) -> usize {
        self.usage.load(Ordering::Acquire)
    }
}

/// An owned claim on a cache entry, held by a work item that reads it.
///
/// Creating a lease increments the entry's usage count and dropping it decrements the
/// count, exactly once. Leases cannot be cloned.
///
/// # Panics
/// Dropping a lease panics if the count it gives back is already zero, which means the
/// counter was corrupted elsewhere.
#[derive(Debug)]
pub struct PrerequisiteLease {
    key: StageKey,
    entry: Arc<StageCacheEntry>,
}

impl PrerequisiteLease {
    /// Must only be called while the cache lock is held.
    fn acquire(key: StageKey, entry: &Arc<StageCacheEntry>) -> Self {
        entry.usage.fetch_add(1, Ordering::AcqRel);
        PrerequisiteLease {
            key,
            entry: Arc::clone(entry),
        }
    }

    /// Key of the leased entry.
    pub fn key(&self) -> StageKey {
        self.key
    }

    /// The leased output.
    pub fn payload(&self) -> &StagePayload {
        &self.entry.payload
    }

    /// The leased block table, if the output has one.
    pub fn blocks(&self) -> Option<&ChunkBlocks> {
        self.entry.payload.blocks()
    }
}

impl Drop for PrerequisiteLease {
    fn drop(&mut self) {
        let previous = self.entry.usage.fetch_sub(1, Ordering::AcqRel);
        if previous == 0 {
            panic!("usage count of {} dropped below zero", self.key);
        }
    }
}

/// A requirement of a work item, with the lease on its output if it was available.
///
/// `lease` is only ever `None` for optional requirements.
#[derive(Debug)]
pub struct ResolvedPrerequisite {
    /// The requirement from the prerequisite table.
    pub requirement: Requirement,
    /// Lease on the cached output, or `None` when an optional output was absent.
    pub lease: Option<PrerequisiteLease>,
}

/// Result of trying to reclaim one cache entry.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Reclaim {
    /// The entry was erased.
    Erased,
    /// The entry is leased and was kept.
    InUse,
    /// No entry exists for the key.
    Absent,
}

/// Shared handle to the stage output store. Clones refer to the same store.
#[derive(Clone, Default)]
pub struct StageCache {
    entries: MtResource<HashMap<StageKey, Arc<StageCacheEntry>>>,
}

impl StageCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the output of a completed stage.
    ///
    /// # Panics
    /// Panics if `key` already has an entry. Each key is generated at most once while it
    /// is cached.
    pub fn insert(&self, key: StageKey, payload: StagePayload) {
        let mut entries = self.entries.get_mut();
        if entries.contains_key(&key) {
            panic!("stage output {} generated twice", key);
        }
        entries.insert(key, Arc::new(StageCacheEntry::new(payload)));
    }

    /// Whether `key` has an entry.
    pub fn contains(&self, key: StageKey) -> bool {
        self.entries.get().contains_key(&key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.get().len()
    }

    /// Whether the cache has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.get().is_empty()
    }

    /// Usage count of `key`'s entry, or `None` if it has none.
    pub fn usage_count(&self, key: StageKey) -> Option<usize> {
        self.entries.get().get(&key).map(|entry| entry.usage_count())
    }

    /// Sum of the usage counts of every entry.
    pub fn total_usage(&self) -> usize {
        self.entries
            .get()
            .values()
            .map(|entry| entry.usage_count())
            .sum()
    }

    /// Stages cached for `position`, in order.
    pub fn stages_at(&self, position: SpatialPos) -> Vec<Stage> {
        let entries = self.entries.get();
        Stage::all()
            .into_iter()
            .filter(|stage| entries.contains_key(&StageKey::new(position, *stage)))
            .collect()
    }

    /// Leases a single entry.
    pub fn lease(&self, key: StageKey) -> Option<PrerequisiteLease> {
        self.entries
            .get()
            .get(&key)
            .map(|entry| PrerequisiteLease::acquire(key, entry))
    }

    /// Resolves the prerequisites of `key` atomically.
    ///
    /// # Returns
    /// `None`, without leasing anything, if any mandatory requirement is not cached.
    /// Otherwise one [`ResolvedPrerequisite`] per requirement, in table order, with a
    /// lease on every requirement that is cached.
    pub fn try_resolve(
        &self,
        key: StageKey,
        requirements: &[Requirement],
    ) -> Option<Vec<ResolvedPrerequisite>> {
        let entries = self.entries.get();

        let satisfied = requirements
            .iter()
            .filter(|requirement| requirement.mandatory)
            .all(|requirement| entries.contains_key(&requirement.key_for(key.position)));
        if !satisfied {
            return None;
        }

        Some(
            requirements
                .iter()
                .map(|requirement| {
                    let prerequisite_key = requirement.key_for(key.position);
                    ResolvedPrerequisite {
                        requirement: *requirement,
                        lease: entries
                            .get(&prerequisite_key)
                            .map(|entry| PrerequisiteLease::acquire(prerequisite_key, entry)),
                    }
                })
                .collect(),
        )
    }

    /// Erases `key`'s entry if nothing is using it.
    pub fn reclaim(&self, key: StageKey) -> Reclaim {
        let mut entries = self.entries.get_mut();
        match entries.get(&key) {
            None => Reclaim::Absent,
            Some(entry) if entry.usage_count() > 0 => Reclaim::InUse,
            Some(_) => {
                entries.remove(&key);
                trace!("Reclaimed {}", key);
                Reclaim::Erased
            }
        }
    }
}

#[cfg(test)]
#[path = "stage_cache_test.rs"]
mod stage_cache_test;
