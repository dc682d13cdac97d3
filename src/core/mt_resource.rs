use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A thread-safe, reference-counted resource container with read-write locking.
///
/// `MtResource` is the lock used for every piece of pipeline state that is shared
/// between the delegator, the workers and the threads draining output queues. Each
/// clone refers to the same underlying value.
///
/// # Examples
///
/// ```
/// use voxel_chunk_pipeline::core::MtResource;
///
/// let generated = MtResource::new(Vec::<u32>::new());
/// let producer = generated.clone();
///
/// std::thread::spawn(move || producer.get_mut().push(7))
///     .join()
///     .unwrap();
///
/// assert_eq!(*generated.get(), vec![7]);
/// ```
///
/// # Panics
/// A poisoned lock means another thread panicked while mutating pipeline state. The
/// state can no longer be trusted, so both accessors panic instead of recovering.
pub struct MtResource<T: Send + Sync> {
    resource: Arc<RwLock<T>>,
}

impl<T: Send + Sync> MtResource<T> {
    /// Wraps `resource` in a new shared container.
    pub fn new(resource: T) -> Self {
        Self {
            resource: Arc::new(RwLock::new(resource)),
        }
    }

    /// Returns a read guard. Any number of readers may hold one concurrently.
    pub fn get(&self) -> RwLockReadGuard<'_, T> {
        self.resource
            .read()
            .unwrap_or_else(|_| panic!("shared pipeline state poisoned by a panicked thread"))
    }

    /// Returns an exclusive write guard.
    pub fn get_mut(&self) -> RwLockWriteGuard<'_, T> {
        self.resource
            .write()
            .unwrap_or_else(|_| panic!("shared pipeline state poisoned by a panicked thread"))
    }
}

impl<T: Send + Sync + Default> Default for MtResource<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Send + Sync> Clone for MtResource<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}
