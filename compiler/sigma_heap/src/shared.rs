//! Thread-shared arena handle and the collection gate.
//!
//! Every interpreter instance, including the ones detached onto worker
//! threads, allocates from the same arena. Two locks keep that sound:
//!
//! - the heap mutex serializes individual arena operations; it is held for
//!   one operation at a time and never across evaluation;
//! - the collection gate (`RwLock<()>`) separates sweeps from running
//!   tasks. A running task holds a shared [`MutatorGuard`]; `sweep` takes
//!   the exclusive side, so it waits until running tasks finish and new
//!   tasks wait until the sweep is done.
//!
//! Values a queued task will touch are pinned with a [`PinSet`] until the
//! task completes, so a sweep that runs while the task waits in the queue
//! cannot reclaim them.

use std::cell::Cell;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard, RwLock, RwLockReadGuard};

use crate::{Gc, Heap, HeapError, HeapStats, SweepStats, Trace};

thread_local! {
    /// Number of live mutator guards on this thread.
    static MUTATOR_DEPTH: Cell<usize> = const { Cell::new(0) };
}

struct HeapInner<T> {
    heap: Mutex<Heap<T>>,
    gate: RwLock<()>,
}

/// Cloneable, thread-safe handle to a shared arena.
pub struct SharedHeap<T> {
    inner: Arc<HeapInner<T>>,
}

impl<T> Clone for SharedHeap<T> {
    fn clone(&self) -> Self {
        SharedHeap {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Trace> SharedHeap<T> {
    pub fn new() -> Self {
        Self::from_heap(Heap::new())
    }

    pub fn from_heap(heap: Heap<T>) -> Self {
        SharedHeap {
            inner: Arc::new(HeapInner {
                heap: Mutex::new(heap),
                gate: RwLock::new(()),
            }),
        }
    }

    /// Lock the arena for a short sequence of operations.
    ///
    /// Do not evaluate script code or call back into this handle while the
    /// guard is alive; the mutex is not reentrant.
    #[inline]
    pub fn lock(&self) -> MutexGuard<'_, Heap<T>> {
        self.inner.heap.lock()
    }

    #[inline]
    pub fn alloc(&self, value: T) -> Gc {
        self.lock().alloc(value)
    }

    /// Read a value under the lock.
    pub fn with<R>(&self, gc: Gc, f: impl FnOnce(&T) -> R) -> Result<R, HeapError> {
        self.lock().get(gc).map(f)
    }

    /// Mutate a value in place under the lock.
    pub fn with_mut<R>(&self, gc: Gc, f: impl FnOnce(&mut T) -> R) -> Result<R, HeapError> {
        self.lock().get_mut(gc).map(f)
    }

    pub fn contains(&self, gc: Gc) -> bool {
        self.lock().contains(gc)
    }

    /// Mark `roots` and their children. Does not wait for running tasks.
    pub fn mark<I: IntoIterator<Item = Gc>>(&self, roots: I) {
        self.lock().mark(roots);
    }

    /// Sweep once no detached task is running.
    ///
    /// Fails with [`HeapError::CollectionInMutator`] when called from a
    /// thread that is itself running a detached task.
    pub fn sweep(&self) -> Result<SweepStats, HeapError> {
        if MUTATOR_DEPTH.with(Cell::get) > 0 {
            return Err(HeapError::CollectionInMutator);
        }
        let _exclusive = self.inner.gate.write();
        Ok(self.lock().sweep())
    }

    /// Enter the mutator side of the collection gate for the current thread.
    ///
    /// Blocks while a sweep is in progress. Nested guards on one thread
    /// share the outer guard's lock.
    pub fn enter_mutator(&self) -> MutatorGuard<'_> {
        let depth = MUTATOR_DEPTH.with(Cell::get);
        let read = if depth == 0 {
            Some(self.inner.gate.read())
        } else {
            None
        };
        MUTATOR_DEPTH.with(|d| d.set(depth + 1));
        MutatorGuard { _read: read }
    }

    /// Pin every live handle in `gcs` until the returned set is dropped.
    ///
    /// Handles that no longer resolve are skipped.
    pub fn pin_all(&self, gcs: impl IntoIterator<Item = Gc>) -> PinSet<T> {
        let mut pinned = Vec::new();
        {
            let mut heap = self.lock();
            for gc in gcs {
                if heap.pin(gc).is_ok() {
                    pinned.push(gc);
                }
            }
        }
        PinSet {
            heap: self.clone(),
            pinned,
        }
    }

    pub fn stats(&self) -> HeapStats {
        self.lock().stats()
    }

    /// Whether both handles refer to the same arena.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Trace> Default for SharedHeap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for SharedHeap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedHeap").finish_non_exhaustive()
    }
}

/// Shared side of the collection gate, held by a running task.
pub struct MutatorGuard<'a> {
    _read: Option<RwLockReadGuard<'a, ()>>,
}

impl Drop for MutatorGuard<'_> {
    fn drop(&mut self) {
        MUTATOR_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}

/// Pins released on drop.
pub struct PinSet<T: Trace> {
    heap: SharedHeap<T>,
    pinned: Vec<Gc>,
}

impl<T: Trace> PinSet<T> {
    pub fn len(&self) -> usize {
        self.pinned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pinned.is_empty()
    }
}

impl<T: Trace> Drop for PinSet<T> {
    fn drop(&mut self) {
        let mut heap = self.heap.lock();
        for gc in self.pinned.drain(..) {
            heap.unpin(gc);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests {
    use std::alloc::Layout;
    use std::sync::mpsc;
    use std::time::Duration;

    use super::*;
    use crate::Tracer;

    struct Counter(u32);

    impl Trace for Counter {
        fn trace(&self, _tracer: &mut Tracer<'_>) {}

        fn footprint(&self) -> Layout {
            Layout::new::<u32>()
        }
    }

    #[test]
    fn clones_share_one_arena() {
        let heap = SharedHeap::new();
        let other = heap.clone();
        let gc = heap.alloc(Counter(3));

        assert!(heap.ptr_eq(&other));
        assert_eq!(other.with(gc, |c| c.0).unwrap(), 3);
    }

    #[test]
    fn pin_set_protects_until_dropped() {
        let heap = SharedHeap::new();
        let gc = heap.alloc(Counter(1));

        let pins = heap.pin_all([gc]);
        assert_eq!(pins.len(), 1);
        heap.sweep().unwrap();
        assert!(heap.contains(gc));

        drop(pins);
        heap.sweep().unwrap();
        assert!(!heap.contains(gc));
    }

    #[test]
    fn sweep_inside_mutator_is_rejected() {
        let heap: SharedHeap<Counter> = SharedHeap::new();
        let guard = heap.enter_mutator();
        assert_eq!(heap.sweep(), Err(HeapError::CollectionInMutator));
        drop(guard);
        assert!(heap.sweep().is_ok());
    }

    #[test]
    fn nested_mutator_guards_release_in_order() {
        let heap: SharedHeap<Counter> = SharedHeap::new();
        let outer = heap.enter_mutator();
        let inner = heap.enter_mutator();
        drop(inner);
        assert!(heap.sweep().is_err());
        drop(outer);
        assert!(heap.sweep().is_ok());
    }

    #[test]
    fn sweep_waits_for_running_mutator() {
        let heap: SharedHeap<Counter> = SharedHeap::new();
        let worker_heap = heap.clone();
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        let worker = std::thread::spawn(move || {
            let _guard = worker_heap.enter_mutator();
            entered_tx.send(()).unwrap();
            release_rx.recv().unwrap();
            worker_heap.alloc(Counter(1))
        });

        entered_rx.recv().unwrap();
        let sweeper_heap = heap.clone();
        let sweeper = std::thread::spawn(move || sweeper_heap.sweep().unwrap());

        std::thread::sleep(Duration::from_millis(50));
        assert!(!sweeper.is_finished(), "sweep must wait for the task");

        release_tx.send(()).unwrap();
        let allocated = worker.join().unwrap();
        let stats = sweeper.join().unwrap();

        assert_eq!(stats.freed, 1);
        assert!(!heap.contains(allocated));
    }
}
