//! Slot arena with a free list and mark bits.

use std::mem;

use rustc_hash::FxHashMap;

use crate::{Gc, HeapError, Trace, Tracer};

/// A stored value plus its collector state.
struct Entry<T> {
    value: T,
    /// Bytes reported by `Trace::footprint` when stored.
    size: usize,
    marked: bool,
    /// Allocated between `mark` and `sweep`; survives the current cycle.
    born_in_cycle: bool,
}

enum SlotState<T> {
    Occupied(Entry<T>),
    Vacant { next_free: Option<u32> },
}

struct Slot<T> {
    generation: u32,
    state: SlotState<T>,
}

/// Where the arena is in its collection cycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    /// `mark` ran; waiting for `sweep`.
    Marked,
}

/// Result of a single sweep.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub freed: usize,
    pub survived: usize,
    pub bytes_freed: usize,
}

/// Snapshot of arena occupancy.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct HeapStats {
    /// Values currently allocated.
    pub live: usize,
    /// Vacant slots ready for reuse.
    pub free_slots: usize,
    /// Sum of the live values' footprints.
    pub live_bytes: usize,
    /// Completed sweeps.
    pub collections: usize,
    pub last_sweep: SweepStats,
}

/// Arena of `T` values addressed by [`Gc`] handles.
pub struct Heap<T> {
    slots: Vec<Slot<T>>,
    free_head: Option<u32>,
    live: usize,
    live_bytes: usize,
    phase: Phase,
    /// Roots passed to `mark` during the current cycle.
    cycle_roots: Vec<Gc>,
    /// Counted extra roots (values owned by queued tasks or the host).
    pins: FxHashMap<Gc, u32>,
    collections: usize,
    last_sweep: SweepStats,
}

impl<T: Trace> Heap<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Heap {
            slots: Vec::with_capacity(capacity),
            free_head: None,
            live: 0,
            live_bytes: 0,
            phase: Phase::Idle,
            cycle_roots: Vec::new(),
            pins: FxHashMap::default(),
            collections: 0,
            last_sweep: SweepStats::default(),
        }
    }

    /// Store a value and return its handle.
    ///
    /// Reuses a vacant slot when one exists. Values stored after `mark`
    /// are born marked.
    ///
    /// # Panics
    /// Panics if more than `u32::MAX` slots are in use at once.
    pub fn alloc(&mut self, value: T) -> Gc {
        let size = value.footprint().size();
        let entry = Entry {
            value,
            size,
            marked: self.phase == Phase::Marked,
            born_in_cycle: self.phase == Phase::Marked,
        };
        self.live += 1;
        self.live_bytes += size;

        if let Some(index) = self.free_head {
            let slot = &mut self.slots[index as usize];
            if let SlotState::Vacant { next_free } = slot.state {
                self.free_head = next_free;
            }
            slot.state = SlotState::Occupied(entry);
            return Gc::new(index, slot.generation);
        }

        let index = u32::try_from(self.slots.len())
            .unwrap_or_else(|_| panic!("arena exceeded {} slots", u32::MAX));
        self.slots.push(Slot {
            generation: 0,
            state: SlotState::Occupied(entry),
        });
        Gc::new(index, 0)
    }

    fn entry(&self, gc: Gc) -> Result<&Entry<T>, HeapError> {
        match self.slots.get(gc.slot()) {
            Some(Slot {
                generation,
                state: SlotState::Occupied(entry),
            }) if *generation == gc.generation() => Ok(entry),
            _ => Err(HeapError::StaleHandle(gc)),
        }
    }

    fn entry_mut(&mut self, gc: Gc) -> Result<&mut Entry<T>, HeapError> {
        match self.slots.get_mut(gc.slot()) {
            Some(Slot {
                generation,
                state: SlotState::Occupied(entry),
            }) if *generation == gc.generation() => Ok(entry),
            _ => Err(HeapError::StaleHandle(gc)),
        }
    }

    /// Resolve a handle.
    #[inline]
    pub fn get(&self, gc: Gc) -> Result<&T, HeapError> {
        self.entry(gc).map(|entry| &entry.value)
    }

    /// Resolve a handle for in-place mutation.
    ///
    /// Footprint accounting is refreshed on the next `replace` or `sweep`.
    #[inline]
    pub fn get_mut(&mut self, gc: Gc) -> Result<&mut T, HeapError> {
        self.entry_mut(gc).map(|entry| &mut entry.value)
    }

    /// Overwrite the value in a slot, returning the previous value.
    ///
    /// Every handle to the slot observes the new value.
    pub fn replace(&mut self, gc: Gc, value: T) -> Result<T, HeapError> {
        let size = value.footprint().size();
        let entry = self.entry_mut(gc)?;
        let old_size = mem::replace(&mut entry.size, size);
        let old = mem::replace(&mut entry.value, value);
        self.live_bytes = self.live_bytes - old_size + size;
        Ok(old)
    }

    /// Whether the handle still resolves.
    #[inline]
    pub fn contains(&self, gc: Gc) -> bool {
        self.entry(gc).is_ok()
    }

    /// Whether the value is marked in the current cycle.
    pub fn is_marked(&self, gc: Gc) -> bool {
        self.entry(gc).is_ok_and(|entry| entry.marked)
    }

    /// Number of live values.
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Handles of every live value.
    pub fn alive(&self) -> impl Iterator<Item = Gc> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| match slot.state {
                SlotState::Occupied(_) => u32::try_from(index)
                    .ok()
                    .map(|index| Gc::new(index, slot.generation)),
                SlotState::Vacant { .. } => None,
            })
    }

    /// Add a counted root. Pinned values survive every sweep.
    pub fn pin(&mut self, gc: Gc) -> Result<(), HeapError> {
        self.entry(gc)?;
        *self.pins.entry(gc).or_insert(0) += 1;
        Ok(())
    }

    /// Release one pin on `gc`. Unpinning an unpinned handle is a no-op.
    pub fn unpin(&mut self, gc: Gc) {
        if let Some(count) = self.pins.get_mut(&gc) {
            *count -= 1;
            if *count == 0 {
                self.pins.remove(&gc);
            }
        }
    }

    pub fn is_pinned(&self, gc: Gc) -> bool {
        self.pins.contains_key(&gc)
    }

    /// Mark `roots` and everything reachable from them.
    ///
    /// The roots are remembered until the next `sweep`. Stale roots are
    /// ignored.
    pub fn mark<I: IntoIterator<Item = Gc>>(&mut self, roots: I) {
        let start = self.cycle_roots.len();
        self.cycle_roots.extend(roots);
        let worklist = self.cycle_roots[start..].to_vec();
        self.phase = Phase::Marked;
        self.trace_from(worklist);
    }

    /// Free every value not reachable from this cycle's roots or the pins.
    ///
    /// Marks set by `mark` are kept. Every marked value, recorded root, pin
    /// and value born during the cycle is traced again with its current
    /// contents, so values moved between containers after `mark` survive.
    /// Without a preceding `mark`, only pinned values survive.
    pub fn sweep(&mut self) -> SweepStats {
        let mut seeds = mem::take(&mut self.cycle_roots);
        seeds.extend(self.pins.keys().copied());
        for (index, slot) in self.slots.iter().enumerate() {
            if let SlotState::Occupied(entry) = &slot.state {
                if entry.marked || entry.born_in_cycle {
                    if let Ok(index) = u32::try_from(index) {
                        seeds.push(Gc::new(index, slot.generation));
                    }
                }
            }
        }
        self.retrace(seeds);

        let mut stats = SweepStats::default();
        let mut live_bytes = 0;
        for index in 0..self.slots.len() {
            let slot = &mut self.slots[index];
            let SlotState::Occupied(entry) = &mut slot.state else {
                continue;
            };
            if entry.marked {
                entry.marked = false;
                entry.born_in_cycle = false;
                entry.size = entry.value.footprint().size();
                live_bytes += entry.size;
                stats.survived += 1;
                continue;
            }
            stats.freed += 1;
            stats.bytes_freed += entry.size;
            slot.generation = slot.generation.wrapping_add(1);
            slot.state = SlotState::Vacant {
                next_free: self.free_head,
            };
            if let Ok(index) = u32::try_from(index) {
                self.free_head = Some(index);
            }
        }

        self.live = stats.survived;
        self.live_bytes = live_bytes;
        self.phase = Phase::Idle;
        self.collections += 1;
        self.last_sweep = stats;
        tracing::debug!(
            freed = stats.freed,
            survived = stats.survived,
            bytes_freed = stats.bytes_freed,
            collections = self.collections,
            "sweep finished"
        );
        stats
    }

    /// Mark each seed and queue its children, even when the seed was
    /// already marked.
    fn retrace(&mut self, seeds: Vec<Gc>) {
        let mut worklist = Vec::new();
        for gc in seeds {
            if let Ok(entry) = self.entry_mut(gc) {
                entry.marked = true;
                entry.value.trace(&mut Tracer::new(&mut worklist));
            }
        }
        self.trace_from(worklist);
    }

    fn trace_from(&mut self, mut worklist: Vec<Gc>) {
        while let Some(gc) = worklist.pop() {
            let Ok(entry) = self.entry_mut(gc) else {
                continue;
            };
            if entry.marked {
                continue;
            }
            entry.marked = true;
            entry.value.trace(&mut Tracer::new(&mut worklist));
        }
    }

    pub fn stats(&self) -> HeapStats {
        HeapStats {
            live: self.live,
            free_slots: self.slots.len() - self.live,
            live_bytes: self.live_bytes,
            collections: self.collections,
            last_sweep: self.last_sweep,
        }
    }
}

impl<T: Trace> Default for Heap<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
