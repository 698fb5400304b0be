//! Sigma Heap - the value arena shared by every interpreter instance.
//!
//! Values live in slots of a [`Heap`] and are referred to by generational
//! [`Gc`] handles. Nothing is freed implicitly: scripts decide when to
//! collect by calling `mark` and then `sweep`.
//!
//! # Architecture
//!
//! - [`Heap<T>`]: slot storage, free list, mark bits, pins, statistics
//! - [`Trace`]: how a stored value reports its children and footprint
//! - [`SharedHeap<T>`]: the thread-shared handle (mutex around the heap plus
//!   the collection gate that keeps sweeps and running tasks apart)
//!
//! # Collection cycle
//!
//! 1. `mark(roots)` records the roots and marks everything reachable.
//! 2. Allocations made before the sweep are born marked.
//! 3. `sweep()` keeps those marks and traces again from every marked
//!    value, the recorded roots and the pinned set, then frees every
//!    unmarked slot and clears the surviving marks.

mod errors;
mod handle;
mod heap;
mod shared;
mod trace;

pub use errors::HeapError;
pub use handle::Gc;
pub use heap::{Heap, HeapStats, SweepStats};
pub use shared::{MutatorGuard, PinSet, SharedHeap};
pub use trace::{Trace, Tracer};
