//! Generational handles into the arena.

use std::fmt;

/// Handle to a value stored in a [`Heap`](crate::Heap).
///
/// The generation is bumped every time a slot is freed, so a handle kept
/// past the sweep that reclaimed its value no longer resolves.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Gc {
    index: u32,
    generation: u32,
}

impl Gc {
    #[inline]
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Gc { index, generation }
    }

    /// Slot index.
    #[inline]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Generation of the slot when this handle was issued.
    #[inline]
    pub const fn generation(self) -> u32 {
        self.generation
    }

    #[inline]
    pub(crate) const fn slot(self) -> usize {
        self.index as usize
    }
}

impl fmt::Debug for Gc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Gc({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for Gc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}
