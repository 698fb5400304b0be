//! Reachability and size reporting for stored values.

use std::alloc::Layout;

use crate::Gc;

/// Implemented by every type stored in a [`Heap`](crate::Heap).
pub trait Trace {
    /// Report every handle this value holds.
    fn trace(&self, tracer: &mut Tracer<'_>);

    /// Memory owned by this value, used for heap statistics.
    fn footprint(&self) -> Layout;
}

/// Collects child handles during marking.
///
/// Marking is driven by an explicit worklist, so deeply nested containers
/// never recurse on the native stack.
pub struct Tracer<'a> {
    worklist: &'a mut Vec<Gc>,
}

impl<'a> Tracer<'a> {
    pub(crate) fn new(worklist: &'a mut Vec<Gc>) -> Self {
        Tracer { worklist }
    }

    /// Report a child handle.
    #[inline]
    pub fn visit(&mut self, gc: Gc) {
        self.worklist.push(gc);
    }

    /// Report a sequence of child handles.
    pub fn visit_all(&mut self, gcs: impl IntoIterator<Item = Gc>) {
        self.worklist.extend(gcs);
    }
}
