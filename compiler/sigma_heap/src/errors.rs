//! Arena errors.

use crate::Gc;

/// Errors raised by arena operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HeapError {
    /// The handle's slot was freed (and possibly reused) by a sweep.
    #[error("stale handle {0}: value was reclaimed by a sweep")]
    StaleHandle(Gc),
    /// A sweep was requested while this thread runs a detached task.
    ///
    /// The sweep would wait for the task holding the request, forever.
    #[error("cannot sweep from inside a detached task")]
    CollectionInMutator,
}
