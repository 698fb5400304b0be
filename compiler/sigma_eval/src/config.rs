//! Evaluation limits.

/// Default maximum closure call depth.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 10_000;

/// Numeric limits applied to every interpreter of a runtime.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EvalConfig {
    /// Closure calls nested deeper than this fail with a stack-overflow error.
    pub max_call_depth: usize,
    /// Threads in the detach worker pool.
    pub worker_threads: usize,
}

impl EvalConfig {
    /// One worker per available core, at least one.
    pub fn default_worker_threads() -> usize {
        std::thread::available_parallelism().map_or(1, |n| n.get().max(1))
    }
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            worker_threads: Self::default_worker_threads(),
        }
    }
}
