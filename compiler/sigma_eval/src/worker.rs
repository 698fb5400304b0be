//! Background pool for detached closures.
//!
//! A fixed-size rayon pool. Tasks run in no particular order, are never
//! cancelled and have no timeout. The pool counts tasks in flight so the
//! host can block until all of them finished.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

/// Stack size of each worker thread. Deep script recursion grows past it
/// through `ensure_sufficient_stack`.
const WORKER_STACK_SIZE: usize = 4 * 1024 * 1024;

struct PoolInner {
    /// `None` when the OS refused to start threads; tasks then get a
    /// dedicated thread each.
    pool: Option<rayon::ThreadPool>,
    in_flight: Mutex<usize>,
    idle: Condvar,
}

/// Cloneable handle to the worker pool.
#[derive(Clone)]
pub struct WorkerPool {
    inner: Arc<PoolInner>,
}

impl WorkerPool {
    /// Start a pool with `threads` workers (at least one).
    pub fn new(threads: usize) -> Self {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .thread_name(|index| format!("sigma-worker-{index}"))
            .stack_size(WORKER_STACK_SIZE)
            .panic_handler(log_panic)
            .build()
            .map_err(|e| tracing::warn!("failed to create worker pool ({e}), using plain threads"))
            .ok();
        WorkerPool {
            inner: Arc::new(PoolInner {
                pool,
                in_flight: Mutex::new(0),
                idle: Condvar::new(),
            }),
        }
    }

    /// Queue `task`. Returns immediately.
    pub fn spawn<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        *self.inner.in_flight.lock() += 1;
        let done = InFlight(Arc::clone(&self.inner));
        let job = move || {
            let _done = done;
            task();
        };
        match &self.inner.pool {
            Some(pool) => pool.spawn(job),
            None => {
                let spawned = std::thread::Builder::new()
                    .name("sigma-worker".to_string())
                    .stack_size(WORKER_STACK_SIZE)
                    .spawn(job);
                if let Err(e) = spawned {
                    tracing::error!("failed to start worker thread: {e}");
                }
            }
        }
    }

    /// Tasks queued or running.
    pub fn in_flight(&self) -> usize {
        *self.inner.in_flight.lock()
    }

    /// Block until no task is queued or running.
    ///
    /// Tasks spawned by running tasks are waited for too.
    pub fn wait_idle(&self) {
        let mut count = self.inner.in_flight.lock();
        while *count > 0 {
            self.inner.idle.wait(&mut count);
        }
    }

    pub fn threads(&self) -> usize {
        self.inner
            .pool
            .as_ref()
            .map_or(0, rayon::ThreadPool::current_num_threads)
    }
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("threads", &self.threads())
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

/// Decrements the in-flight count when a task ends, panics included.
struct InFlight(Arc<PoolInner>);

impl Drop for InFlight {
    fn drop(&mut self) {
        let mut count = self.0.in_flight.lock();
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.0.idle.notify_all();
        }
    }
}

fn log_panic(payload: Box<dyn Any + Send>) {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string());
    tracing::error!(%message, "detached task panicked");
}
