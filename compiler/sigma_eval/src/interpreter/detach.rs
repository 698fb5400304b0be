//! Running closures on the worker pool.
//!
//! A detached call never re-enters the interpreter that posted it. The task
//! builds its own [`Interpreter`] from a [`WorkerSeed`] (the runtime-wide
//! shared state) over a [`ScopeSnapshot`] of the poster's visible bindings.
//!
//! Everything the task will touch is pinned when the task is posted and
//! unpinned when it ends. While it runs, the task holds the mutator side of
//! the collection gate, so sweeps wait for it.

use sigma_heap::{Gc, SharedHeap};
use sigma_ir::SharedInterner;

use super::Interpreter;
use crate::config::EvalConfig;
use crate::dom::SharedDom;
use crate::environment::{Environment, ScopeSnapshot};
use crate::errors::EvalError;
use crate::natives::NativeLibrary;
use crate::print_handler::SharedPrintHandler;
use crate::shared::{SharedMutableRegistry, SharedRegistry};
use crate::structs::StructRegistry;
use crate::value::Value;
use crate::worker::WorkerPool;

/// State shared by every interpreter of one runtime.
pub(crate) struct WorkerSeed {
    interner: SharedInterner,
    heap: SharedHeap<Value>,
    structs: SharedMutableRegistry<StructRegistry>,
    libraries: SharedRegistry<Vec<NativeLibrary>>,
    print_handler: SharedPrintHandler,
    workers: WorkerPool,
    dom: Option<SharedDom>,
    config: EvalConfig,
}

impl Interpreter {
    pub(crate) fn seed(&self) -> WorkerSeed {
        WorkerSeed {
            interner: self.interner.clone(),
            heap: self.heap.clone(),
            structs: self.structs.clone(),
            libraries: self.libraries.clone(),
            print_handler: self.print_handler.clone(),
            workers: self.workers.clone(),
            dom: self.dom.clone(),
            config: self.config,
        }
    }

    /// Worker-side interpreter. The snapshot already holds the installed
    /// libraries, so nothing is re-initialized.
    pub(crate) fn from_seed(seed: WorkerSeed, snapshot: &ScopeSnapshot) -> Self {
        Interpreter {
            interner: seed.interner,
            heap: seed.heap,
            env: Environment::from_snapshot(snapshot),
            suspended: Vec::new(),
            temporaries: Vec::new(),
            structs: seed.structs,
            libraries: seed.libraries,
            print_handler: seed.print_handler,
            workers: seed.workers,
            dom: seed.dom,
            config: seed.config,
            call_depth: 0,
        }
    }

    /// Call `callee(args...)` on the worker pool. Returns immediately.
    pub fn detach(&self, callee: Gc, args: Vec<Gc>) {
        let pinned = args.clone();
        self.detach_with(callee, pinned, move |_| Ok(args));
    }

    /// Call `callee` on the worker pool with arguments produced on the
    /// worker by `make_args`.
    ///
    /// `pinned` lists handles `make_args` will use; they stay alive until
    /// the task ends. A failure in `make_args` or in the call is logged.
    pub fn detach_with<F>(&self, callee: Gc, pinned: Vec<Gc>, make_args: F)
    where
        F: FnOnce(&mut Interpreter) -> Result<Vec<Gc>, EvalError> + Send + 'static,
    {
        let snapshot = self.env.snapshot();
        let pins = self.heap.pin_all(
            std::iter::once(callee)
                .chain(pinned)
                .chain(snapshot.values()),
        );
        let seed = self.seed();
        tracing::debug!(pinned = pins.len(), "posting detached task");

        self.workers.spawn(move || {
            let _pins = pins;
            let heap = seed.heap.clone();
            let _mutator = heap.enter_mutator();
            let mut worker = Interpreter::from_seed(seed, &snapshot);
            let result = make_args(&mut worker)
                .and_then(|args| worker.call_value(callee, &args, None));
            if let Err(err) = result {
                tracing::error!(error = %err, "detached task failed");
            }
        });
    }
}
