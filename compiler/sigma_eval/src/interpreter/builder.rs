//! `InterpreterBuilder` for creating interpreters with custom output,
//! arenas, limits and native libraries.

use sigma_heap::SharedHeap;
use sigma_ir::SharedInterner;

use super::Interpreter;
use crate::config::EvalConfig;
use crate::dom::SharedDom;
use crate::environment::Environment;
use crate::natives::{standard_libraries, NativeLibrary};
use crate::print_handler::{stdout_handler, SharedPrintHandler};
use crate::shared::{SharedMutableRegistry, SharedRegistry};
use crate::structs::StructRegistry;
use crate::value::Value;
use crate::worker::WorkerPool;

/// Builder for [`Interpreter`].
///
/// Defaults: a fresh interner and arena, stdout output, one worker per
/// core, the default call-depth limit, no document, and the standard
/// library namespaces.
pub struct InterpreterBuilder {
    interner: Option<SharedInterner>,
    heap: Option<SharedHeap<Value>>,
    print_handler: Option<SharedPrintHandler>,
    workers: Option<WorkerPool>,
    dom: Option<SharedDom>,
    config: EvalConfig,
    libraries: Vec<NativeLibrary>,
    standard_library: bool,
}

impl InterpreterBuilder {
    pub fn new() -> Self {
        InterpreterBuilder {
            interner: None,
            heap: None,
            print_handler: None,
            workers: None,
            dom: None,
            config: EvalConfig::default(),
            libraries: Vec::new(),
            standard_library: true,
        }
    }

    /// Share an interner with the code that built the syntax tree.
    #[must_use]
    pub fn interner(mut self, interner: SharedInterner) -> Self {
        self.interner = Some(interner);
        self
    }

    /// Allocate from an existing arena.
    #[must_use]
    pub fn heap(mut self, heap: SharedHeap<Value>) -> Self {
        self.heap = Some(heap);
        self
    }

    #[must_use]
    pub fn print_handler(mut self, handler: SharedPrintHandler) -> Self {
        self.print_handler = Some(handler);
        self
    }

    /// Size of the detach pool. Ignored when a pool is supplied with
    /// [`workers`](Self::workers).
    #[must_use]
    pub fn worker_threads(mut self, threads: usize) -> Self {
        self.config.worker_threads = threads.max(1);
        self
    }

    /// Run detached tasks on an existing pool.
    #[must_use]
    pub fn workers(mut self, workers: WorkerPool) -> Self {
        self.workers = Some(workers);
        self
    }

    #[must_use]
    pub fn max_call_depth(mut self, depth: usize) -> Self {
        self.config.max_call_depth = depth;
        self
    }

    #[must_use]
    pub fn dom(mut self, dom: SharedDom) -> Self {
        self.dom = Some(dom);
        self
    }

    /// Install an extra native namespace (or extra globals) after the
    /// standard ones. Later libraries shadow earlier names.
    #[must_use]
    pub fn library(mut self, library: NativeLibrary) -> Self {
        self.libraries.push(library);
        self
    }

    /// Leave out the standard namespaces.
    #[must_use]
    pub fn without_standard_library(mut self) -> Self {
        self.standard_library = false;
        self
    }

    /// Build and initialize the interpreter; the libraries are installed
    /// in the root scope immediately.
    pub fn build(self) -> Interpreter {
        let mut libraries = if self.standard_library {
            standard_libraries()
        } else {
            Vec::new()
        };
        libraries.extend(self.libraries);

        let workers = self
            .workers
            .unwrap_or_else(|| WorkerPool::new(self.config.worker_threads));

        let mut interpreter = Interpreter {
            interner: self.interner.unwrap_or_default(),
            heap: self.heap.unwrap_or_default(),
            env: Environment::new(),
            suspended: Vec::new(),
            temporaries: Vec::new(),
            structs: SharedMutableRegistry::new(StructRegistry::new()),
            libraries: SharedRegistry::new(libraries),
            print_handler: self.print_handler.unwrap_or_else(stdout_handler),
            workers,
            dom: self.dom,
            config: self.config,
            call_depth: 0,
        };
        interpreter.initialize();
        interpreter
    }
}

impl Default for InterpreterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
