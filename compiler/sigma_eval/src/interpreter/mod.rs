//! Tree-walking interpreter for Sigma.
//!
//! # Layout
//!
//! - `stmt`: statements, blocks, loops and control signals
//! - `expr`: expressions, member/index access, struct construction
//! - `assign`: re-initialization of names, fields and elements
//! - `function_call`: the call protocol for closures and natives
//! - `detach`: running closures on the worker pool
//! - `builder`: configuration
//!
//! # Values and the arena
//!
//! Every value lives in the shared arena. The heap mutex is taken for one
//! arena operation at a time and never held while script code runs, so
//! helpers here lock, copy out what they need, and unlock.
//!
//! # Call frames
//!
//! A closure call swaps in a fresh [`Environment`] built from the closure's
//! captured bindings. The caller's environment is parked in `suspended`
//! until the call returns, so its bindings stay visible to the collector.
//!
//! # Temporaries
//!
//! Every value an expression produces is pushed on `temporaries` and stays
//! a root until the enclosing statement finishes. Operands, arguments and
//! half-built containers therefore survive a `GC.collect()` issued from a
//! sub-expression.

mod assign;
mod builder;
mod detach;
mod expr;
mod function_call;
mod scope_guard;
mod stmt;

use rustc_hash::FxHashMap;
use sigma_heap::{Gc, HeapStats, SharedHeap, SweepStats};
use sigma_ir::{Name, Program, SharedInterner, Stmt};

pub use builder::InterpreterBuilder;
pub use scope_guard::ScopedInterpreter;

use crate::config::EvalConfig;
use crate::dom::SharedDom;
use crate::environment::Environment;
use crate::errors::{invalid_control_flow, EvalError};
use crate::natives::NativeLibrary;
use crate::print_handler::SharedPrintHandler;
use crate::shared::{SharedMutableRegistry, SharedRegistry};
use crate::structs::StructRegistry;
use crate::value::{self, NativeFunction, Value};
use crate::worker::WorkerPool;
use crate::EvalResult;

/// Non-local exit produced by a statement.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ControlSignal {
    Break,
    Continue,
    /// Payload is the returned value, if any.
    Return(Option<Gc>),
}

impl ControlSignal {
    pub fn keyword(self) -> &'static str {
        match self {
            ControlSignal::Break => "break",
            ControlSignal::Continue => "continue",
            ControlSignal::Return(_) => "return",
        }
    }
}

/// Result of executing a statement: `Some` when it ends the enclosing
/// construct early.
pub(crate) type ExecResult = Result<Option<ControlSignal>, EvalError>;

/// Evaluates programs against a shared arena.
///
/// One instance serves one thread. Detached tasks build their own instance
/// over the same arena, interner, struct registry and libraries.
pub struct Interpreter {
    pub(crate) interner: SharedInterner,
    pub(crate) heap: SharedHeap<Value>,
    pub(crate) env: Environment,
    /// Caller environments of the closure calls in progress.
    suspended: Vec<Environment>,
    /// Values produced by the statements in progress.
    temporaries: Vec<Gc>,
    pub(crate) structs: SharedMutableRegistry<StructRegistry>,
    pub(crate) libraries: SharedRegistry<Vec<NativeLibrary>>,
    pub(crate) print_handler: SharedPrintHandler,
    pub(crate) workers: WorkerPool,
    pub(crate) dom: Option<SharedDom>,
    pub(crate) config: EvalConfig,
    call_depth: usize,
}

impl Interpreter {
    /// Interpreter with default configuration: stdout output, a fresh arena
    /// and the standard library.
    pub fn new() -> Self {
        InterpreterBuilder::new().build()
    }

    pub fn builder() -> InterpreterBuilder {
        InterpreterBuilder::new()
    }

    /// Re-initialize and run `program`.
    ///
    /// A top-level `return` ends the program with its payload; otherwise
    /// the result is the value of the last expression statement.
    #[tracing::instrument(level = "debug", skip_all, fields(stmts = program.stmts.len()))]
    pub fn evaluate_program(&mut self, program: &Program) -> EvalResult {
        self.initialize();
        self.run(&program.stmts)
    }

    /// Run statements against the current global state without
    /// re-initializing.
    pub fn run(&mut self, stmts: &[Stmt]) -> EvalResult {
        self.holding(|interp| {
            let base = interp.temporaries.len();
            let mut last = None;
            for stmt in stmts {
                if let Stmt::Expr(expr) = stmt {
                    last = interp.eval_expr(expr)?;
                    // Only the latest result stays rooted.
                    interp.temporaries.truncate(base);
                    interp.temporaries.extend(last);
                    continue;
                }
                match interp.exec_stmt(stmt)? {
                    None => {}
                    Some(ControlSignal::Return(value)) => return Ok(value),
                    Some(signal) => return Err(invalid_control_flow(signal.keyword())),
                }
            }
            Ok(last)
        })
    }

    /// Fresh global scope, empty struct registry, libraries installed.
    ///
    /// Values from earlier runs stay in the arena until the next sweep.
    pub fn initialize(&mut self) {
        self.env = Environment::new();
        self.suspended.clear();
        self.temporaries.clear();
        self.call_depth = 0;
        self.structs.write().clear();
        let libraries = self.libraries.clone();
        for library in libraries.iter() {
            self.install_library(library);
        }
    }

    fn install_library(&mut self, library: &NativeLibrary) {
        let functions: Vec<(Name, Gc)> = library
            .functions()
            .iter()
            .map(|(name, func)| {
                let native = NativeFunction::new(name, func.clone());
                (self.interner.intern(name), self.alloc(Value::Native(native)))
            })
            .collect();

        match library.namespace() {
            Some(namespace) => {
                let fields: FxHashMap<Name, Gc> = functions.into_iter().collect();
                let table = self.alloc(Value::Struct(fields));
                let name = self.interner.intern(namespace);
                self.env.declare(name, table, true);
            }
            None => {
                for (name, native) in functions {
                    self.env.declare(name, native, true);
                }
            }
        }
        tracing::debug!(
            library = library.namespace().unwrap_or("<globals>"),
            functions = library.functions().len(),
            "installed native library"
        );
    }

    // Accessors

    pub fn heap(&self) -> &SharedHeap<Value> {
        &self.heap
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    pub fn print_handler(&self) -> &SharedPrintHandler {
        &self.print_handler
    }

    pub fn workers(&self) -> &WorkerPool {
        &self.workers
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    pub fn dom(&self) -> Option<&SharedDom> {
        self.dom.as_ref()
    }

    /// Current closure call depth.
    pub fn call_depth(&self) -> usize {
        self.call_depth
    }

    // Arena helpers

    #[inline]
    pub fn alloc(&self, value: Value) -> Gc {
        self.heap.alloc(value)
    }

    /// Copy of the value behind `gc`.
    pub fn read(&self, gc: Gc) -> Result<Value, EvalError> {
        Ok(self.heap.with(gc, Value::clone)?)
    }

    /// Inspect the value behind `gc` under the arena lock.
    ///
    /// `f` must not call back into the interpreter.
    pub fn with_value<R>(&self, gc: Gc, f: impl FnOnce(&Value) -> R) -> Result<R, EvalError> {
        Ok(self.heap.with(gc, f)?)
    }

    /// Mutate the value behind `gc` in place under the arena lock.
    pub fn with_value_mut<R>(
        &self,
        gc: Gc,
        f: impl FnOnce(&mut Value) -> R,
    ) -> Result<R, EvalError> {
        Ok(self.heap.with_mut(gc, f)?)
    }

    /// Display form, as produced by `toString`.
    pub fn render(&self, gc: Gc) -> Result<String, EvalError> {
        Ok(value::render(&self.heap.lock(), gc)?)
    }

    /// Duplicate copy kinds, share everything else.
    pub fn bind_copy(&self, gc: Gc) -> Result<Gc, EvalError> {
        Ok(value::bind_copy(&mut self.heap.lock(), gc)?)
    }

    /// Deep copy.
    pub fn duplicate(&self, gc: Gc) -> Result<Gc, EvalError> {
        Ok(value::duplicate(&mut self.heap.lock(), gc)?)
    }

    // Names

    pub fn intern(&self, text: &str) -> Name {
        self.interner.intern(text)
    }

    pub fn name_str(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    /// Value bound to `name` in the current scope chain.
    pub fn lookup(&self, name: &str) -> Option<Gc> {
        self.env
            .lookup(self.interner.intern(name))
            .map(|binding| binding.value)
    }

    // Collection

    /// Handles reachable from this interpreter's scopes, including the
    /// scopes of callers suspended in a closure call, plus the temporaries
    /// of the statements in progress.
    pub fn gc_roots(&self) -> Vec<Gc> {
        let mut roots = self.env.roots();
        for env in &self.suspended {
            roots.extend(env.roots());
        }
        roots.extend_from_slice(&self.temporaries);
        roots
    }

    /// Keep `gc` rooted until the enclosing `holding` call returns.
    #[inline]
    pub(crate) fn hold(&mut self, gc: Gc) -> Gc {
        self.temporaries.push(gc);
        gc
    }

    /// Run `f`, then drop every temporary it pushed, on error too.
    pub(crate) fn holding<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let base = self.temporaries.len();
        let result = f(self);
        self.temporaries.truncate(base);
        result
    }

    /// Number of temporaries currently rooted.
    pub fn temporaries(&self) -> usize {
        self.temporaries.len()
    }

    /// Mark `extra` plus every scope root, without sweeping.
    pub fn mark(&self, extra: impl IntoIterator<Item = Gc>) {
        let mut roots = self.gc_roots();
        roots.extend(extra);
        self.heap.mark(roots);
    }

    /// Sweep through the collection gate.
    pub fn sweep(&self) -> Result<SweepStats, EvalError> {
        Ok(self.heap.sweep()?)
    }

    /// Mark from the scope roots, then sweep.
    ///
    /// Values held only by a host's Rust locals are not roots; pin them
    /// first.
    pub fn collect_garbage(&self) -> Result<SweepStats, EvalError> {
        self.mark(std::iter::empty());
        self.sweep()
    }

    pub fn heap_stats(&self) -> HeapStats {
        self.heap.stats()
    }

    /// Run `f` with `env` as the current environment, then restore the
    /// caller's.
    fn with_environment<R>(&mut self, env: Environment, f: impl FnOnce(&mut Self) -> R) -> R {
        let caller = std::mem::replace(&mut self.env, env);
        self.suspended.push(caller);
        let result = f(self);
        if let Some(caller) = self.suspended.pop() {
            self.env = caller;
        }
        result
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interpreter")
            .field("env", &self.env)
            .field("call_depth", &self.call_depth)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
