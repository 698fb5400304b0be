//! Sigma Eval - tree-walking evaluator for the Sigma scripting runtime.
//!
//! # Architecture
//!
//! - `Value`: closed enum of runtime values, stored in a shared arena
//!   (`SharedHeap<Value>`) and passed around as `Gc` handles
//! - `Environment`: lexical scope chain with a per-frame lookup cache
//! - `Interpreter`: walks `Program`/`Stmt`/`Expr` trees
//! - `evaluate_binary`: direct enum-based binary operator dispatch
//! - `natives`: the native-function calling convention and the standard
//!   library namespaces (`Console`, `Files`, `Array`, `Crypto`, ...)
//! - `WorkerPool`: background threads for `Thread.detach` and the async
//!   file functions
//!
//! # Memory
//!
//! Collection never runs on its own. Scripts call `GC.mark()` and
//! `GC.sweep()` (or `GC.collect()`); hosts can call
//! [`Interpreter::collect_garbage`]. Values handed to detached tasks are
//! pinned until the task ends, and a sweep waits for running tasks.

mod config;
pub mod dom;
mod environment;
pub mod errors;
pub mod interpreter;
pub mod natives;
mod operators;
mod print_handler;
mod shared;
mod structs;
mod unary_operators;
pub mod value;
mod worker;

#[cfg(test)]
mod tests;

use sigma_heap::Gc;

/// Result of evaluating an expression: a value, or no value (e.g. a call
/// to a function that returned nothing).
pub type EvalResult = Result<Option<Gc>, EvalError>;

pub use config::{EvalConfig, DEFAULT_MAX_CALL_DEPTH};
pub use dom::{DomAccessor, SharedDom};
pub use environment::{AssignError, Binding, Environment, LocalScope, Scope, ScopeSnapshot};
pub use errors::{EvalError, EvalErrorKind};
pub use interpreter::{ControlSignal, Interpreter, InterpreterBuilder, ScopedInterpreter};
pub use natives::{NativeFn, NativeLibrary};
pub use operators::evaluate_binary;
pub use print_handler::{
    buffer_handler, scripted_handler, silent_handler, stdout_handler, BufferPrintHandler,
    PrintHandlerImpl, SharedPrintHandler,
};
pub use shared::{SharedMutableRegistry, SharedRegistry};
pub use structs::StructRegistry;
pub use unary_operators::{increment, negate};
pub use value::{ClosureValue, CopySemantics, ExternalHandle, Fields, NativeFunction, Value};
pub use worker::WorkerPool;

pub use sigma_heap::{HeapStats, SharedHeap, SweepStats};
pub use sigma_stack::ensure_sufficient_stack;
