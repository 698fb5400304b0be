//! Runtime values.
//!
//! Every script value lives in the shared arena as a [`Value`] and is
//! passed around as a [`Gc`] handle. Containers (arrays, structs, closure
//! captures, references) hold handles, never values.
//!
//! # Copy semantics
//!
//! Each kind is classified by [`CopySemantics`]:
//! - `Copy` (number, bool, reference): duplicated whenever it is bound to a
//!   name, stored in a container or passed to a closure, and overwritten in
//!   place on reassignment so every alias of the binding sees the update.
//! - `Identity` (everything else): the handle itself is shared.

mod ops;

use std::alloc::Layout;
use std::fmt;
use std::mem::size_of;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use sigma_heap::{Gc, Trace, Tracer};
use sigma_ir::{Block, Name};

use crate::environment::ScopeSnapshot;
use crate::natives::NativeFn;

pub use ops::{bind_copy, duplicate, format_number, render, set_value};

/// Struct fields by name.
pub type Fields = FxHashMap<Name, Gc>;

/// A runtime value stored in the arena.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Number(f64),
    Str(String),
    Bool(bool),
    /// Ordered element handles, mutated in place.
    Array(Vec<Gc>),
    /// Struct instance or object literal.
    Struct(Fields),
    Closure(ClosureValue),
    Native(NativeFunction),
    /// Alias of another slot; assignments write through to the target.
    Reference(Gc),
    Binary(Vec<u8>),
    /// Opaque handle into the host document.
    External(ExternalHandle),
}

/// How a value behaves when bound or stored.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CopySemantics {
    /// Duplicated on binding, overwritten in place on reassignment.
    Copy,
    /// Shared by handle.
    Identity,
}

impl Value {
    /// Name of this value's kind, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Bool(_) => "bool",
            Value::Array(_) => "array",
            Value::Struct(_) => "struct",
            Value::Closure(_) => "lambda",
            Value::Native(_) => "native function",
            Value::Reference(_) => "reference",
            Value::Binary(_) => "binary",
            Value::External(_) => "element",
        }
    }

    pub fn copy_semantics(&self) -> CopySemantics {
        match self {
            Value::Number(_) | Value::Bool(_) | Value::Reference(_) => CopySemantics::Copy,
            Value::Str(_)
            | Value::Array(_)
            | Value::Struct(_)
            | Value::Closure(_)
            | Value::Native(_)
            | Value::Binary(_)
            | Value::External(_) => CopySemantics::Identity,
        }
    }

    #[inline]
    pub fn is_copy(&self) -> bool {
        self.copy_semantics() == CopySemantics::Copy
    }

    /// Whether `other` can overwrite this value in place.
    pub fn same_kind(&self, other: &Value) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn string(text: impl Into<String>) -> Self {
        Value::Str(text.into())
    }
}

impl Trace for Value {
    fn trace(&self, tracer: &mut Tracer<'_>) {
        match self {
            Value::Array(elements) => tracer.visit_all(elements.iter().copied()),
            Value::Struct(fields) => tracer.visit_all(fields.values().copied()),
            Value::Closure(closure) => tracer.visit_all(closure.captured.values()),
            Value::Reference(target) => tracer.visit(*target),
            Value::Number(_)
            | Value::Str(_)
            | Value::Bool(_)
            | Value::Native(_)
            | Value::Binary(_)
            | Value::External(_) => {}
        }
    }

    fn footprint(&self) -> Layout {
        let owned = match self {
            Value::Str(s) => s.capacity(),
            Value::Binary(bytes) => bytes.capacity(),
            Value::Array(elements) => elements.capacity() * size_of::<Gc>(),
            Value::Struct(fields) => fields.capacity() * size_of::<(Name, Gc)>(),
            Value::Closure(closure) => closure.captured.len() * size_of::<(Name, Gc)>(),
            Value::Number(_)
            | Value::Bool(_)
            | Value::Native(_)
            | Value::Reference(_)
            | Value::External(_) => 0,
        };
        Layout::from_size_align(size_of::<Value>() + owned, std::mem::align_of::<Value>())
            .unwrap_or(Layout::new::<Value>())
    }
}

/// A closure: parameters, body, and the bindings visible where it was created.
#[derive(Clone, Debug, PartialEq)]
pub struct ClosureValue {
    pub params: Arc<[Name]>,
    pub body: Block,
    pub captured: ScopeSnapshot,
}

/// A host function exposed to scripts.
#[derive(Clone)]
pub struct NativeFunction {
    name: &'static str,
    func: NativeFn,
}

impl NativeFunction {
    pub fn new(name: &'static str, func: NativeFn) -> Self {
        NativeFunction { name, func }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn func(&self) -> &NativeFn {
        &self.func
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn {}>", self.name)
    }
}

impl PartialEq for NativeFunction {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && Arc::ptr_eq(&self.func, &other.func)
    }
}

/// Element handle issued by the host's document accessor.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ExternalHandle(pub u64);
