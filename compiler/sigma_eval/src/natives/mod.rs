//! Native functions: the calling convention and the standard library.
//!
//! A native receives the calling interpreter and the raw argument handles.
//! It runs in a child frame of the caller (holding `this` for member
//! calls), may allocate, read and mutate arena values, and may call back
//! into script closures through [`Interpreter::call_value`].
//!
//! Libraries are installed at initialization: a namespaced library becomes
//! a const struct of native functions in the root frame, the globals
//! library binds its functions directly.

mod array;
mod console;
mod crypto;
mod document;
mod files;
mod gc;
mod globals;
mod object;
mod string;
mod thread;
mod time;

use std::fmt;
use std::sync::Arc;

use sigma_heap::Gc;

use crate::errors::{missing_argument, wrong_arg_type, EvalError};
use crate::interpreter::Interpreter;
use crate::value::Value;
use crate::EvalResult;

/// Signature of every native function.
pub type NativeFn = Arc<dyn Fn(&mut Interpreter, &[Gc]) -> EvalResult + Send + Sync>;

/// A named group of native functions.
#[derive(Clone)]
pub struct NativeLibrary {
    namespace: Option<&'static str>,
    functions: Vec<(&'static str, NativeFn)>,
}

impl NativeLibrary {
    /// Library installed as the const struct `namespace`.
    pub fn new(namespace: &'static str) -> Self {
        NativeLibrary {
            namespace: Some(namespace),
            functions: Vec::new(),
        }
    }

    /// Library whose functions are bound directly in the root frame.
    pub fn globals() -> Self {
        NativeLibrary {
            namespace: None,
            functions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_fn<F>(mut self, name: &'static str, func: F) -> Self
    where
        F: Fn(&mut Interpreter, &[Gc]) -> EvalResult + Send + Sync + 'static,
    {
        self.functions.push((name, Arc::new(func)));
        self
    }

    pub fn namespace(&self) -> Option<&'static str> {
        self.namespace
    }

    pub fn functions(&self) -> &[(&'static str, NativeFn)] {
        &self.functions
    }
}

impl fmt::Debug for NativeLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.functions.iter().map(|(name, _)| *name).collect();
        f.debug_struct("NativeLibrary")
            .field("namespace", &self.namespace)
            .field("functions", &names)
            .finish()
    }
}

/// Every standard namespace plus the global functions.
pub fn standard_libraries() -> Vec<NativeLibrary> {
    vec![
        console::library(),
        files::library(),
        array::library(),
        crypto::library(),
        thread::library(),
        object::library(),
        time::library(),
        string::library(),
        gc::library(),
        document::library(),
        globals::library(),
    ]
}

/// Typed access to a native's arguments.
///
/// Positions in error messages are 1-based.
pub(crate) struct Args<'a> {
    function: &'static str,
    args: &'a [Gc],
}

impl<'a> Args<'a> {
    pub(crate) fn new(function: &'static str, args: &'a [Gc]) -> Self {
        Args { function, args }
    }

    pub(crate) fn get(&self, index: usize) -> Result<Gc, EvalError> {
        self.args
            .get(index)
            .copied()
            .ok_or_else(|| missing_argument(self.function, index + 1))
    }

    pub(crate) fn opt(&self, index: usize) -> Option<Gc> {
        self.args.get(index).copied()
    }

    /// Arguments from `index` on.
    pub(crate) fn rest(&self, index: usize) -> &'a [Gc] {
        self.args.get(index..).unwrap_or_default()
    }

    fn typed<R>(
        &self,
        interp: &Interpreter,
        index: usize,
        expected: &'static str,
        extract: impl FnOnce(&Value) -> Option<R>,
    ) -> Result<R, EvalError> {
        let gc = self.get(index)?;
        interp
            .with_value(gc, |value| extract(value).ok_or(value.type_name()))?
            .map_err(|got| wrong_arg_type(self.function, index + 1, expected, got))
    }

    pub(crate) fn number(&self, interp: &Interpreter, index: usize) -> Result<f64, EvalError> {
        self.typed(interp, index, "number", Value::as_number)
    }

    pub(crate) fn string(&self, interp: &Interpreter, index: usize) -> Result<String, EvalError> {
        self.typed(interp, index, "string", |value| {
            value.as_str().map(str::to_string)
        })
    }

    pub(crate) fn binary(&self, interp: &Interpreter, index: usize) -> Result<Vec<u8>, EvalError> {
        self.typed(interp, index, "binary", |value| match value {
            Value::Binary(bytes) => Some(bytes.clone()),
            _ => None,
        })
    }

    /// The array handle itself, after checking its kind.
    pub(crate) fn array(&self, interp: &Interpreter, index: usize) -> Result<Gc, EvalError> {
        self.typed(interp, index, "array", |value| {
            matches!(value, Value::Array(_)).then_some(())
        })?;
        self.get(index)
    }

    /// A callable (closure or native) handle.
    pub(crate) fn callable(&self, interp: &Interpreter, index: usize) -> Result<Gc, EvalError> {
        self.typed(interp, index, "lambda", |value| {
            matches!(value, Value::Closure(_) | Value::Native(_)).then_some(())
        })?;
        self.get(index)
    }

    pub(crate) fn function(&self) -> &'static str {
        self.function
    }
}

/// `ms` as a whole number of non-negative milliseconds.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "script numbers are clamped to the non-negative range first"
)]
pub(crate) fn to_millis(ms: f64) -> u64 {
    if ms.is_nan() || ms <= 0.0 {
        0
    } else {
        ms as u64
    }
}

/// `n` as a non-negative size, or `None` when it is negative or not finite.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "checked to be finite and non-negative first"
)]
pub(crate) fn to_size(n: f64) -> Option<usize> {
    (n.is_finite() && n >= 0.0).then(|| n as usize)
}

#[allow(
    clippy::cast_precision_loss,
    reason = "script numbers are f64; sizes above 2^53 are not representable"
)]
pub(crate) fn size_to_number(n: usize) -> f64 {
    n as f64
}
