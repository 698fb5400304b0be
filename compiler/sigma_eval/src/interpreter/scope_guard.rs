//! RAII scope guard for interpreter environment management.
//!
//! [`ScopedInterpreter`] pushes a frame on creation and pops it on drop, so
//! early returns through `?` and unwinding both leave the scope stack
//! balanced. It derefs to the interpreter, so evaluation methods are called
//! on the guard directly:
//!
//! ```text
//! interpreter.with_env_scope(|scoped| {
//!     scoped.env_mut().declare(name, value, false);
//!     scoped.exec_block(body)
//! })
//! ```

use std::ops::{Deref, DerefMut};

use sigma_heap::Gc;
use sigma_ir::Name;

use super::Interpreter;

/// Guard that pops the innermost environment frame when dropped.
pub struct ScopedInterpreter<'guard> {
    interpreter: &'guard mut Interpreter,
}

impl Drop for ScopedInterpreter<'_> {
    fn drop(&mut self) {
        self.interpreter.env.pop_scope();
    }
}

impl Deref for ScopedInterpreter<'_> {
    type Target = Interpreter;

    fn deref(&self) -> &Self::Target {
        self.interpreter
    }
}

impl DerefMut for ScopedInterpreter<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.interpreter
    }
}

impl Interpreter {
    /// Push a frame and return a guard that pops it.
    pub fn scoped(&mut self) -> ScopedInterpreter<'_> {
        self.env.push_scope();
        ScopedInterpreter { interpreter: self }
    }

    /// Run `f` inside a fresh child frame.
    pub fn with_env_scope<T, F>(&mut self, f: F) -> T
    where
        F: FnOnce(&mut ScopedInterpreter<'_>) -> T,
    {
        let mut scoped = self.scoped();
        f(&mut scoped)
    }

    /// Run `f` inside a child frame pre-populated with `(name, value, is_const)`
    /// bindings.
    pub fn with_bindings<T, F, I>(&mut self, bindings: I, f: F) -> T
    where
        F: FnOnce(&mut ScopedInterpreter<'_>) -> T,
        I: IntoIterator<Item = (Name, Gc, bool)>,
    {
        self.with_env_scope(|scoped| {
            for (name, value, is_const) in bindings {
                scoped.env.declare(name, value, is_const);
            }
            f(scoped)
        })
    }
}
