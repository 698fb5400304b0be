//! Call protocol for closures and native functions.
//!
//! Arguments are evaluated in the caller's scope. Natives receive the raw
//! argument handles, so `Object.ref(x)` sees the slot bound to `x`.
//! Closures bind duplicates of copy-kind arguments.

use std::sync::Arc;

use sigma_heap::Gc;
use sigma_ir::{Expr, Name};

use super::{ControlSignal, Interpreter};
use crate::errors::{
    invalid_control_flow, not_callable, recursion_limit_exceeded, wrong_arg_count,
};
use crate::value::{ClosureValue, NativeFunction, Value};
use crate::EvalResult;

enum Callee {
    Closure(ClosureValue),
    Native(NativeFunction),
}

impl Interpreter {
    /// Evaluate `callee(args...)`.
    ///
    /// For a member callee `recv.f(...)` the receiver is evaluated once and
    /// bound as `this` for the call.
    pub(crate) fn eval_call(&mut self, callee: &Expr, args: &[Expr]) -> EvalResult {
        let (func, this) = match callee {
            Expr::Member { target, path } => {
                let target = self.eval_value(target, "call receiver")?;
                match path.split_last() {
                    Some((method, prefix)) => {
                        let receiver = self.member_path(target, prefix)?;
                        let method = self.field(receiver, *method)?;
                        (self.hold(method), Some(self.hold(receiver)))
                    }
                    None => (target, None),
                }
            }
            _ => (self.eval_value(callee, "callee")?, None),
        };

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval_value(arg, "argument")?);
        }
        self.call_value(func, &values, this)
    }

    /// Call the closure or native behind `func`.
    pub fn call_value(&mut self, func: Gc, args: &[Gc], this: Option<Gc>) -> EvalResult {
        let callee = self.with_value(func, |value| match value {
            Value::Closure(closure) => Ok(Callee::Closure(closure.clone())),
            Value::Native(native) => Ok(Callee::Native(native.clone())),
            other => Err(not_callable(other.type_name())),
        })??;
        match callee {
            Callee::Closure(closure) => self.call_closure(&closure, args, this),
            Callee::Native(native) => self.call_native(&native, args, this),
        }
    }

    /// Host entry point: call a script function with no receiver.
    pub fn call_function(&mut self, func: Gc, args: &[Gc]) -> EvalResult {
        self.call_value(func, args, None)
    }

    fn call_native(&mut self, native: &NativeFunction, args: &[Gc], this: Option<Gc>) -> EvalResult {
        tracing::trace!(function = native.name(), args = args.len(), "native call");
        let func = Arc::clone(native.func());
        self.with_env_scope(|scoped| {
            if let Some(this) = this {
                scoped.env.declare(Name::THIS, this, true);
            }
            (*func)(&mut **scoped, args)
        })
    }

    #[tracing::instrument(level = "debug", skip_all, fields(params = closure.params.len()))]
    fn call_closure(
        &mut self,
        closure: &ClosureValue,
        args: &[Gc],
        this: Option<Gc>,
    ) -> EvalResult {
        if args.len() != closure.params.len() {
            return Err(wrong_arg_count("lambda", closure.params.len(), args.len()));
        }
        if self.call_depth >= self.config.max_call_depth {
            return Err(recursion_limit_exceeded(self.config.max_call_depth));
        }

        let mut env = self.env.for_closure(&closure.captured);
        env.push_scope();
        for (param, arg) in closure.params.iter().zip(args) {
            env.declare(*param, self.bind_copy(*arg)?, false);
        }
        if let Some(this) = this {
            env.declare(Name::THIS, this, true);
        }
        env.push_scope();

        self.call_depth += 1;
        let result = self.with_environment(env, |interp| interp.exec_block(&closure.body));
        self.call_depth -= 1;

        match result? {
            None => Ok(None),
            Some(ControlSignal::Return(value)) => Ok(value),
            Some(signal) => Err(invalid_control_flow(signal.keyword())),
        }
    }
}

