//! Evaluator scenarios, built directly as syntax trees.
//!
//! [`Harness`] owns an interpreter with captured console output and offers
//! short constructors for the trees the scenarios need.

#![allow(clippy::unwrap_used, reason = "tests use unwrap for brevity")]

mod closure_tests;
mod control_tests;
mod detach_tests;

use sigma_heap::Gc;
use sigma_ir::{BinaryOp, Expr, Name, Program, Stmt};

use crate::errors::EvalError;
use crate::interpreter::{Interpreter, InterpreterBuilder};
use crate::print_handler::{buffer_handler, SharedPrintHandler};
use crate::value::Value;
use crate::EvalResult;

pub(crate) struct Harness {
    pub interp: Interpreter,
    output: SharedPrintHandler,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_builder(Interpreter::builder())
    }

    pub fn with_builder(builder: InterpreterBuilder) -> Self {
        Self::with_handler(builder, buffer_handler())
    }

    pub fn with_handler(builder: InterpreterBuilder, output: SharedPrintHandler) -> Self {
        let interp = builder
            .print_handler(output.clone())
            .worker_threads(2)
            .build();
        Harness { interp, output }
    }

    pub fn name(&self, text: &str) -> Name {
        self.interp.intern(text)
    }

    pub fn ident(&self, text: &str) -> Expr {
        Expr::ident(self.name(text))
    }

    pub fn var(&self, name: &str, value: Expr) -> Stmt {
        Stmt::var(self.name(name), value)
    }

    pub fn constant(&self, name: &str, value: Expr) -> Stmt {
        Stmt::constant(self.name(name), value)
    }

    pub fn assign(&self, name: &str, value: Expr) -> Stmt {
        Stmt::assign(self.name(name), value)
    }

    /// `callee(args...)` for a global function or variable.
    pub fn call(&self, callee: &str, args: Vec<Expr>) -> Expr {
        Expr::call(self.ident(callee), args)
    }

    /// `namespace.function(args...)`.
    pub fn ns_call(&self, namespace: &str, function: &str, args: Vec<Expr>) -> Expr {
        Expr::method_call(self.ident(namespace), self.name(function), args)
    }

    pub fn member(&self, target: Expr, path: &[&str]) -> Expr {
        let path: Vec<Name> = path.iter().map(|field| self.name(field)).collect();
        Expr::member(target, path)
    }

    pub fn closure(&self, params: &[&str], body: Vec<Stmt>) -> Expr {
        let params: Vec<Name> = params.iter().map(|param| self.name(param)).collect();
        Expr::closure(params, body)
    }

    /// `Console.println(toString(value));`
    pub fn println(&self, value: Expr) -> Stmt {
        let text = self.call("toString", vec![value]);
        Stmt::expr(self.ns_call("Console", "println", vec![text]))
    }

    /// Run against the current globals; earlier runs stay visible.
    pub fn run(&mut self, stmts: Vec<Stmt>) -> EvalResult {
        self.interp.run(&stmts)
    }

    /// Run as a fresh program, re-initializing the globals first.
    pub fn run_program(&mut self, stmts: Vec<Stmt>) -> EvalResult {
        self.interp.evaluate_program(&Program::new(stmts))
    }

    /// Run and return the program's value, which must exist.
    pub fn eval(&mut self, stmts: Vec<Stmt>) -> Gc {
        self.run(stmts).unwrap().unwrap()
    }

    pub fn error(&mut self, stmts: Vec<Stmt>) -> EvalError {
        self.run(stmts).unwrap_err()
    }

    pub fn value(&self, gc: Gc) -> Value {
        self.interp.read(gc).unwrap()
    }

    pub fn number(&self, gc: Gc) -> f64 {
        match self.value(gc) {
            Value::Number(n) => n,
            other => panic!("expected a number, got {other:?}"),
        }
    }

    pub fn text(&self, gc: Gc) -> String {
        match self.value(gc) {
            Value::Str(s) => s,
            other => panic!("expected a string, got {other:?}"),
        }
    }

    pub fn rendered(&self, gc: Gc) -> String {
        self.interp.render(gc).unwrap()
    }

    /// Value currently bound to a global name.
    pub fn global(&self, name: &str) -> Gc {
        self.interp
            .lookup(name)
            .unwrap_or_else(|| panic!("{name} is not bound"))
    }

    pub fn global_number(&self, name: &str) -> f64 {
        self.number(self.global(name))
    }

    pub fn output(&self) -> String {
        self.output.get_output()
    }
}

pub(crate) fn num(n: f64) -> Expr {
    Expr::Number(n)
}

pub(crate) fn text(s: &str) -> Expr {
    Expr::string(s)
}

pub(crate) fn boolean(b: bool) -> Expr {
    Expr::Bool(b)
}

pub(crate) fn bin(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::binary(op, left, right)
}
