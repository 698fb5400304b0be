//! Closures: capture, recursion, argument binding and `this`.

use pretty_assertions::assert_eq;
use sigma_ir::{BinaryOp, Expr, Name, Stmt};

use super::{bin, num, Harness};
use crate::errors::EvalErrorKind;
use crate::interpreter::Interpreter;
use crate::value::Value;

#[test]
fn inner_closure_keeps_the_outer_argument() {
    let mut h = Harness::new();
    let adder = h.closure(
        &["x"],
        vec![Stmt::ret(bin(BinaryOp::Add, h.ident("x"), h.ident("n")))],
    );
    let stmts = vec![
        h.var("make", h.closure(&["n"], vec![Stmt::ret(adder)])),
        h.var("add2", h.call("make", vec![num(2.0)])),
        h.var("add10", h.call("make", vec![num(10.0)])),
        Stmt::expr(bin(
            BinaryOp::Add,
            h.call("add2", vec![num(3.0)]),
            h.call("add10", vec![num(0.0)]),
        )),
    ];
    let result = h.eval(stmts);
    assert_eq!(h.number(result), 15.0);
}

#[test]
fn top_level_closures_can_recurse() {
    let mut h = Harness::new();
    let n = h.ident("n");
    let body = vec![
        Stmt::if_then(bin(BinaryOp::LtEq, n.clone(), num(1.0)), vec![Stmt::ret(num(1.0))]),
        Stmt::ret(bin(
            BinaryOp::Mul,
            n.clone(),
            h.call("fact", vec![bin(BinaryOp::Sub, n, num(1.0))]),
        )),
    ];
    let stmts = vec![
        h.var("fact", h.closure(&["n"], body)),
        Stmt::expr(h.call("fact", vec![num(5.0)])),
    ];
    let result = h.eval(stmts);
    assert_eq!(h.number(result), 120.0);
}

#[test]
fn arity_must_match() {
    let mut h = Harness::new();
    let stmts = vec![
        h.var("f", h.closure(&["x"], vec![Stmt::ret(h.ident("x"))])),
        Stmt::expr(h.call("f", vec![num(1.0), num(2.0)])),
    ];
    let err = h.error(stmts);
    assert_eq!(err.message, "lambda expects 1 argument, got 2");
}

#[test]
fn runaway_recursion_hits_the_depth_limit() {
    let mut h = Harness::with_builder(Interpreter::builder().max_call_depth(50));
    let body = vec![Stmt::ret(h.call(
        "spin",
        vec![bin(BinaryOp::Add, h.ident("n"), num(1.0))],
    ))];
    let stmts = vec![
        h.var("spin", h.closure(&["n"], body)),
        Stmt::expr(h.call("spin", vec![num(0.0)])),
    ];
    let err = h.error(stmts);
    assert_eq!(err.kind, EvalErrorKind::StackOverflow { depth: 50 });
    assert_eq!(h.interp.call_depth(), 0);
}

#[test]
fn copy_arguments_are_duplicated() {
    let mut h = Harness::new();
    let stmts = vec![
        h.var("a", num(1.0)),
        h.var("f", h.closure(&["x"], vec![h.assign("x", num(10.0))])),
        Stmt::expr(h.call("f", vec![h.ident("a")])),
    ];
    h.run(stmts).unwrap();
    assert_eq!(h.global_number("a"), 1.0);
}

#[test]
fn identity_arguments_are_shared() {
    let mut h = Harness::new();
    let poke = Stmt::IndexAssign {
        target: h.ident("arr"),
        path: vec![num(0.0)],
        value: num(9.0),
    };
    let stmts = vec![
        h.var("xs", Expr::Array(vec![num(1.0), num(2.0)])),
        h.var("g", h.closure(&["arr"], vec![poke])),
        Stmt::expr(h.call("g", vec![h.ident("xs")])),
        Stmt::expr(Expr::index(h.ident("xs"), vec![num(0.0)])),
    ];
    let result = h.eval(stmts);
    assert_eq!(h.number(result), 9.0);
}

#[test]
fn method_calls_bind_this() {
    let mut h = Harness::new();
    let getter = h.closure(&[], vec![Stmt::ret(h.ident("x"))]);
    let setter = h.closure(&["v"], vec![h.assign("x", h.ident("v"))]);
    let explicit = h.closure(
        &[],
        vec![Stmt::ret(h.member(Expr::ident(Name::THIS), &["x"]))],
    );
    let object = Expr::Object(vec![
        (h.name("x"), num(3.0)),
        (h.name("get"), getter),
        (h.name("set"), setter),
        (h.name("peek"), explicit),
    ]);
    let p = h.ident("p");
    let stmts = vec![
        h.var("p", object),
        h.var("before", Expr::method_call(p.clone(), h.name("get"), vec![])),
        Stmt::expr(Expr::method_call(p.clone(), h.name("set"), vec![num(8.0)])),
        Stmt::expr(Expr::method_call(p, h.name("peek"), vec![])),
    ];
    let result = h.eval(stmts);
    assert_eq!(h.number(result), 8.0);
    assert_eq!(h.global_number("before"), 3.0);
}

#[test]
fn calling_a_number_fails() {
    let mut h = Harness::new();
    let stmts = vec![h.var("n", num(1.0)), Stmt::expr(h.call("n", vec![]))];
    let err = h.error(stmts);
    assert_eq!(err.message, "number is not callable");
}

#[test]
fn closure_without_return_has_no_value() {
    let mut h = Harness::new();
    let stmts = vec![
        h.var("f", h.closure(&[], vec![])),
        h.var("r", h.call("f", vec![])),
    ];
    let err = h.error(stmts);
    assert_eq!(
        err.kind,
        EvalErrorKind::NoValue {
            context: "variable initializer"
        }
    );
}

#[test]
fn host_can_call_script_functions() {
    let mut h = Harness::new();
    let body = vec![Stmt::ret(bin(BinaryOp::Mul, h.ident("x"), num(2.0)))];
    h.run(vec![h.var("double", h.closure(&["x"], body))]).unwrap();

    let double = h.global("double");
    let arg = h.interp.alloc(Value::Number(21.0));
    let result = h.interp.call_function(double, &[arg]).unwrap().unwrap();
    assert_eq!(h.number(result), 42.0);
}
