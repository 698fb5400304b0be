//! Scoping, conditionals, loops and control signals.

use pretty_assertions::assert_eq;
use sigma_ir::{BinaryOp, Expr, IfStmt, Stmt};

use super::{bin, boolean, num, text, Harness};
use crate::errors::EvalErrorKind;

/// `for (var i = 0; i < n; i++) { body }`
fn counting_loop(h: &Harness, n: f64, body: Vec<Stmt>) -> Stmt {
    Stmt::for_loop(
        h.var("i", num(0.0)),
        bin(BinaryOp::Lt, h.ident("i"), num(n)),
        Stmt::expr(Expr::increment(h.ident("i"))),
        body,
    )
}

#[test]
fn for_loop_counts() {
    let mut h = Harness::new();
    let stmts = vec![counting_loop(&h, 3.0, vec![h.println(h.ident("i"))])];
    h.run(stmts).unwrap();
    assert_eq!(h.output(), "0\n1\n2\n");
}

#[test]
fn loop_counter_is_scoped_to_the_loop() {
    let mut h = Harness::new();
    let stmts = vec![
        counting_loop(&h, 2.0, vec![]),
        Stmt::expr(h.ident("i")),
    ];
    let err = h.error(stmts);
    assert_eq!(err.message, "variable i not found");
}

#[test]
fn body_bindings_do_not_survive_an_iteration() {
    let mut h = Harness::new();
    let body = vec![
        Stmt::if_then(
            bin(BinaryOp::Eq, h.ident("i"), num(1.0)),
            vec![h.println(h.ident("leak"))],
        ),
        h.var("leak", h.ident("i")),
    ];
    let stmts = vec![counting_loop(&h, 3.0, body)];
    let err = h.error(stmts);
    assert_eq!(
        err.kind,
        EvalErrorKind::UndefinedVariable {
            name: "leak".to_string()
        }
    );
}

#[test]
fn while_loop_runs_until_false() {
    let mut h = Harness::new();
    let n = h.ident("n");
    let stmts = vec![
        h.var("n", num(0.0)),
        Stmt::while_loop(
            bin(BinaryOp::Lt, n.clone(), num(5.0)),
            vec![Stmt::expr(Expr::increment(n.clone()))],
        ),
        Stmt::expr(n),
    ];
    let result = h.eval(stmts);
    assert_eq!(h.number(result), 5.0);
}

#[test]
fn return_unwinds_loops_inside_a_closure() {
    let mut h = Harness::new();
    let count = h.ident("count");
    let body = vec![
        h.var("count", num(0.0)),
        Stmt::while_loop(
            boolean(true),
            vec![
                Stmt::expr(Expr::increment(count.clone())),
                Stmt::if_then(
                    bin(BinaryOp::Eq, count.clone(), num(3.0)),
                    vec![Stmt::ret(count.clone())],
                ),
            ],
        ),
    ];
    let stmts = vec![
        h.var("f", h.closure(&[], body)),
        Stmt::expr(h.call("f", vec![])),
    ];
    let result = h.eval(stmts);
    assert_eq!(h.number(result), 3.0);
}

#[test]
fn break_and_continue() {
    let mut h = Harness::new();
    let i = h.ident("i");
    let body = vec![
        Stmt::if_then(bin(BinaryOp::Eq, i.clone(), num(5.0)), vec![Stmt::Break]),
        Stmt::if_then(
            bin(
                BinaryOp::Eq,
                bin(BinaryOp::Mod, i.clone(), num(2.0)),
                num(0.0),
            ),
            vec![Stmt::Continue],
        ),
        Stmt::CompoundAssign {
            target: h.ident("sum"),
            op: BinaryOp::Add,
            value: i,
        },
    ];
    let stmts = vec![
        h.var("sum", num(0.0)),
        counting_loop(&h, 10.0, body),
        Stmt::expr(h.ident("sum")),
    ];
    let result = h.eval(stmts);
    assert_eq!(h.number(result), 4.0);
}

#[test]
fn stray_break_is_an_error() {
    let mut h = Harness::new();
    let err = h.error(vec![Stmt::if_then(boolean(true), vec![Stmt::Break])]);
    assert_eq!(
        err.kind,
        EvalErrorKind::InvalidControlFlow { signal: "break" }
    );
    assert_eq!(err.message, "`break` used outside of an enclosing construct");
}

#[test]
fn return_inside_a_closure_loop_body_leaves_the_loop() {
    let mut h = Harness::new();
    let stmts = vec![
        h.var(
            "first",
            h.closure(&[], vec![counting_loop(&h, 10.0, vec![Stmt::ret(h.ident("i"))])]),
        ),
        Stmt::expr(h.call("first", vec![])),
    ];
    let result = h.eval(stmts);
    assert_eq!(h.number(result), 0.0);
}

#[test]
fn else_if_chain_picks_the_first_true_branch() {
    let mut h = Harness::new();
    let x = h.ident("x");
    let chain = IfStmt {
        cond: bin(BinaryOp::Lt, x.clone(), num(3.0)),
        then_branch: vec![h.assign("r", text("low"))].into(),
        else_ifs: Vec::new(),
        else_branch: None,
    }
    .else_if(
        bin(BinaryOp::Lt, x.clone(), num(10.0)),
        vec![h.assign("r", text("mid"))],
    )
    .else_if(
        bin(BinaryOp::Lt, x, num(20.0)),
        vec![h.assign("r", text("also mid"))],
    )
    .otherwise(vec![h.assign("r", text("high"))]);

    let stmts = vec![
        h.var("x", num(5.0)),
        h.var("r", text("")),
        Stmt::If(chain),
        Stmt::expr(h.ident("r")),
    ];
    let result = h.eval(stmts);
    assert_eq!(h.text(result), "mid");
}

#[test]
fn conditions_must_be_bools() {
    let mut h = Harness::new();
    let err = h.error(vec![Stmt::if_then(num(1.0), vec![])]);
    assert_eq!(
        err.message,
        "if statement expression must result in a boolean value"
    );

    let err = h.error(vec![Stmt::while_loop(text("yes"), vec![])]);
    assert_eq!(
        err.kind,
        EvalErrorKind::NonBooleanCondition {
            construct: "while statement"
        }
    );
}

#[test]
fn inner_declarations_shadow_outer_ones() {
    let mut h = Harness::new();
    let stmts = vec![
        h.var("x", num(1.0)),
        Stmt::if_then(
            boolean(true),
            vec![h.var("x", num(2.0)), h.println(h.ident("x"))],
        ),
        Stmt::expr(h.ident("x")),
    ];
    let result = h.eval(stmts);
    assert_eq!(h.number(result), 1.0);
    assert_eq!(h.output(), "2\n");
}

#[test]
fn assignment_reaches_the_declaring_frame() {
    let mut h = Harness::new();
    let stmts = vec![
        h.var("x", num(1.0)),
        Stmt::if_then(boolean(true), vec![h.assign("x", num(9.0))]),
    ];
    h.run(stmts).unwrap();
    assert_eq!(h.global_number("x"), 9.0);
}

#[test]
fn const_bindings_reject_assignment() {
    let mut h = Harness::new();
    let stmts = vec![h.constant("c", num(1.0)), h.assign("c", num(2.0))];
    let err = h.error(stmts);
    assert_eq!(
        err.message,
        "can't reinitialize c: variable is marked as const"
    );
    assert_eq!(h.global_number("c"), 1.0);
}

#[test]
fn undefined_variable() {
    let mut h = Harness::new();
    let err = h.error(vec![Stmt::expr(h.ident("nope"))]);
    assert_eq!(err.message, "variable nope not found");
}

#[test]
fn program_value_is_the_last_expression() {
    let mut h = Harness::new();
    let stmts = vec![
        h.var("a", num(1.0)),
        Stmt::expr(bin(BinaryOp::Add, h.ident("a"), num(1.0))),
        h.var("b", num(3.0)),
    ];
    let result = h.eval(stmts);
    assert_eq!(h.number(result), 2.0);
}

#[test]
fn top_level_return_ends_the_program() {
    let mut h = Harness::new();
    let stmts = vec![Stmt::ret(num(7.0)), h.println(text("unreachable"))];
    let result = h.eval(stmts);
    assert_eq!(h.number(result), 7.0);
    assert_eq!(h.output(), "");
}

#[test]
fn empty_program_has_no_value() {
    let mut h = Harness::new();
    assert!(h.run(vec![]).unwrap().is_none());
}

#[test]
fn evaluating_a_program_starts_from_fresh_globals() {
    let mut h = Harness::new();
    h.run(vec![h.var("kept", num(1.0))]).unwrap();
    let result = h.eval(vec![Stmt::expr(h.ident("kept"))]);
    assert_eq!(h.number(result), 1.0);

    let err = h
        .run_program(vec![Stmt::expr(h.ident("kept"))])
        .unwrap_err();
    assert_eq!(err.message, "variable kept not found");

    let result = h
        .run_program(vec![Stmt::expr(h.call("toString", vec![num(3.0)]))])
        .unwrap()
        .unwrap();
    assert_eq!(h.text(result), "3");
}
