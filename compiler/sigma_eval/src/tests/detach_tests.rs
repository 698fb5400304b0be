//! Detached calls on the worker pool.

use pretty_assertions::assert_eq;
use sigma_ir::{BinaryOp, Expr, Stmt};

use super::{bin, num, text, Harness};
use crate::value::Value;

/// `results`, collected by workers through `Array.pushBackArray`.
fn results(h: &Harness) -> Vec<Value> {
    match h.value(h.global("results")) {
        Value::Array(items) => items.into_iter().map(|item| h.value(item)).collect(),
        other => panic!("expected an array, got {other:?}"),
    }
}

fn numbers(values: Vec<Value>) -> Vec<f64> {
    let mut numbers: Vec<f64> = values
        .into_iter()
        .map(|value| value.as_number().unwrap())
        .collect();
    numbers.sort_by(f64::total_cmp);
    numbers
}

/// `Array.pushBackArray(results, value);`
fn push_result(h: &Harness, value: Expr) -> Stmt {
    Stmt::expr(h.ns_call(
        "Array",
        "pushBackArray",
        vec![h.ident("results"), value],
    ))
}

#[test]
fn detached_closures_run_on_workers() {
    let mut h = Harness::new();
    let work = h.closure(
        &["n"],
        vec![push_result(&h, bin(BinaryOp::Mul, h.ident("n"), num(2.0)))],
    );
    let stmts = vec![
        h.var("results", Expr::Array(vec![])),
        h.var("work", work),
        Stmt::expr(h.ns_call("Thread", "detach", vec![h.ident("work"), num(1.0)])),
        Stmt::expr(h.ns_call("Thread", "detach", vec![h.ident("work"), num(2.0)])),
    ];
    h.run(stmts).unwrap();
    h.interp.workers().wait_idle();

    assert_eq!(numbers(results(&h)), vec![2.0, 4.0]);
}

#[test]
fn pinned_arguments_survive_a_collection_while_queued() {
    let mut h = Harness::new();
    let work = h.closure(
        &["xs"],
        vec![
            Stmt::expr(h.ns_call("Thread", "sleep", vec![num(20.0)])),
            push_result(&h, Expr::index(h.ident("xs"), vec![num(0.0)])),
        ],
    );
    let stmts = vec![
        h.var("results", Expr::Array(vec![])),
        h.var("work", work),
        Stmt::expr(h.ns_call(
            "Thread",
            "detach",
            vec![h.ident("work"), Expr::Array(vec![num(5.0)])],
        )),
    ];
    h.run(stmts).unwrap();
    h.interp.collect_garbage().unwrap();
    h.interp.workers().wait_idle();

    assert_eq!(numbers(results(&h)), vec![5.0]);
}

#[test]
fn failing_tasks_do_not_disturb_the_host() {
    let mut h = Harness::new();
    let broken = h.closure(&[], vec![Stmt::expr(h.ident("missing"))]);
    let stmts = vec![
        h.var("broken", broken),
        Stmt::expr(h.ns_call("Thread", "detach", vec![h.ident("broken")])),
    ];
    h.run(stmts).unwrap();
    h.interp.workers().wait_idle();
    assert_eq!(h.interp.workers().in_flight(), 0);

    let result = h.eval(vec![Stmt::expr(num(1.0))]);
    assert_eq!(h.number(result), 1.0);
}

#[test]
fn async_file_read_calls_back_with_the_contents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("note.txt");
    let path = path.to_str().unwrap();

    let mut h = Harness::new();
    let callback = h.closure(&["contents"], vec![push_result(&h, h.ident("contents"))]);
    let stmts = vec![
        h.var("results", Expr::Array(vec![])),
        Stmt::expr(h.ns_call(
            "Files",
            "writeFileSync",
            vec![text(path), text("hello")],
        )),
        Stmt::expr(h.ns_call("Files", "readFileAsync", vec![text(path), callback])),
    ];
    h.run(stmts).unwrap();
    h.interp.workers().wait_idle();

    assert_eq!(results(&h), vec![Value::string("hello")]);
}

#[test]
fn async_binary_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("key.bin");
    let path = path.to_str().unwrap();

    let mut h = Harness::new();
    let on_read = h.closure(&["bytes"], vec![push_result(&h, h.ident("bytes"))]);
    let on_write = h.closure(
        &["status"],
        vec![Stmt::expr(h.ns_call(
            "Files",
            "readBinaryFileAsync",
            vec![text(path), on_read],
        ))],
    );
    let key = h.interp.alloc(Value::Binary(vec![1, 2, 3]));
    let stmts = vec![
        h.var("results", Expr::Array(vec![])),
        Stmt::expr(h.ns_call(
            "Files",
            "writeBinaryFileAsync",
            vec![text(path), h.ident("key"), on_write],
        )),
    ];
    let key_name = h.name("key");
    h.interp.env_mut().declare(key_name, key, false);
    h.run(stmts).unwrap();
    h.interp.workers().wait_idle();

    assert_eq!(results(&h), vec![Value::Binary(vec![1, 2, 3])]);
}
