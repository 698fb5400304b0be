#![allow(clippy::unwrap_used, reason = "tests use unwrap for brevity")]

use pretty_assertions::assert_eq;
use sigma_heap::Heap;
use sigma_ir::SharedInterner;

use super::*;
use crate::value::Value;

fn handles<const N: usize>() -> [Gc; N] {
    let mut heap = Heap::new();
    std::array::from_fn(|i| heap.alloc(Value::Number(i as f64)))
}

#[test]
fn declare_and_lookup() {
    let interner = SharedInterner::default();
    let x = interner.intern("x");
    let [a] = handles();

    let mut env = Environment::new();
    env.declare(x, a, false);

    assert_eq!(env.lookup(x), Some(Binding::new(a, false)));
    assert_eq!(env.lookup(interner.intern("y")), None);
}

#[test]
fn inner_declaration_shadows_until_pop() {
    let interner = SharedInterner::default();
    let x = interner.intern("x");
    let [outer, inner] = handles();

    let mut env = Environment::new();
    env.declare(x, outer, false);
    env.push_scope();
    env.declare(x, inner, false);
    assert_eq!(env.lookup(x).map(|b| b.value), Some(inner));

    env.pop_scope();
    assert_eq!(env.lookup(x).map(|b| b.value), Some(outer));
}

#[test]
fn cached_lookup_sees_new_shadow() {
    let interner = SharedInterner::default();
    let x = interner.intern("x");
    let [outer, middle_value] = handles();

    let epoch = Epoch::default();
    let root = LocalScope::new(Scope::new(None, Rc::clone(&epoch)));
    let middle = LocalScope::new(Scope::new(Some(root.clone()), Rc::clone(&epoch)));
    let mut inner = Scope::new(Some(middle.clone()), Rc::clone(&epoch));

    root.borrow_mut().declare(x, Binding::new(outer, false));
    // Populates the inner frame's cache with the root binding.
    assert_eq!(inner.lookup(x).map(|b| b.value), Some(outer));
    assert_eq!(inner.lookup(x).map(|b| b.value), Some(outer));

    middle
        .borrow_mut()
        .declare(x, Binding::new(middle_value, false));
    assert_eq!(inner.lookup(x).map(|b| b.value), Some(middle_value));
}

#[test]
fn cached_lookup_sees_rebinding() {
    let interner = SharedInterner::default();
    let x = interner.intern("x");
    let [first, second] = handles();

    let mut env = Environment::new();
    env.declare(x, first, false);
    env.push_scope();
    assert_eq!(env.lookup(x).map(|b| b.value), Some(first));

    env.reassign(x, second).unwrap();
    assert_eq!(env.lookup(x).map(|b| b.value), Some(second));
}

#[test]
fn reassign_rejects_const() {
    let interner = SharedInterner::default();
    let x = interner.intern("x");
    let [a, b] = handles();

    let mut env = Environment::new();
    env.declare(x, a, true);

    assert_eq!(env.reassign(x, b), Err(AssignError::Const));
    assert_eq!(env.lookup(x), Some(Binding::new(a, true)));
}

#[test]
fn reassign_undefined() {
    let interner = SharedInterner::default();
    let [a] = handles();
    let mut env = Environment::new();
    assert_eq!(
        env.reassign(interner.intern("nope"), a),
        Err(AssignError::Undefined)
    );
}

#[test]
fn clear_drops_bindings_of_current_frame_only() {
    let interner = SharedInterner::default();
    let x = interner.intern("x");
    let i = interner.intern("i");
    let [a, b] = handles();

    let mut env = Environment::new();
    env.declare(x, a, false);
    env.push_scope();
    env.declare(i, b, false);
    assert!(env.lookup(x).is_some());

    env.clear_current();

    assert_eq!(env.lookup(i), None);
    assert_eq!(env.lookup(x).map(|b| b.value), Some(a));
}

#[test]
fn flatten_prefers_inner_bindings() {
    let interner = SharedInterner::default();
    let x = interner.intern("x");
    let y = interner.intern("y");
    let [outer, inner, other] = handles();

    let mut env = Environment::new();
    env.declare(x, outer, false);
    env.declare(y, other, true);
    env.push_scope();
    env.declare(x, inner, false);

    let flat = env.flatten();
    assert_eq!(flat.len(), 2);
    assert_eq!(flat.get(&x), Some(&Binding::new(inner, false)));
    assert_eq!(flat.get(&y), Some(&Binding::new(other, true)));

    let mut roots = env.roots();
    roots.sort_by_key(|gc| gc.index());
    assert_eq!(roots, vec![outer, inner, other]);
}

#[test]
fn snapshot_round_trips_into_new_environment() {
    let interner = SharedInterner::default();
    let x = interner.intern("x");
    let [a] = handles();

    let mut env = Environment::new();
    env.declare(x, a, true);
    let snapshot = env.snapshot();
    drop(env);

    let mut restored = Environment::from_snapshot(&snapshot);
    assert_eq!(restored.lookup(x), Some(Binding::new(a, true)));
    assert_eq!(restored.reassign(x, a), Err(AssignError::Const));
}

#[test]
fn closure_environment_sees_captures_then_globals() {
    let interner = SharedInterner::default();
    let captured_name = interner.intern("captured");
    let global_name = interner.intern("later");
    let [c, g] = handles();

    let mut env = Environment::new();
    env.push_scope();
    env.declare(captured_name, c, false);
    let snapshot = env.snapshot();
    env.pop_scope();

    // Declared after capture, at program level.
    env.declare(global_name, g, false);

    let closure_env = env.for_closure(&snapshot);
    assert_eq!(closure_env.lookup(captured_name).map(|b| b.value), Some(c));
    assert_eq!(closure_env.lookup(global_name).map(|b| b.value), Some(g));
}

#[test]
fn bottom_frame_is_never_popped() {
    let mut env = Environment::new();
    env.pop_scope();
    env.pop_scope();
    assert_eq!(env.depth(), 1);
}
