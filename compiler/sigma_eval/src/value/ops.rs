//! Arena-level value operations: copying, in-place overwrite, rendering.
//!
//! These run against a locked [`Heap`], so callers hold the arena mutex
//! for the duration of one call and no script code runs meanwhile.

use std::fmt::Write as _;

use rustc_hash::FxHashMap;
use sigma_heap::{Gc, Heap, HeapError};
use sigma_stack::ensure_sufficient_stack;

use super::Value;
use crate::errors::{invalid_set_value, EvalError};

/// Prepare a value for binding or storage.
///
/// Copy kinds get a fresh slot holding the same content; identity kinds
/// are returned as-is.
pub fn bind_copy(heap: &mut Heap<Value>, gc: Gc) -> Result<Gc, HeapError> {
    let value = heap.get(gc)?;
    if value.is_copy() {
        let copy = value.clone();
        Ok(heap.alloc(copy))
    } else {
        Ok(gc)
    }
}

/// Deep copy of `gc`.
///
/// Arrays and structs are copied element by element; shared children are
/// copied once and cycles are preserved. Native functions and document
/// elements copy to themselves. References are copied as references to the
/// same target.
pub fn duplicate(heap: &mut Heap<Value>, gc: Gc) -> Result<Gc, HeapError> {
    let mut copies = FxHashMap::default();
    duplicate_in(heap, gc, &mut copies)
}

fn duplicate_in(
    heap: &mut Heap<Value>,
    gc: Gc,
    copies: &mut FxHashMap<Gc, Gc>,
) -> Result<Gc, HeapError> {
    if let Some(&copy) = copies.get(&gc) {
        return Ok(copy);
    }
    match heap.get(gc)?.clone() {
        Value::Native(_) | Value::External(_) => Ok(gc),
        Value::Array(elements) => {
            let copy = heap.alloc(Value::Array(Vec::new()));
            copies.insert(gc, copy);
            let mut copied = Vec::with_capacity(elements.len());
            for element in elements {
                copied.push(ensure_sufficient_stack(|| {
                    duplicate_in(heap, element, copies)
                })?);
            }
            heap.replace(copy, Value::Array(copied))?;
            Ok(copy)
        }
        Value::Struct(fields) => {
            let copy = heap.alloc(Value::Struct(FxHashMap::default()));
            copies.insert(gc, copy);
            let mut copied = FxHashMap::default();
            copied.reserve(fields.len());
            for (name, field) in fields {
                let field = ensure_sufficient_stack(|| duplicate_in(heap, field, copies))?;
                copied.insert(name, field);
            }
            heap.replace(copy, Value::Struct(copied))?;
            Ok(copy)
        }
        other => {
            let copy = heap.alloc(other);
            copies.insert(gc, copy);
            Ok(copy)
        }
    }
}

/// Overwrite `target` in place with the content of `source`.
///
/// Only defined between two values of the same copy kind; every alias of
/// `target` observes the new content.
pub fn set_value(heap: &mut Heap<Value>, target: Gc, source: Gc) -> Result<(), EvalError> {
    let content = heap.get(source)?.clone();
    let current = heap.get(target)?;
    if !current.is_copy() || !current.same_kind(&content) {
        return Err(invalid_set_value(current.type_name(), content.type_name()));
    }
    heap.replace(target, content)?;
    Ok(())
}

/// Display form of a number: integral values print without a fraction.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        #[allow(clippy::cast_possible_truncation, reason = "range checked above")]
        let whole = n as i64;
        whole.to_string()
    } else {
        n.to_string()
    }
}

/// Display form of a value.
///
/// Strings print raw at the top level and quoted inside arrays.
pub fn render(heap: &Heap<Value>, gc: Gc) -> Result<String, HeapError> {
    let mut out = String::new();
    let mut open = Vec::new();
    render_into(heap, gc, false, &mut open, &mut out)?;
    Ok(out)
}

fn render_into(
    heap: &Heap<Value>,
    gc: Gc,
    nested: bool,
    open: &mut Vec<Gc>,
    out: &mut String,
) -> Result<(), HeapError> {
    match heap.get(gc)? {
        Value::Number(n) => out.push_str(&format_number(*n)),
        Value::Str(s) if nested => {
            out.push('"');
            out.push_str(s);
            out.push('"');
        }
        Value::Str(s) => out.push_str(s),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Array(elements) => {
            if open.contains(&gc) {
                out.push_str("[...]");
                return Ok(());
            }
            open.push(gc);
            out.push_str("[ ");
            for &element in elements {
                ensure_sufficient_stack(|| render_into(heap, element, true, open, out))?;
                out.push_str(", ");
            }
            out.push(']');
            open.pop();
        }
        Value::Struct(_) => out.push_str("<struct>"),
        Value::Closure(_) => out.push_str("<lambda>"),
        Value::Native(_) => out.push_str("<native fn>"),
        Value::Binary(bytes) => out.push_str(&hex::encode(bytes)),
        Value::Reference(target) => {
            if open.contains(&gc) {
                out.push_str("<ref>");
                return Ok(());
            }
            open.push(gc);
            let target = *target;
            ensure_sufficient_stack(|| render_into(heap, target, nested, open, out))?;
            open.pop();
        }
        Value::External(handle) => {
            let _ = write!(out, "<element #{}>", handle.0);
        }
    }
    Ok(())
}
