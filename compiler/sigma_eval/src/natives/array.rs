//! `Array`: in-place array mutation.
//!
//! Pushed and inserted values are bound like a declaration would bind
//! them: copy kinds are duplicated, everything else is shared.

use sigma_heap::Gc;

use super::{size_to_number, to_size, Args, NativeLibrary};
use crate::errors::{index_out_of_bounds, native_error, EvalError};
use crate::interpreter::Interpreter;
use crate::value::Value;

/// Run `f` on the elements of the array behind `array`.
fn with_elements<R>(
    interp: &Interpreter,
    array: Gc,
    f: impl FnOnce(&mut Vec<Gc>) -> R,
) -> Result<R, EvalError> {
    interp.with_value_mut(array, |value| match value {
        Value::Array(items) => Ok(f(items)),
        other => Err(other.type_name()),
    })?
    .map_err(|got| native_error("Array", format!("expected an array, got {got}")))
}

fn pop(
    interp: &Interpreter,
    function: &'static str,
    args: &[Gc],
    front: bool,
) -> Result<Option<Gc>, EvalError> {
    let args = Args::new(function, args);
    let array = args.array(interp, 0)?;
    let removed = with_elements(interp, array, |items| {
        if items.is_empty() {
            None
        } else if front {
            Some(items.remove(0))
        } else {
            items.pop()
        }
    })?;
    removed
        .map(Some)
        .ok_or_else(|| native_error(function, "array is empty"))
}

pub(super) fn library() -> NativeLibrary {
    NativeLibrary::new("Array")
        .with_fn("resizeArray", |interp, args| {
            let args = Args::new("resizeArray", args);
            let array = args.array(interp, 0)?;
            let requested = args.number(interp, 1)?;
            let size = to_size(requested).ok_or_else(|| {
                native_error("resizeArray", format!("invalid array size {requested}"))
            })?;
            let current = with_elements(interp, array, |items| items.len())?;
            let padding: Vec<Gc> = (current..size)
                .map(|_| interp.alloc(Value::Number(0.0)))
                .collect();
            with_elements(interp, array, |items| {
                items.truncate(size);
                items.extend(padding);
            })?;
            Ok(Some(interp.alloc(Value::Number(size_to_number(size)))))
        })
        .with_fn("pushBackArray", |interp, args| {
            let args = Args::new("pushBackArray", args);
            let array = args.array(interp, 0)?;
            let element = interp.bind_copy(args.get(1)?)?;
            with_elements(interp, array, |items| items.push(element))?;
            Ok(None)
        })
        .with_fn("popBackArray", |interp, args| pop(interp, "popBackArray", args, false))
        .with_fn("pushFirstArray", |interp, args| {
            let args = Args::new("pushFirstArray", args);
            let array = args.array(interp, 0)?;
            let element = interp.bind_copy(args.get(1)?)?;
            with_elements(interp, array, |items| items.insert(0, element))?;
            Ok(None)
        })
        .with_fn("popFirstArray", |interp, args| pop(interp, "popFirstArray", args, true))
        .with_fn("insertIntoArray", |interp, args| {
            let args = Args::new("insertIntoArray", args);
            let array = args.array(interp, 0)?;
            let requested = args.number(interp, 1)?;
            let element = interp.bind_copy(args.get(2)?)?;
            with_elements(interp, array, |items| {
                let len = items.len();
                match to_size(requested).filter(|index| *index <= len) {
                    Some(index) => {
                        items.insert(index, element);
                        Ok(())
                    }
                    None => Err(index_out_of_bounds(truncate(requested), len)),
                }
            })??;
            Ok(None)
        })
        .with_fn("getArraySize", |interp, args| {
            let args = Args::new("getArraySize", args);
            let array = args.array(interp, 0)?;
            let len = with_elements(interp, array, |items| items.len())?;
            Ok(Some(interp.alloc(Value::Number(size_to_number(len)))))
        })
}

#[allow(clippy::cast_possible_truncation, reason = "only used for the error message")]
fn truncate(n: f64) -> i64 {
    n as i64
}
