//! Functions bound directly in the root frame: `toString` and `toNum`.

use super::{Args, NativeLibrary};
use crate::errors::{native_error, EvalError};
use crate::value::Value;

/// Numeric value of `value` for `toNum`.
pub(crate) fn to_number(value: &Value) -> Result<f64, EvalError> {
    match value {
        Value::Number(n) => Ok(*n),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Str(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| native_error("toNum", format!("can't convert \"{s}\" to a number"))),
        other => Err(native_error(
            "toNum",
            format!("can't convert a {} to a number", other.type_name()),
        )),
    }
}

pub(super) fn library() -> NativeLibrary {
    NativeLibrary::globals()
        .with_fn("toString", |interp, args| {
            let value = Args::new("toString", args).get(0)?;
            let text = interp.render(value)?;
            Ok(Some(interp.alloc(Value::Str(text))))
        })
        .with_fn("toNum", |interp, args| {
            let value = Args::new("toNum", args).get(0)?;
            let number = interp.with_value(value, to_number)??;
            Ok(Some(interp.alloc(Value::Number(number))))
        })
}
