//! `Object`: references and deep copies.

use super::{Args, NativeLibrary};
use crate::errors::wrong_arg_type;
use crate::value::Value;

pub(super) fn library() -> NativeLibrary {
    NativeLibrary::new("Object")
        .with_fn("ref", |interp, args| {
            let target = Args::new("ref", args).get(0)?;
            Ok(Some(interp.alloc(Value::Reference(target))))
        })
        .with_fn("valByRef", |interp, args| {
            let reference = Args::new("valByRef", args).get(0)?;
            let target = interp.with_value(reference, |value| match value {
                Value::Reference(target) => Ok(*target),
                other => Err(wrong_arg_type("valByRef", 1, "reference", other.type_name())),
            })??;
            Ok(Some(target))
        })
        .with_fn("clone", |interp, args| {
            let source = Args::new("clone", args).get(0)?;
            Ok(Some(interp.duplicate(source)?))
        })
}
