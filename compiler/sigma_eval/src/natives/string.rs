//! `String`: conversions to text.

use super::{Args, NativeLibrary};
use crate::value::Value;

pub(super) fn library() -> NativeLibrary {
    NativeLibrary::new("String").with_fn("valueOf", |interp, args| {
        let value = Args::new("valueOf", args).get(0)?;
        let text = interp.render(value)?;
        Ok(Some(interp.alloc(Value::Str(text))))
    })
}
