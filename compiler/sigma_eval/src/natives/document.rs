//! `Document`: element access through the host's [`DomAccessor`].
//!
//! [`DomAccessor`]: crate::dom::DomAccessor

use super::{Args, NativeLibrary};
use crate::dom::SharedDom;
use crate::errors::{native_error, wrong_arg_type, EvalError};
use crate::interpreter::Interpreter;
use crate::value::Value;

fn attached(interp: &Interpreter, function: &'static str) -> Result<SharedDom, EvalError> {
    interp
        .dom()
        .cloned()
        .ok_or_else(|| native_error(function, "no document attached"))
}

pub(super) fn library() -> NativeLibrary {
    NativeLibrary::new("Document")
        .with_fn("getElementById", |interp, args| {
            let id = Args::new("getElementById", args).string(interp, 0)?;
            let dom = attached(interp, "getElementById")?;
            Ok(dom
                .element_by_id(&id)
                .map(|element| interp.alloc(Value::External(element))))
        })
        .with_fn("getElementsByClassName", |interp, args| {
            let class = Args::new("getElementsByClassName", args).string(interp, 0)?;
            let dom = attached(interp, "getElementsByClassName")?;
            let elements = dom
                .elements_by_class_name(&class)
                .into_iter()
                .map(|element| interp.alloc(Value::External(element)))
                .collect();
            Ok(Some(interp.alloc(Value::Array(elements))))
        })
        .with_fn("setInnerHtml", |interp, args| {
            let args = Args::new("setInnerHtml", args);
            let element = args.get(0)?;
            let element = interp.with_value(element, |value| match value {
                Value::External(handle) => Ok(*handle),
                other => Err(wrong_arg_type("setInnerHtml", 1, "element", other.type_name())),
            })??;
            let markup = args.string(interp, 1)?;
            let dom = attached(interp, "setInnerHtml")?;
            dom.set_inner_html(element, &markup)
                .map_err(|message| native_error("setInnerHtml", message))?;
            Ok(None)
        })
}
