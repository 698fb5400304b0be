//! `GC`: script-driven collection.
//!
//! `mark` roots every binding visible to the calling interpreter (callers
//! suspended in closure calls included) plus the arguments. `sweep` waits
//! for running detached tasks and fails inside one. `collect` does both
//! and returns the number of values freed.

use super::NativeLibrary;
use crate::value::Value;

pub(super) fn library() -> NativeLibrary {
    NativeLibrary::new("GC")
        .with_fn("mark", |interp, args| {
            interp.mark(args.iter().copied());
            Ok(None)
        })
        .with_fn("sweep", |interp, _args| {
            interp.sweep()?;
            Ok(None)
        })
        .with_fn("collect", |interp, args| {
            interp.mark(args.iter().copied());
            let stats = interp.sweep()?;
            #[allow(
                clippy::cast_precision_loss,
                reason = "freed counts stay far below 2^53"
            )]
            let freed = stats.freed as f64;
            Ok(Some(interp.alloc(Value::Number(freed))))
        })
}
