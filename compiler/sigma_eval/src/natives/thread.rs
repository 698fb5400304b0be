//! `Thread`: blocking sleep and detached calls.

use std::time::Duration;

use super::{to_millis, Args, NativeLibrary};

pub(super) fn library() -> NativeLibrary {
    NativeLibrary::new("Thread")
        .with_fn("sleep", |interp, args| {
            let ms = Args::new("sleep", args).number(interp, 0)?;
            std::thread::sleep(Duration::from_millis(to_millis(ms)));
            Ok(None)
        })
        .with_fn("detach", |interp, args| {
            let args = Args::new("detach", args);
            let callee = args.callable(interp, 0)?;
            interp.detach(callee, args.rest(1).to_vec());
            Ok(None)
        })
}
