//! `Time`: wall-clock time.

use std::time::{SystemTime, UNIX_EPOCH};

use super::NativeLibrary;
use crate::errors::native_error;
use crate::value::Value;

pub(super) fn library() -> NativeLibrary {
    NativeLibrary::new("Time").with_fn("getCurrentTimeMillis", |interp, _args| {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| native_error("getCurrentTimeMillis", e.to_string()))?;
        #[allow(
            clippy::cast_precision_loss,
            reason = "millisecond timestamps stay below 2^53 for millennia"
        )]
        let millis = elapsed.as_millis() as f64;
        Ok(Some(interp.alloc(Value::Number(millis))))
    })
}
