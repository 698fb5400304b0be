//! `Files`: text and length-prefixed binary files, sync and async.
//!
//! Binary files hold an 8-byte little-endian length followed by that many
//! bytes. Async variants run the sync operation on the worker pool and
//! pass its result to a trailing callback; they return no value.

use std::fs;
use std::io;
use std::path::Path;

use sigma_heap::Gc;

use super::{Args, NativeLibrary};
use crate::errors::{file_not_found, io_error, EvalError};
use crate::interpreter::Interpreter;
use crate::value::Value;

const LENGTH_PREFIX: usize = 8;

fn io_context(path: &str, action: &str, err: &io::Error) -> EvalError {
    if err.kind() == io::ErrorKind::NotFound {
        file_not_found(path)
    } else {
        io_error(format!("failed to {action} {path}: {err}"))
    }
}

fn read_text(path: &str) -> Result<String, EvalError> {
    if !Path::new(path).exists() {
        return Err(file_not_found(path));
    }
    fs::read_to_string(path).map_err(|e| io_context(path, "read", &e))
}

fn write_text(path: &str, contents: &str) -> Result<(), EvalError> {
    fs::write(path, contents).map_err(|e| io_context(path, "write", &e))
}

/// Encode `bytes` in the length-prefixed binary file format.
pub(crate) fn encode_binary(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(LENGTH_PREFIX + bytes.len());
    out.extend_from_slice(&(bytes.len() as u64).to_le_bytes());
    out.extend_from_slice(bytes);
    out
}

/// Decode the length-prefixed binary file format.
pub(crate) fn decode_binary(path: &str, data: &[u8]) -> Result<Vec<u8>, EvalError> {
    let corrupt = || io_error(format!("{path} is not a binary file"));
    if data.len() < LENGTH_PREFIX {
        return Err(corrupt());
    }
    let (prefix, payload) = data.split_at(LENGTH_PREFIX);
    let mut len_bytes = [0u8; LENGTH_PREFIX];
    len_bytes.copy_from_slice(prefix);
    let len = usize::try_from(u64::from_le_bytes(len_bytes)).map_err(|_| corrupt())?;
    payload.get(..len).map(<[u8]>::to_vec).ok_or_else(corrupt)
}

fn read_binary(path: &str) -> Result<Vec<u8>, EvalError> {
    if !Path::new(path).exists() {
        return Err(file_not_found(path));
    }
    let data = fs::read(path).map_err(|e| io_context(path, "read", &e))?;
    decode_binary(path, &data)
}

fn write_binary(path: &str, bytes: &[u8]) -> Result<(), EvalError> {
    fs::write(path, encode_binary(bytes)).map_err(|e| io_context(path, "write", &e))
}

/// Value produced by a file operation, allocated on whichever
/// interpreter runs it.
enum FileResult {
    Text(String),
    Bytes(Vec<u8>),
    Written,
}

impl FileResult {
    fn into_value(self) -> Value {
        match self {
            FileResult::Text(text) => Value::Str(text),
            FileResult::Bytes(bytes) => Value::Binary(bytes),
            FileResult::Written => Value::Number(0.0),
        }
    }
}

fn sync_result(interp: &Interpreter, result: FileResult) -> Result<Option<Gc>, EvalError> {
    Ok(Some(interp.alloc(result.into_value())))
}

/// Post `op` to the worker pool and call `callback` with its result.
fn run_async<F>(interp: &Interpreter, callback: Gc, op: F)
where
    F: FnOnce() -> Result<FileResult, EvalError> + Send + 'static,
{
    interp.detach_with(callback, Vec::new(), move |worker| {
        let result = op()?;
        Ok(vec![worker.alloc(result.into_value())])
    });
}

pub(super) fn library() -> NativeLibrary {
    NativeLibrary::new("Files")
        .with_fn("readFileSync", |interp, args| {
            let args = Args::new("readFileSync", args);
            let path = args.string(interp, 0)?;
            sync_result(interp, FileResult::Text(read_text(&path)?))
        })
        .with_fn("writeFileSync", |interp, args| {
            let args = Args::new("writeFileSync", args);
            let path = args.string(interp, 0)?;
            let contents = args.string(interp, 1)?;
            write_text(&path, &contents)?;
            sync_result(interp, FileResult::Written)
        })
        .with_fn("readBinaryFileSync", |interp, args| {
            let args = Args::new("readBinaryFileSync", args);
            let path = args.string(interp, 0)?;
            sync_result(interp, FileResult::Bytes(read_binary(&path)?))
        })
        .with_fn("writeBinaryFileSync", |interp, args| {
            let args = Args::new("writeBinaryFileSync", args);
            let path = args.string(interp, 0)?;
            let bytes = args.binary(interp, 1)?;
            write_binary(&path, &bytes)?;
            sync_result(interp, FileResult::Written)
        })
        .with_fn("readFileAsync", |interp, args| {
            let args = Args::new("readFileAsync", args);
            let path = args.string(interp, 0)?;
            let callback = args.callable(interp, 1)?;
            run_async(interp, callback, move || read_text(&path).map(FileResult::Text));
            Ok(None)
        })
        .with_fn("writeFileAsync", |interp, args| {
            let args = Args::new("writeFileAsync", args);
            let path = args.string(interp, 0)?;
            let contents = args.string(interp, 1)?;
            let callback = args.callable(interp, 2)?;
            run_async(interp, callback, move || {
                write_text(&path, &contents).map(|()| FileResult::Written)
            });
            Ok(None)
        })
        .with_fn("readBinaryFileAsync", |interp, args| {
            let args = Args::new("readBinaryFileAsync", args);
            let path = args.string(interp, 0)?;
            let callback = args.callable(interp, 1)?;
            run_async(interp, callback, move || read_binary(&path).map(FileResult::Bytes));
            Ok(None)
        })
        .with_fn("writeBinaryFileAsync", |interp, args| {
            let args = Args::new("writeBinaryFileAsync", args);
            let path = args.string(interp, 0)?;
            let bytes = args.binary(interp, 1)?;
            let callback = args.callable(interp, 2)?;
            run_async(interp, callback, move || {
                write_binary(&path, &bytes).map(|()| FileResult::Written)
            });
            Ok(None)
        })
}
