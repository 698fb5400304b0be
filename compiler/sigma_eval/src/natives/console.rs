//! `Console`: colored output and line input through the print handler.

use super::{size_to_number, Args, NativeLibrary};
use crate::errors::{io_error, native_error, EvalError};
use crate::interpreter::Interpreter;
use crate::value::Value;

/// ANSI SGR code of a named color.
fn color_code(name: &str) -> Option<u8> {
    let code = match name {
        "black" => 30,
        "red" => 31,
        "green" => 32,
        "yellow" => 33,
        "blue" => 34,
        "magenta" => 35,
        "cyan" => 36,
        "white" => 37,
        "bg_black" => 40,
        "bg_red" => 41,
        "bg_green" => 42,
        "bg_yellow" => 43,
        "bg_blue" => 44,
        "bg_magenta" => 45,
        "bg_cyan" => 46,
        "bg_white" => 47,
        _ => return None,
    };
    Some(code)
}

/// The text argument, wrapped in color codes when a color is given.
fn styled(interp: &Interpreter, args: &Args<'_>) -> Result<(String, usize), EvalError> {
    let text = args.string(interp, 0)?;
    let len = text.len();
    if args.opt(1).is_none() {
        return Ok((text, len));
    }
    let color = args.string(interp, 1)?;
    let code = color_code(&color)
        .ok_or_else(|| native_error(args.function(), format!("unknown color {color}")))?;
    Ok((format!("\x1b[{code}m{text}\x1b[0m"), len))
}

pub(super) fn library() -> NativeLibrary {
    NativeLibrary::new("Console")
        .with_fn("println", |interp, args| {
            let args = Args::new("println", args);
            let (text, len) = styled(interp, &args)?;
            interp.print_handler().println(&text);
            Ok(Some(interp.alloc(Value::Number(size_to_number(len + 1)))))
        })
        .with_fn("print", |interp, args| {
            let args = Args::new("print", args);
            let (text, len) = styled(interp, &args)?;
            interp.print_handler().print(&text);
            Ok(Some(interp.alloc(Value::Number(size_to_number(len)))))
        })
        .with_fn("input", |interp, _args| {
            let line = interp
                .print_handler()
                .read_line()
                .map_err(|e| io_error(format!("failed to read input: {e}")))?;
            Ok(Some(interp.alloc(Value::Str(line))))
        })
}
