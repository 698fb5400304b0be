//! Console output and input destinations.
//!
//! `Console.print`, `Console.println` and `Console.input` go through a
//! [`SharedPrintHandler`] so hosts and tests choose where text goes:
//! - `Stdout`: process stdout and stdin (default)
//! - `Buffer`: captured in memory, with scripted input lines for tests
//! - `Silent`: output discarded, input always empty

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use parking_lot::Mutex;

/// In-memory output capture plus a queue of input lines.
#[derive(Default)]
pub struct BufferPrintHandler {
    output: Mutex<String>,
    input: Mutex<VecDeque<String>>,
}

impl BufferPrintHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handler whose `read_line` returns `lines` in order.
    pub fn with_input<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        BufferPrintHandler {
            output: Mutex::new(String::new()),
            input: Mutex::new(lines.into_iter().map(Into::into).collect()),
        }
    }

    fn print(&self, msg: &str) {
        self.output.lock().push_str(msg);
    }

    fn read_line(&self) -> String {
        self.input.lock().pop_front().unwrap_or_default()
    }

    pub fn get_output(&self) -> String {
        self.output.lock().clone()
    }

    pub fn clear(&self) {
        self.output.lock().clear();
    }
}

/// Where console text goes.
pub enum PrintHandlerImpl {
    Stdout,
    Buffer(BufferPrintHandler),
    Silent,
}

impl PrintHandlerImpl {
    /// Print with a trailing newline.
    pub fn println(&self, msg: &str) {
        match self {
            Self::Stdout => println!("{msg}"),
            Self::Buffer(h) => {
                h.print(msg);
                h.print("\n");
            }
            Self::Silent => {}
        }
    }

    pub fn print(&self, msg: &str) {
        match self {
            Self::Stdout => {
                print!("{msg}");
                let _ = io::stdout().flush();
            }
            Self::Buffer(h) => h.print(msg),
            Self::Silent => {}
        }
    }

    /// One line of input without its line terminator.
    pub fn read_line(&self) -> io::Result<String> {
        match self {
            Self::Stdout => {
                let mut line = String::new();
                io::stdin().lock().read_line(&mut line)?;
                let trimmed = line.trim_end_matches(['\n', '\r']).len();
                line.truncate(trimmed);
                Ok(line)
            }
            Self::Buffer(h) => Ok(h.read_line()),
            Self::Silent => Ok(String::new()),
        }
    }

    /// Captured output; empty for handlers that do not capture.
    pub fn get_output(&self) -> String {
        match self {
            Self::Buffer(h) => h.get_output(),
            Self::Stdout | Self::Silent => String::new(),
        }
    }

    pub fn clear(&self) {
        if let Self::Buffer(h) = self {
            h.clear();
        }
    }
}

/// Handler shared by every interpreter of one runtime, workers included.
pub type SharedPrintHandler = Arc<PrintHandlerImpl>;

pub fn stdout_handler() -> SharedPrintHandler {
    Arc::new(PrintHandlerImpl::Stdout)
}

pub fn buffer_handler() -> SharedPrintHandler {
    Arc::new(PrintHandlerImpl::Buffer(BufferPrintHandler::new()))
}

/// Buffer handler preloaded with input lines.
pub fn scripted_handler<I, S>(lines: I) -> SharedPrintHandler
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Arc::new(PrintHandlerImpl::Buffer(BufferPrintHandler::with_input(
        lines,
    )))
}

pub fn silent_handler() -> SharedPrintHandler {
    Arc::new(PrintHandlerImpl::Silent)
}
