//! User-facing compile progress lines.
//!
//! Each compile prints `compiling <path>...` and then `Done` on the same line.
//! Cache hits print nothing. These lines are output, not logs, so they bypass
//! `tracing`.

use std::cell::RefCell;
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::rc::Rc;

use roast_config::{ColorMode, Settings};

const ITALIC: &str = "\x1b[3m";
const RESET_ITALIC: &str = "\x1b[23m";

/// How progress text is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStyle {
    /// Italic ANSI text.
    Styled,
    /// Plain text.
    Plain,
    /// Nothing at all.
    Silent,
}

impl ProgressStyle {
    /// The style for stdout under the given settings.
    ///
    /// A daemonized process always gets plain text.
    pub fn for_settings(settings: &Settings) -> Self {
        if settings.daemonized {
            return Self::Plain;
        }
        match settings.color {
            ColorMode::Always => Self::Styled,
            ColorMode::Never => Self::Plain,
            ColorMode::Auto if io::stdout().is_terminal() => Self::Styled,
            ColorMode::Auto => Self::Plain,
        }
    }
}

/// Writes progress lines.
pub struct ProgressReporter {
    out: RefCell<Box<dyn Write>>,
    style: ProgressStyle,
}

impl std::fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("style", &self.style)
            .finish_non_exhaustive()
    }
}

impl ProgressReporter {
    /// Writes to `out` in `style`.
    pub fn new(out: impl Write + 'static, style: ProgressStyle) -> Self {
        Self {
            out: RefCell::new(Box::new(out)),
            style,
        }
    }

    /// Writes to stdout in the style the settings call for.
    pub fn stdout(settings: &Settings) -> Self {
        Self::new(io::stdout(), ProgressStyle::for_settings(settings))
    }

    /// Writes nothing.
    pub fn silent() -> Self {
        Self::new(io::sink(), ProgressStyle::Silent)
    }

    /// The active style.
    pub fn style(&self) -> ProgressStyle {
        self.style
    }

    /// Opens the line for a compile of `relative`.
    pub fn compiling(&self, relative: &Path) {
        self.emit(&format!("compiling {}...", relative.display()));
    }

    /// Closes the line after a successful compile.
    pub fn done(&self) {
        self.emit("Done\n");
    }

    /// Closes the line after a failed compile.
    pub fn failed(&self) {
        self.emit("failed\n");
    }

    fn emit(&self, text: &str) {
        let mut out = self.out.borrow_mut();
        let result = match self.style {
            ProgressStyle::Silent => return,
            ProgressStyle::Plain => out.write_all(text.as_bytes()),
            ProgressStyle::Styled => {
                let (body, newline) = match text.strip_suffix('\n') {
                    Some(body) => (body, "\n"),
                    None => (text, ""),
                };
                write!(out, "{ITALIC}{body}{RESET_ITALIC}{newline}")
            }
        };
        if let Err(err) = result.and_then(|()| out.flush()) {
            tracing::debug!(%err, "progress output unavailable");
        }
    }
}

/// A shared in-memory writer, for capturing progress output.
#[derive(Debug, Clone, Default)]
pub struct CaptureBuffer(Rc<RefCell<Vec<u8>>>);

impl CaptureBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }

    /// Discards everything written so far.
    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

impl Write for CaptureBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
