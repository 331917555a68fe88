//! Stack frames as seen by the trace formatter.

use std::fmt;
use std::path::PathBuf;

/// One frame of a stack trace. Lines and columns are one-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    /// Function name, when known.
    pub function: Option<String>,
    /// The file the frame's code was loaded under.
    pub file: PathBuf,
    /// One-based line.
    pub line: u32,
    /// One-based column.
    pub column: u32,
}

impl StackFrame {
    /// Creates an anonymous frame.
    pub fn new(file: impl Into<PathBuf>, line: u32, column: u32) -> Self {
        Self {
            function: None,
            file: file.into(),
            line,
            column,
        }
    }

    /// Names the frame's function.
    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.function = Some(function.into());
        self
    }
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.function {
            Some(function) => write!(
                f,
                "at {function} ({}:{}:{})",
                self.file.display(),
                self.line,
                self.column
            ),
            None => write!(f, "at {}:{}:{}", self.file.display(), self.line, self.column),
        }
    }
}
