//! Line/column positions inside generated or original source text.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A zero-based line and column pair, as used by source maps.
///
/// Stack frames report one-based lines and columns; conversion happens at the
/// frame boundary in `roast_trace`, never here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Zero-based line index.
    pub line: u32,
    /// Zero-based column index.
    pub column: u32,
}

impl Position {
    /// Creates a position from zero-based coordinates.
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
