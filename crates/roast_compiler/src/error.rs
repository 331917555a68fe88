//! Error types for transpiler location and compilation.

use std::path::PathBuf;

/// A failure reported by a [`Transpiler`](crate::Transpiler) implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TranspileError {
    /// Human-readable description, usually the transpiler's own diagnostic.
    pub message: String,
}

impl TranspileError {
    /// Creates a transpile error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A source file could not be compiled.
///
/// Always recoverable: the loader falls back to the uncached handler.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// The transpiler rejected the source.
    #[error("failed to compile {path}: {source}")]
    Transpile {
        /// The source file being compiled.
        path: PathBuf,
        /// The transpiler's report.
        source: TranspileError,
    },

    /// The transpiler panicked.
    #[error("transpiler panicked while compiling {path}: {message}")]
    Panicked {
        /// The source file being compiled.
        path: PathBuf,
        /// The panic payload, when it was a string.
        message: String,
    },
}

/// No usable transpiler exists. Fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum LocateError {
    /// The program was not found on `PATH` or at the given location.
    #[error("transpiler '{program}' not found (searched {searched} locations)")]
    NotFound {
        /// The configured program.
        program: String,
        /// How many candidate locations were checked.
        searched: usize,
    },

    /// The program exists but is not an executable file.
    #[error("transpiler at {path} is not an executable file")]
    NotExecutable {
        /// The candidate that was rejected.
        path: PathBuf,
    },
}
