//! Error types for module loading and runtime initialization.

use std::path::PathBuf;

use roast_compiler::{CompileError, LocateError};

/// A single load request failed.
///
/// Load errors stay local to the request that raised them; none of them stop
/// the process.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file is already being loaded further up the current load chain.
    #[error("load cycle detected at {path}: {}", display_chain(.chain))]
    Cycle {
        /// The file requested again.
        path: PathBuf,
        /// Files in progress, outermost first.
        chain: Vec<PathBuf>,
    },

    /// No handler is registered for the file's suffix.
    #[error("no handler registered for '{extension}' files ({path})")]
    NoHandler {
        /// The requested file.
        path: PathBuf,
        /// Its suffix, empty when it has none.
        extension: String,
    },

    /// The source file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// The unreadable file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Compilation failed and no fallback handler could take over.
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// The evaluator rejected the code.
    #[error("evaluation of {path} failed: {message}")]
    Evaluate {
        /// The module being evaluated.
        path: PathBuf,
        /// The evaluator's report.
        message: String,
    },
}

fn display_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Startup failed.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    /// No transpiler is available. Fatal: no artifact could ever be produced.
    #[error("no transpiler found: {0}")]
    Transpiler(#[from] LocateError),

    /// Another party already claimed the tracked suffix.
    #[error("the '{extension}' loader slot is already claimed")]
    SlotClaimed {
        /// The tracked suffix.
        extension: String,
    },
}
