//! The seam between roast and whatever actually compiles source text.

use std::path::Path;
use std::rc::Rc;

use roast_config::TranspilerConfig;

use crate::error::{LocateError, TranspileError};

/// One compilation request.
///
/// The output is always a bare module body (no top-level wrapper). When
/// `source_map` is set, the transpiler should also return map data describing
/// `generated_file` in terms of `source_files`.
#[derive(Debug, Clone)]
pub struct TranspileRequest<'a> {
    /// The source text to compile.
    pub source: &'a str,
    /// The source's absolute path, for diagnostics.
    pub filename: &'a Path,
    /// Basename of the artifact the output will be stored as.
    pub generated_file: &'a str,
    /// Basenames of the contributing source files.
    pub source_files: Vec<&'a str>,
    /// Whether map data is wanted.
    pub source_map: bool,
}

/// What a transpiler returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranspileOutput {
    /// Generated code.
    pub code: String,
    /// Version 3 source map JSON. Older transpilers return code only.
    pub map: Option<String>,
}

impl TranspileOutput {
    /// Output without map data.
    pub fn code_only(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            map: None,
        }
    }
}

/// An external transpiler.
pub trait Transpiler {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Compiles one source text.
    fn transpile(&self, request: &TranspileRequest<'_>) -> Result<TranspileOutput, TranspileError>;
}

/// Finds a transpiler at startup.
pub trait TranspilerLocator {
    /// Returns a ready transpiler, or the reason none is available.
    fn locate(&self, config: &TranspilerConfig) -> Result<Rc<dyn Transpiler>, LocateError>;
}
