//! Fault-isolating wrapper around a [`Transpiler`].

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::rc::Rc;

use roast_common::SourceMap;

use crate::error::CompileError;
use crate::transpiler::{TranspileRequest, Transpiler};

/// Compiled code plus its annotated source map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledOutput {
    /// The bare module body.
    pub code: String,
    /// Map JSON whose `file` is the artifact basename and whose `sources` is
    /// the source basename. `None` when the transpiler produced no usable map.
    pub map: Option<String>,
}

/// Runs the transpiler for one source file at a time.
///
/// Every failure mode of the transpiler, panics included, comes back as a
/// [`CompileError`].
#[derive(Clone)]
pub struct Compiler {
    transpiler: Rc<dyn Transpiler>,
}

impl std::fmt::Debug for Compiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compiler")
            .field("transpiler", &self.transpiler.name())
            .finish()
    }
}

impl Compiler {
    /// Wraps a transpiler.
    pub fn new(transpiler: Rc<dyn Transpiler>) -> Self {
        Self { transpiler }
    }

    /// The wrapped transpiler.
    pub fn transpiler(&self) -> &Rc<dyn Transpiler> {
        &self.transpiler
    }

    /// Compiles `source_text` read from `source_path` into a bare module body
    /// destined for an artifact named `cache_basename`.
    pub fn compile(
        &self,
        source_text: &str,
        source_path: &Path,
        cache_basename: &str,
    ) -> Result<CompiledOutput, CompileError> {
        let source_name = source_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let request = TranspileRequest {
            source: source_text,
            filename: source_path,
            generated_file: cache_basename,
            source_files: vec![source_name.as_str()],
            source_map: true,
        };

        let output = match panic::catch_unwind(AssertUnwindSafe(|| {
            self.transpiler.transpile(&request)
        })) {
            Ok(Ok(output)) => output,
            Ok(Err(source)) => {
                return Err(CompileError::Transpile {
                    path: source_path.to_path_buf(),
                    source,
                })
            }
            Err(payload) => {
                return Err(CompileError::Panicked {
                    path: source_path.to_path_buf(),
                    message: panic_message(payload.as_ref()),
                })
            }
        };

        let map = output
            .map
            .and_then(|raw| annotate_map(&raw, cache_basename, &source_name, source_path));

        Ok(CompiledOutput {
            code: output.code,
            map,
        })
    }
}

fn annotate_map(raw: &str, generated: &str, source: &str, path: &Path) -> Option<String> {
    let annotated = SourceMap::from_json(raw).and_then(|mut map| {
        map.annotate(generated, &[source]);
        map.to_json()
    });
    match annotated {
        Ok(json) => Some(json),
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "discarding unusable source map");
            None
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
