//! The transpiler's own, cache-less handler for the tracked suffix.

use std::path::Path;

use roast_common::Extensions;
use roast_compiler::Compiler;

use crate::error::LoadError;
use crate::host::{LoadedModule, ModuleLoader};
use crate::registry::ExtensionHandler;

/// Compiles on every load and persists nothing.
///
/// This is what the tracked slot holds before the cache-aware hook claims it,
/// and what the hook falls back to when its own compile fails.
#[derive(Debug, Clone)]
pub struct UncachedHandler {
    compiler: Compiler,
    extensions: Extensions,
}

impl UncachedHandler {
    /// Creates the handler.
    pub fn new(compiler: Compiler, extensions: Extensions) -> Self {
        Self {
            compiler,
            extensions,
        }
    }
}

impl ExtensionHandler for UncachedHandler {
    fn id(&self) -> &str {
        "uncached"
    }

    fn load(&self, loader: &ModuleLoader, filename: &Path) -> Result<LoadedModule, LoadError> {
        let source = std::fs::read_to_string(filename).map_err(|e| LoadError::Read {
            path: filename.to_path_buf(),
            source: e,
        })?;
        let generated = self.extensions.to_output(filename);
        let basename = generated
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let output = self.compiler.compile(&source, filename, &basename)?;
        loader.execute(output.code, filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::NoopEvaluator;
    use roast_compiler::{TranspileError, TranspileOutput, TranspileRequest, Transpiler};
    use std::rc::Rc;

    struct Upper;

    impl Transpiler for Upper {
        fn name(&self) -> &str {
            "upper"
        }

        fn transpile(&self, r: &TranspileRequest<'_>) -> Result<TranspileOutput, TranspileError> {
            if r.source.contains("!!") {
                return Err(TranspileError::new("unexpected !!"));
            }
            Ok(TranspileOutput::code_only(r.source.to_uppercase()))
        }
    }

    fn handler() -> UncachedHandler {
        UncachedHandler::new(Compiler::new(Rc::new(Upper)), Extensions::default())
    }

    #[test]
    fn compiles_without_persisting() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("a.coffee");
        std::fs::write(&source, "x = 1").unwrap();

        let loader = ModuleLoader::new(NoopEvaluator);
        let module = handler().load(&loader, &source).unwrap();
        assert_eq!(module.code, "X = 1");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn compile_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("a.coffee");
        std::fs::write(&source, "x = !!").unwrap();

        let loader = ModuleLoader::new(NoopEvaluator);
        let err = handler().load(&loader, &source).unwrap_err();
        assert!(matches!(err, LoadError::Compile(_)));
    }

    #[test]
    fn missing_source_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ModuleLoader::new(NoopEvaluator);
        let err = handler()
            .load(&loader, &dir.path().join("gone.coffee"))
            .unwrap_err();
        assert!(matches!(err, LoadError::Read { .. }));
    }
}
