//! A minimal host module system: suffix dispatch plus an evaluator.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::LoadError;
use crate::registry::{ExtensionHandler, ExtensionRegistry};

/// A module that finished loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedModule {
    /// The logical identity: the original source path, never the artifact path.
    pub filename: PathBuf,
    /// The code that was evaluated.
    pub code: String,
}

/// Runs module code.
///
/// Evaluation may load further modules through `loader`; such nested loads
/// complete before `evaluate` returns.
pub trait Evaluator {
    /// Executes `code` as the module identified by `filename`.
    fn evaluate(&self, loader: &ModuleLoader, code: &str, filename: &Path) -> Result<(), LoadError>;
}

/// Accepts every module without running it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEvaluator;

impl Evaluator for NoopEvaluator {
    fn evaluate(&self, _: &ModuleLoader, _: &str, _: &Path) -> Result<(), LoadError> {
        Ok(())
    }
}

/// Dispatches load requests to the handler registered for each suffix.
///
/// Single-threaded by construction; all state sits behind `RefCell`s so that
/// handlers and evaluators can re-enter the loader.
pub struct ModuleLoader {
    registry: RefCell<ExtensionRegistry>,
    evaluator: Box<dyn Evaluator>,
}

impl std::fmt::Debug for ModuleLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleLoader")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl ModuleLoader {
    /// Creates a loader with an empty registry.
    pub fn new(evaluator: impl Evaluator + 'static) -> Self {
        Self {
            registry: RefCell::new(ExtensionRegistry::new()),
            evaluator: Box::new(evaluator),
        }
    }

    /// See [`ExtensionRegistry::register`].
    pub fn register(&self, extension: &str, handler: Rc<dyn ExtensionHandler>) -> bool {
        self.registry.borrow_mut().register(extension, handler)
    }

    /// See [`ExtensionRegistry::claim`].
    pub fn claim(&self, extension: &str, handler: Rc<dyn ExtensionHandler>) -> bool {
        self.registry.borrow_mut().claim(extension, handler)
    }

    /// See [`ExtensionRegistry::handler`].
    pub fn handler(&self, extension: &str) -> Option<Rc<dyn ExtensionHandler>> {
        self.registry.borrow().handler(extension)
    }

    /// See [`ExtensionRegistry::is_claimed`].
    pub fn is_claimed(&self, extension: &str) -> bool {
        self.registry.borrow().is_claimed(extension)
    }

    /// Loads `path` through the handler for its suffix.
    pub fn require(&self, path: &Path) -> Result<LoadedModule, LoadError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        // The registry borrow ends here so the handler may re-enter the loader.
        let handler = self.handler(extension).ok_or_else(|| LoadError::NoHandler {
            path: path.to_path_buf(),
            extension: extension.to_string(),
        })?;
        handler.load(self, path)
    }

    /// Evaluates `code` as the module `filename`.
    pub fn execute(&self, code: String, filename: &Path) -> Result<LoadedModule, LoadError> {
        self.evaluator.evaluate(self, &code, filename)?;
        Ok(LoadedModule {
            filename: filename.to_path_buf(),
            code,
        })
    }
}
