//! The cache-aware handler for the tracked suffix and its registration.
//!
//! Per load request:
//!
//! 1. resolve the artifact location;
//! 2. serve the artifact if it is fresh;
//! 3. otherwise compile the source, persist the result, and use it; if the
//!    source cannot be read or compilation fails, hand the request to the
//!    handler that held the slot before the hook claimed it;
//! 4. evaluate the code under the original source path.

use std::cell::{Cell, RefCell};
use std::path::Path;
use std::rc::Rc;

use roast_cache::{CachePaths, CacheStore, PathResolver};
use roast_compiler::{CompiledOutput, Compiler};

use crate::error::{InitError, LoadError};
use crate::host::{LoadedModule, ModuleLoader};
use crate::in_progress::InProgress;
use crate::progress::ProgressReporter;
use crate::registry::ExtensionHandler;

/// Registration state of a [`LoaderHook`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookState {
    /// Not yet installed.
    Unregistered,
    /// Holds the claim on the tracked slot.
    Registered,
}

/// Counters describing what the hook has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HookStats {
    /// Loads served from a fresh artifact.
    pub cache_hits: u32,
    /// Successful compiles.
    pub compiles: u32,
    /// Loads handed to the fallback handler.
    pub fallbacks: u32,
    /// Compiles whose artifact could not be persisted.
    pub write_failures: u32,
    /// Compiles whose map could not be persisted.
    pub map_failures: u32,
}

struct CacheAwareHandler {
    resolver: PathResolver,
    store: CacheStore,
    compiler: Compiler,
    progress: ProgressReporter,
    in_progress: InProgress,
    fallback: RefCell<Option<Rc<dyn ExtensionHandler>>>,
    stats: Cell<HookStats>,
}

impl CacheAwareHandler {
    fn bump(&self, update: impl FnOnce(&mut HookStats)) {
        let mut stats = self.stats.get();
        update(&mut stats);
        self.stats.set(stats);
    }

    fn cached(&self, filename: &Path, paths: &CachePaths) -> Option<String> {
        if !self.store.is_fresh(filename, &paths.cache) {
            tracing::debug!(file = %filename.display(), "artifact missing or stale");
            return None;
        }
        match self.store.read(&paths.cache) {
            Ok(code) => {
                self.bump(|s| s.cache_hits += 1);
                tracing::debug!(file = %filename.display(), "serving cached artifact");
                Some(code)
            }
            Err(err) => {
                tracing::debug!(%err, "fresh artifact unreadable; recompiling");
                None
            }
        }
    }

    /// Either failure, unreadable source or failed compile, goes to the fallback.
    fn compile(&self, filename: &Path, paths: &CachePaths) -> Result<String, LoadError> {
        let source = std::fs::read_to_string(filename).map_err(|e| LoadError::Read {
            path: filename.to_path_buf(),
            source: e,
        })?;
        let basename = paths
            .cache
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.progress.compiling(&paths.relative);
        match self.compiler.compile(&source, filename, &basename) {
            Ok(output) => {
                self.progress.done();
                self.bump(|s| s.compiles += 1);
                self.persist(paths, &output);
                Ok(output.code)
            }
            Err(err) => {
                self.progress.failed();
                Err(LoadError::Compile(err))
            }
        }
    }

    /// The compiled code is used whether or not it reaches disk.
    fn persist(&self, paths: &CachePaths, output: &CompiledOutput) {
        match self.store.write(paths, &output.code, output.map.as_deref()) {
            Ok(outcome) => {
                if output.map.is_some() && !outcome.map_written {
                    self.bump(|s| s.map_failures += 1);
                }
            }
            Err(err) => {
                self.bump(|s| s.write_failures += 1);
                tracing::warn!(%err, "compiled artifact not persisted; using in-memory output");
            }
        }
    }

    fn fall_back(
        &self,
        loader: &ModuleLoader,
        filename: &Path,
        err: LoadError,
    ) -> Result<LoadedModule, LoadError> {
        self.bump(|s| s.fallbacks += 1);
        let fallback = self.fallback.borrow().clone();
        match fallback {
            Some(handler) => {
                tracing::warn!(
                    %err,
                    fallback = handler.id(),
                    "cached load failed; using fallback handler"
                );
                handler.load(loader, filename)
            }
            None => Err(err),
        }
    }
}

impl ExtensionHandler for CacheAwareHandler {
    fn id(&self) -> &str {
        "roast-cache"
    }

    fn load(&self, loader: &ModuleLoader, filename: &Path) -> Result<LoadedModule, LoadError> {
        let _guard = self.in_progress.enter(filename)?;
        let paths = self.resolver.resolve(filename);

        let code = match self.cached(filename, &paths) {
            Some(code) => code,
            None => match self.compile(filename, &paths) {
                Ok(code) => code,
                Err(err) => return self.fall_back(loader, filename, err),
            },
        };
        loader.execute(code, filename)
    }
}

/// Owns the cache-aware handler and its claim on the tracked slot.
pub struct LoaderHook {
    state: Cell<HookState>,
    handler: Rc<CacheAwareHandler>,
}

impl std::fmt::Debug for LoaderHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoaderHook")
            .field("state", &self.state.get())
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl LoaderHook {
    /// Creates an unregistered hook.
    pub fn new(
        resolver: PathResolver,
        store: CacheStore,
        compiler: Compiler,
        progress: ProgressReporter,
    ) -> Self {
        Self {
            state: Cell::new(HookState::Unregistered),
            handler: Rc::new(CacheAwareHandler {
                resolver,
                store,
                compiler,
                progress,
                in_progress: InProgress::new(),
                fallback: RefCell::new(None),
                stats: Cell::new(HookStats::default()),
            }),
        }
    }

    /// Claims the tracked slot in `loader`.
    ///
    /// Whatever handler held the slot beforehand becomes the fallback for
    /// failed compiles. Installing twice is a no-op.
    pub fn install(&self, loader: &ModuleLoader) -> Result<(), InitError> {
        if self.state.get() == HookState::Registered {
            return Ok(());
        }
        let extension = self.extension().to_string();
        let previous = loader.handler(&extension);
        let handler: Rc<dyn ExtensionHandler> = self.handler.clone();
        if !loader.claim(&extension, handler) {
            return Err(InitError::SlotClaimed { extension });
        }
        if let Some(prev) = &previous {
            tracing::debug!(fallback = prev.id(), "previous handler kept as fallback");
        }
        *self.handler.fallback.borrow_mut() = previous;
        self.state.set(HookState::Registered);
        Ok(())
    }

    /// Current registration state.
    pub fn state(&self) -> HookState {
        self.state.get()
    }

    /// The tracked suffix.
    pub fn extension(&self) -> &str {
        self.handler.resolver.extensions().source()
    }

    /// The resolver used for artifact placement.
    pub fn resolver(&self) -> &PathResolver {
        &self.handler.resolver
    }

    /// Counters so far.
    pub fn stats(&self) -> HookStats {
        self.handler.stats.get()
    }
}
