//! Startup wiring: transpiler discovery, hook registration, trace translation.

use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use roast_cache::{CacheStore, PathResolver};
use roast_compiler::{Compiler, TranspilerLocator};
use roast_config::Settings;
use roast_trace::{CacheMapRetriever, TranslatorChain, TRANSPILER_BUILTIN_ID};

use crate::error::{InitError, LoadError};
use crate::hook::LoaderHook;
use crate::host::{Evaluator, LoadedModule, ModuleLoader};
use crate::progress::ProgressReporter;
use crate::uncached::UncachedHandler;

/// An initialized loader with the cache hook in place.
#[derive(Debug)]
pub struct Runtime {
    settings: Settings,
    loader: ModuleLoader,
    hook: LoaderHook,
    translators: Arc<TranslatorChain>,
}

impl Runtime {
    /// Brings the loader up.
    ///
    /// The transpiler must be locatable; without it nothing can be compiled
    /// and initialization fails. The transpiler's own uncached handler is
    /// registered first and then displaced by the cache hook, which keeps it
    /// as its fallback. Stack-trace translation goes through a chain that
    /// refuses the transpiler's built-in translator and consults the cache's
    /// maps instead; the chain is published process-wide on first init.
    pub fn init(
        settings: Settings,
        locator: &dyn TranspilerLocator,
        evaluator: impl Evaluator + 'static,
        progress: ProgressReporter,
    ) -> Result<Self, InitError> {
        let transpiler = locator.locate(&settings.transpiler)?;
        tracing::debug!(transpiler = transpiler.name(), "transpiler ready");
        let compiler = Compiler::new(transpiler);

        let resolver = PathResolver::from_settings(&settings);
        let loader = ModuleLoader::new(evaluator);
        let extension = settings.extensions.source().to_string();
        loader.register(
            &extension,
            Rc::new(UncachedHandler::new(compiler.clone(), settings.extensions.clone())),
        );

        let hook = LoaderHook::new(resolver.clone(), CacheStore::new(), compiler, progress);
        hook.install(&loader)?;

        let translators = Arc::new(TranslatorChain::new());
        translators.block(TRANSPILER_BUILTIN_ID);
        translators.install(Arc::new(CacheMapRetriever::new(resolver)));
        roast_trace::install(translators.clone());

        tracing::info!(
            extension = %extension,
            cache_dir = %settings.cache_dir,
            root = %settings.install_root.display(),
            "cache loader installed"
        );
        Ok(Self {
            settings,
            loader,
            hook,
            translators,
        })
    }

    /// Loads `path` through the registered handlers.
    pub fn require(&self, path: &Path) -> Result<LoadedModule, LoadError> {
        self.loader.require(path)
    }

    /// The underlying module loader.
    pub fn loader(&self) -> &ModuleLoader {
        &self.loader
    }

    /// The cache hook.
    pub fn hook(&self) -> &LoaderHook {
        &self.hook
    }

    /// The stack-trace translator chain.
    pub fn translators(&self) -> &Arc<TranslatorChain> {
        &self.translators
    }

    /// Settings the runtime was built from.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Artifact placement.
    pub fn resolver(&self) -> &PathResolver {
        self.hook.resolver()
    }
}
