//! Cache-aware loading of tracked-extension modules.
//!
//! The host module system is modelled by [`ModuleLoader`]: an
//! [`ExtensionRegistry`] maps file suffixes to handlers, and an [`Evaluator`]
//! runs the code a handler produces. [`LoaderHook`] claims the tracked suffix
//! with a handler that serves fresh artifacts from the cache and compiles the
//! rest, falling back to whatever handler held the slot before when
//! compilation fails. [`Runtime`] wires everything together at startup.

#![warn(missing_docs)]

pub mod error;
pub mod hook;
pub mod host;
pub mod in_progress;
pub mod progress;
pub mod registry;
pub mod runtime;
pub mod uncached;

pub use error::{InitError, LoadError};
pub use hook::{HookState, HookStats, LoaderHook};
pub use host::{Evaluator, LoadedModule, ModuleLoader, NoopEvaluator};
pub use in_progress::{InProgress, InProgressGuard};
pub use progress::{CaptureBuffer, ProgressReporter, ProgressStyle};
pub use registry::{ExtensionHandler, ExtensionRegistry};
pub use runtime::Runtime;
pub use uncached::UncachedHandler;
