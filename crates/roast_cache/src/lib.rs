//! On-disk cache for compiled artifacts and their source maps.
//!
//! [`PathResolver`] decides where the artifact for a source file lives, and
//! [`CacheStore`] checks freshness by modification time, reads artifacts back,
//! and persists newly compiled ones. Nothing here ever deletes an artifact.

#![warn(missing_docs)]

pub mod error;
pub mod paths;
pub mod store;

pub use error::CacheError;
pub use paths::{CachePaths, PathResolver};
pub use store::{CacheStore, WriteOutcome};
