//! Error types for cache operations.

use std::path::PathBuf;

/// Errors that can occur during cache operations.
///
/// Freshness checks never fail: a stat problem simply means "not fresh". Map
/// write failures are logged and reported through
/// [`WriteOutcome`](crate::WriteOutcome) instead of surfacing as errors.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The artifact does not exist.
    #[error("cached artifact not found: {path}")]
    NotFound {
        /// The missing artifact path.
        path: PathBuf,
    },

    /// An I/O error occurred while reading a cache file.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The compiled artifact could not be persisted.
    #[error("failed to write cached artifact {path}: {source}")]
    ArtifactWrite {
        /// The artifact (or directory) path that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The source map could not be persisted.
    #[error("failed to write source map {path}: {source}")]
    MapWrite {
        /// The map path that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

impl CacheError {
    /// Returns `true` for a missing artifact.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
