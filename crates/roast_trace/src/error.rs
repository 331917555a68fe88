//! Error types for map retrieval. None of them escape translation: every one
//! turns into a decline.

use std::path::PathBuf;

use roast_common::SourceMapError;

/// Why a source map could not be used for translation.
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    /// The stored map could not be read.
    #[error("cannot read source map {path}: {source}")]
    MapRead {
        /// The map path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The stored map is not a usable version 3 map.
    #[error("cannot parse source map for {path}: {source}")]
    MapParse {
        /// The file whose map was retrieved.
        path: PathBuf,
        /// The parse failure.
        source: SourceMapError,
    },
}
