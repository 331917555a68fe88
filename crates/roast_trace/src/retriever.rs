//! Source map retrievers: the links of a [`TranslatorChain`](crate::TranslatorChain).

use std::path::{Path, PathBuf};

use roast_cache::PathResolver;

use crate::error::TraceError;

/// Identifier of the cache-backed retriever.
pub const CACHE_RETRIEVER_ID: &str = "roast-cache";

/// Identifier of the transpiler's own trace hook. Its positions are wrong for
/// cached artifacts, so the cache retriever blocks it on installation.
pub const TRANSPILER_BUILTIN_ID: &str = "transpiler-builtin";

/// A source map found for a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievedMap {
    /// The file the map belongs to; relative `sources` resolve against it.
    pub url: PathBuf,
    /// The map JSON.
    pub map: String,
}

/// Finds the source map for a file, or declines.
pub trait SourceMapRetriever: Send + Sync {
    /// Stable identifier. A chain holds at most one retriever per id.
    fn id(&self) -> &str;

    /// Returns the map for `file`, or `None` to let the next retriever try.
    fn retrieve(&self, file: &Path) -> Option<RetrievedMap>;
}

/// Serves maps persisted next to cached artifacts.
#[derive(Debug, Clone)]
pub struct CacheMapRetriever {
    resolver: PathResolver,
}

impl CacheMapRetriever {
    /// Creates a retriever that locates maps the same way the loader stores them.
    pub fn new(resolver: PathResolver) -> Self {
        Self { resolver }
    }

    /// Reads the map for a tracked file.
    pub fn read_map(&self, file: &Path) -> Result<RetrievedMap, TraceError> {
        let map_path = self.resolver.resolve(file).map;
        let map = std::fs::read_to_string(&map_path).map_err(|e| TraceError::MapRead {
            path: map_path,
            source: e,
        })?;
        Ok(RetrievedMap {
            url: file.to_path_buf(),
            map,
        })
    }
}

impl SourceMapRetriever for CacheMapRetriever {
    fn id(&self) -> &str {
        CACHE_RETRIEVER_ID
    }

    fn retrieve(&self, file: &Path) -> Option<RetrievedMap> {
        if !self.resolver.extensions().is_tracked(file) {
            return None;
        }
        match self.read_map(file) {
            Ok(found) => Some(found),
            Err(err) => {
                tracing::debug!(%err, "declining trace translation");
                None
            }
        }
    }
}
