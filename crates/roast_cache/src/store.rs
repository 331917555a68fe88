//! Filesystem-backed artifact store.
//!
//! Freshness is decided purely by modification time: an artifact is fresh when
//! it exists and is not older than its source. Content is never hashed.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::CacheError;
use crate::paths::CachePaths;

/// What [`CacheStore::write`] managed to persist.
///
/// The artifact itself is always written when `write` returns `Ok`; the map is
/// best-effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Whether the source map reached disk.
    pub map_written: bool,
}

/// Reads and writes cached artifacts.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// reader never sees a half-written artifact. Repeated writes of the same
/// source converge on the same bytes; the last rename wins.
#[derive(Debug, Clone, Default)]
pub struct CacheStore;

impl CacheStore {
    /// Creates a store.
    pub fn new() -> Self {
        Self
    }

    /// Returns `true` if `cache` exists and is at least as new as `source`.
    ///
    /// Any stat failure on either path means "not fresh".
    pub fn is_fresh(&self, source: &Path, cache: &Path) -> bool {
        match (modified(source), modified(cache)) {
            (Some(source_time), Some(cache_time)) => cache_time >= source_time,
            _ => false,
        }
    }

    /// Reads a cached artifact.
    pub fn read(&self, cache: &Path) -> Result<String, CacheError> {
        fs::read_to_string(cache).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CacheError::NotFound {
                    path: cache.to_path_buf(),
                }
            } else {
                CacheError::Io {
                    path: cache.to_path_buf(),
                    source: e,
                }
            }
        })
    }

    /// Persists a compiled artifact and, best-effort, its source map.
    ///
    /// Missing parent directories are created. A failure to write the
    /// artifact is returned; a failure to write the map is logged and
    /// reported through [`WriteOutcome::map_written`]. A `None` map skips
    /// the map write.
    pub fn write(
        &self,
        paths: &CachePaths,
        content: &str,
        map: Option<&str>,
    ) -> Result<WriteOutcome, CacheError> {
        if let Some(dir) = paths.cache.parent() {
            fs::create_dir_all(dir).map_err(|e| CacheError::ArtifactWrite {
                path: dir.to_path_buf(),
                source: e,
            })?;
        }

        write_replace(&paths.cache, content).map_err(|e| CacheError::ArtifactWrite {
            path: paths.cache.clone(),
            source: e,
        })?;

        let Some(map) = map else {
            return Ok(WriteOutcome { map_written: false });
        };

        let map_written = match write_map(&paths.map, map) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(%err, "source map not persisted; artifact remains usable");
                false
            }
        };
        Ok(WriteOutcome { map_written })
    }
}

fn write_map(path: &Path, map: &str) -> Result<(), CacheError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| CacheError::MapWrite {
            path: path.to_path_buf(),
            source: e,
        })?;
    }
    write_replace(path, map).map_err(|e| CacheError::MapWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Writes `content` to a temporary sibling of `path`, syncs it, and renames it
/// over `path`.
fn write_replace(path: &Path, content: &str) -> std::io::Result<()> {
    let tmp = temp_sibling(path);
    let result = (|| {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    })();
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(".{}.tmp", std::process::id()));
    path.with_file_name(name)
}
