//! Files currently being loaded, for cycle detection.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use crate::error::LoadError;

/// The stack of files whose load has started but not finished.
#[derive(Debug, Default)]
pub struct InProgress {
    active: RefCell<Vec<PathBuf>>,
}

impl InProgress {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `path` as in progress until the guard drops.
    ///
    /// Fails with [`LoadError::Cycle`] if `path` is already in progress.
    pub fn enter(&self, path: &Path) -> Result<InProgressGuard<'_>, LoadError> {
        let mut active = self.active.borrow_mut();
        if active.iter().any(|p| p == path) {
            return Err(LoadError::Cycle {
                path: path.to_path_buf(),
                chain: active.clone(),
            });
        }
        active.push(path.to_path_buf());
        Ok(InProgressGuard {
            set: self,
            path: path.to_path_buf(),
        })
    }

    /// Whether `path` is in progress.
    pub fn contains(&self, path: &Path) -> bool {
        self.active.borrow().iter().any(|p| p == path)
    }

    /// Number of loads in progress.
    pub fn depth(&self) -> usize {
        self.active.borrow().len()
    }
}

/// Removes its path from the [`InProgress`] set when dropped.
#[derive(Debug)]
pub struct InProgressGuard<'a> {
    set: &'a InProgress,
    path: PathBuf,
}

impl Drop for InProgressGuard<'_> {
    fn drop(&mut self) {
        let mut active = self.set.active.borrow_mut();
        if let Some(pos) = active.iter().rposition(|p| *p == self.path) {
            active.remove(pos);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_releases_on_drop() {
        let set = InProgress::new();
        {
            let _guard = set.enter(Path::new("/a.coffee")).unwrap();
            assert!(set.contains(Path::new("/a.coffee")));
        }
        assert!(!set.contains(Path::new("/a.coffee")));
        assert_eq!(set.depth(), 0);
    }

    #[test]
    fn reentry_is_a_cycle() {
        let set = InProgress::new();
        let _a = set.enter(Path::new("/a.coffee")).unwrap();
        let _b = set.enter(Path::new("/b.coffee")).unwrap();
        match set.enter(Path::new("/a.coffee")) {
            Err(LoadError::Cycle { path, chain }) => {
                assert_eq!(path, PathBuf::from("/a.coffee"));
                assert_eq!(chain.len(), 2);
            }
            other => panic!("expected cycle, got {other:?}"),
        };
    }

    #[test]
    fn siblings_may_nest() {
        let set = InProgress::new();
        let _a = set.enter(Path::new("/a.coffee")).unwrap();
        {
            let _b = set.enter(Path::new("/b.coffee")).unwrap();
        }
        let _b_again = set.enter(Path::new("/b.coffee")).unwrap();
        assert_eq!(set.depth(), 2);
    }
}
