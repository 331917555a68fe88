//! The extension registry: one handler slot per file suffix.
//!
//! Plain registration overwrites a slot, the way a host runtime's extension
//! table behaves. A claim locks the slot: the first claim wins, and every later
//! registration or claim for that suffix is refused. This is what keeps the
//! transpiler's own auto-registration from silently replacing the cache-aware
//! handler.

use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use crate::error::LoadError;
use crate::host::{LoadedModule, ModuleLoader};

/// Loads files of one suffix.
pub trait ExtensionHandler {
    /// Short identifier used in logs.
    fn id(&self) -> &str;

    /// Loads `filename`, handing the resulting code to `loader` for execution.
    fn load(&self, loader: &ModuleLoader, filename: &Path) -> Result<LoadedModule, LoadError>;
}

struct Slot {
    handler: Rc<dyn ExtensionHandler>,
    claimed: bool,
}

/// Suffix to handler table.
#[derive(Default)]
pub struct ExtensionRegistry {
    slots: HashMap<String, Slot>,
}

impl std::fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (ext, slot) in &self.slots {
            map.entry(ext, &(slot.handler.id(), slot.claimed));
        }
        map.finish()
    }
}

impl ExtensionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns `handler` to `extension` unless the slot is claimed.
    ///
    /// Returns whether the assignment took effect.
    pub fn register(&mut self, extension: &str, handler: Rc<dyn ExtensionHandler>) -> bool {
        if self.is_claimed(extension) {
            tracing::debug!(extension, handler = handler.id(), "ignoring registration for claimed slot");
            return false;
        }
        self.slots.insert(
            extension.to_string(),
            Slot {
                handler,
                claimed: false,
            },
        );
        true
    }

    /// Assigns `handler` to `extension` and locks the slot.
    ///
    /// The first claim wins; returns `false` if the slot was already claimed.
    pub fn claim(&mut self, extension: &str, handler: Rc<dyn ExtensionHandler>) -> bool {
        if self.is_claimed(extension) {
            tracing::debug!(extension, handler = handler.id(), "slot already claimed");
            return false;
        }
        tracing::debug!(extension, handler = handler.id(), "claimed loader slot");
        self.slots.insert(
            extension.to_string(),
            Slot {
                handler,
                claimed: true,
            },
        );
        true
    }

    /// The handler currently serving `extension`.
    pub fn handler(&self, extension: &str) -> Option<Rc<dyn ExtensionHandler>> {
        self.slots.get(extension).map(|s| Rc::clone(&s.handler))
    }

    /// Whether `extension` has been claimed.
    pub fn is_claimed(&self, extension: &str) -> bool {
        self.slots.get(extension).is_some_and(|s| s.claimed)
    }

    /// Registered suffixes, sorted.
    pub fn extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.slots.keys().map(String::as_str).collect();
        exts.sort_unstable();
        exts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    impl ExtensionHandler for Named {
        fn id(&self) -> &str {
            self.0
        }

        fn load(&self, loader: &ModuleLoader, filename: &Path) -> Result<LoadedModule, LoadError> {
            loader.execute(self.0.to_string(), filename)
        }
    }

    fn id_of(registry: &ExtensionRegistry, ext: &str) -> Option<String> {
        registry.handler(ext).map(|h| h.id().to_string())
    }

    #[test]
    fn register_overwrites_unclaimed_slot() {
        let mut registry = ExtensionRegistry::new();
        assert!(registry.register("coffee", Rc::new(Named("first"))));
        assert!(registry.register("coffee", Rc::new(Named("second"))));
        assert_eq!(id_of(&registry, "coffee").as_deref(), Some("second"));
        assert!(!registry.is_claimed("coffee"));
    }

    #[test]
    fn claim_locks_slot_against_registration() {
        let mut registry = ExtensionRegistry::new();
        registry.register("coffee", Rc::new(Named("builtin")));
        assert!(registry.claim("coffee", Rc::new(Named("cache"))));
        assert!(!registry.register("coffee", Rc::new(Named("builtin"))));
        assert_eq!(id_of(&registry, "coffee").as_deref(), Some("cache"));
    }

    #[test]
    fn first_claim_wins() {
        let mut registry = ExtensionRegistry::new();
        assert!(registry.claim("coffee", Rc::new(Named("cache"))));
        assert!(!registry.claim("coffee", Rc::new(Named("rival"))));
        assert_eq!(id_of(&registry, "coffee").as_deref(), Some("cache"));
    }

    #[test]
    fn slots_are_independent() {
        let mut registry = ExtensionRegistry::new();
        registry.claim("coffee", Rc::new(Named("cache")));
        assert!(registry.register("js", Rc::new(Named("plain"))));
        assert_eq!(registry.extensions(), vec!["coffee", "js"]);
        assert!(registry.handler("ts").is_none());
    }
}
