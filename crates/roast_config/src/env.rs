//! Environment overlay: merging `ROAST_*` variables over file settings.
//!
//! Variables are read once, when [`EnvOverrides::from_process`] runs during
//! configuration loading. Later changes to the environment have no effect.

use std::path::{Component, Path};

use crate::error::ConfigError;
use crate::types::{RoastConfig, Settings};

/// Overrides the cache directory name.
pub const CACHE_DIR_VAR: &str = "ROAST_CACHE_DIR";

/// Marks the process as detached; progress output becomes plain text.
pub const DAEMONIZED_VAR: &str = "ROAST_DAEMONIZED";

/// Values captured from the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    /// Replacement cache directory name, if set and non-empty.
    pub cache_dir: Option<String>,
    /// Whether the daemonized flag was set.
    pub daemonized: bool,
}

impl EnvOverrides {
    /// Captures overrides from the current process environment.
    pub fn from_process() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Captures overrides through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let cache_dir = lookup(CACHE_DIR_VAR).filter(|v| !v.is_empty());
        let daemonized = lookup(DAEMONIZED_VAR)
            .map(|v| is_truthy(&v))
            .unwrap_or(false);
        Self {
            cache_dir,
            daemonized,
        }
    }
}

fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    !(value.is_empty() || value == "0" || value.eq_ignore_ascii_case("false"))
}

/// Merges file configuration and environment overrides into validated settings.
///
/// A relative `layout.install_root` is taken relative to `base_dir`; when absent
/// the install root is `base_dir` itself. The environment wins over the file.
pub fn apply_env(
    config: RoastConfig,
    base_dir: &Path,
    overrides: &EnvOverrides,
) -> Result<Settings, ConfigError> {
    let extensions = config.extensions.to_extensions()?;

    let cache_dir = overrides
        .cache_dir
        .clone()
        .unwrap_or(config.cache.dir);
    validate_dir_name("cache directory", &cache_dir)?;
    validate_dir_name("package container", &config.layout.package_container)?;

    if config.transpiler.program.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "transpiler program must not be empty".to_string(),
        ));
    }

    let install_root = match config.layout.install_root {
        Some(root) if root.is_absolute() => root,
        Some(root) => base_dir.join(root),
        None => base_dir.to_path_buf(),
    };

    Ok(Settings {
        cache_dir,
        extensions,
        package_container: config.layout.package_container,
        install_root,
        transpiler: config.transpiler,
        color: config.output.color,
        daemonized: config.output.daemonized || overrides.daemonized,
    })
}

/// The cache directory and the package container are joined under other
/// directories, so they must stay single relative names.
fn validate_dir_name(what: &str, name: &str) -> Result<(), ConfigError> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(ConfigError::ValidationError(format!(
            "{what} '{name}' must be a single relative directory name"
        ))),
    }
}
