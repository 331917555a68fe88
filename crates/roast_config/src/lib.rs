//! Parsing and validation of `roast.toml` and the environment overlay.
//!
//! This crate reads the optional configuration file, fills in defaults, applies
//! the `ROAST_*` environment variables once, and produces a validated
//! [`RoastConfig`].

#![warn(missing_docs)]

pub mod env;
pub mod error;
pub mod loader;
pub mod types;

pub use env::{apply_env, EnvOverrides, CACHE_DIR_VAR, DAEMONIZED_VAR};
pub use error::ConfigError;
pub use loader::{load_config, load_config_file, load_config_from_str, CONFIG_FILE};
pub use types::*;
